//! ハードウェア初期化モジュール
//!
//! クロック設定とモーター周辺ペリフェラルの組み立てを集約します。

use embassy_stm32::{
    adc::{Adc, AdcChannel, SampleTime},
    exti::ExtiInput,
    gpio::{Input, Level, Output, OutputType, Pull, Speed},
    timer::{
        low_level::CountingMode,
        simple_pwm::{PwmPin, SimplePwm},
    },
    Config, Peripherals,
};

use crate::board::MotorBoard;
use crate::buzzer::Buzzer;
use crate::config;
use crate::fmt::*;

/// RCCクロック設定を初期化
///
/// HSI → PLL（÷4 × 85 ÷ 2）で170MHz生成
pub fn create_clock_config() -> Config {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::mux::{Adcsel, ClockMux};
        use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};

        config.rcc.hsi = true;
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL85,
            divp: None,
            divq: None,
            divr: Some(PllRDiv::DIV2),
        });
        config.rcc.sys = Sysclk::PLL1_R; // システムクロックをPLLに設定

        let mut clock_mux = ClockMux::default();
        clock_mux.adc12sel = Adcsel::SYS;
        config.rcc.mux = clock_mux;
    }
    config
}

/// 初期化済みペリフェラル一式
pub struct Hardware {
    pub board: MotorBoard,
    pub buzzer: Buzzer,
    pub leds: [Output<'static>; 3],
    pub enable_button: ExtiInput<'static>,
}

/// モーター周辺の初期化
///
/// ピン割り当て:
/// - ハイサイド: PE9/PE11/PE13（TIM1 CH1-3 PWM）
/// - ローサイド: PE8/PE10/PE12（GPIO）
/// - Hall: PB6/PB7/PB8（プルアップ）
/// - 停止入力: PA15（アクティブLow）
/// - 相電圧: PA0/PA2/PA3（ADC1）、電流: PB1（ADC1）、スロットル: PC1（ADC2）
/// - ブザー: PB4（TIM3 CH1）、有効化ボタン: PC10（EXTI10）
pub fn init(p: Peripherals) -> Hardware {
    // ハイサイドPWM（全チャネル0%で開始）
    let mut pwm = SimplePwm::new(
        p.TIM1,
        Some(PwmPin::new(p.PE9, OutputType::PushPull)),
        Some(PwmPin::new(p.PE11, OutputType::PushPull)),
        Some(PwmPin::new(p.PE13, OutputType::PushPull)),
        None,
        config::pwm::DEFAULT_FREQUENCY,
        CountingMode::EdgeAlignedUp,
    );
    pwm.ch1().set_duty_cycle(0);
    pwm.ch2().set_duty_cycle(0);
    pwm.ch3().set_duty_cycle(0);
    pwm.ch1().enable();
    pwm.ch2().enable();
    pwm.ch3().enable();
    info!(
        "TIM1 PWM: {}Hz, max duty {}",
        config::pwm::DEFAULT_FREQUENCY.0,
        pwm.max_duty_cycle()
    );

    // ローサイド（全OFFで開始）
    let low = [
        Output::new(p.PE8, Level::Low, Speed::High),
        Output::new(p.PE10, Level::Low, Speed::High),
        Output::new(p.PE12, Level::Low, Speed::High),
    ];

    let hall = [
        Input::new(p.PB6, Pull::Up),
        Input::new(p.PB7, Pull::Up),
        Input::new(p.PB8, Pull::Up),
    ];
    let halt = Input::new(p.PA15, Pull::Up);

    // ADC初期化
    let mut adc1 = Adc::new(p.ADC1);
    adc1.set_sample_time(SampleTime::CYCLES47_5);
    let mut adc2 = Adc::new(p.ADC2);
    adc2.set_sample_time(SampleTime::CYCLES640_5);

    let phase_pins = [
        p.PA0.degrade_adc(),
        p.PA2.degrade_adc(),
        p.PA3.degrade_adc(),
    ];
    let current_pin = p.PB1.degrade_adc();
    let throttle_pin = p.PC1.degrade_adc();

    let board = MotorBoard::new(
        pwm,
        low,
        hall,
        halt,
        adc1,
        phase_pins,
        current_pin,
        adc2,
        throttle_pin,
    );

    let buzzer_pwm = SimplePwm::new(
        p.TIM3,
        Some(PwmPin::new(p.PB4, OutputType::PushPull)),
        None,
        None,
        None,
        config::buzzer::IDLE_FREQUENCY,
        CountingMode::EdgeAlignedUp,
    );
    let buzzer = Buzzer::new(buzzer_pwm);

    let leds = [
        Output::new(p.PC13, Level::High, Speed::Low),
        Output::new(p.PC14, Level::High, Speed::Low),
        Output::new(p.PC15, Level::High, Speed::Low),
    ];

    let enable_button = ExtiInput::new(p.PC10, p.EXTI10, Pull::Up);

    Hardware {
        board,
        buzzer,
        leds,
        enable_button,
    }
}
