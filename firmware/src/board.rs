//! モーターボード
//!
//! TIM1ハイサイドPWM、ローサイドGPIO、Hall/停止入力、ADCを
//! 制御コアのハードウェアトレイトとして公開します。

use embassy_stm32::{
    adc::{Adc, AnyAdcChannel},
    gpio::{Input, Output},
    peripherals,
    timer::{simple_pwm::SimplePwm, Channel},
};
use ebike_commutation::{HallReading, Phase, PowerStage, Sensors};

use crate::config::adc::RESOLUTION_SHIFT;

/// 相ごとのTIM1チャネル
const HIGH_SIDE_CHANNELS: [Channel; 3] = [Channel::Ch1, Channel::Ch2, Channel::Ch3];

pub struct MotorBoard {
    pwm: SimplePwm<'static, peripherals::TIM1>,
    max_duty: u16,
    low: [Output<'static>; 3],
    hall: [Input<'static>; 3],
    halt: Input<'static>,
    adc1: Adc<'static, peripherals::ADC1>,
    phase_pins: [AnyAdcChannel<peripherals::ADC1>; 3],
    current_pin: AnyAdcChannel<peripherals::ADC1>,
    adc2: Adc<'static, peripherals::ADC2>,
    throttle_pin: AnyAdcChannel<peripherals::ADC2>,
}

impl MotorBoard {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pwm: SimplePwm<'static, peripherals::TIM1>,
        low: [Output<'static>; 3],
        hall: [Input<'static>; 3],
        halt: Input<'static>,
        adc1: Adc<'static, peripherals::ADC1>,
        phase_pins: [AnyAdcChannel<peripherals::ADC1>; 3],
        current_pin: AnyAdcChannel<peripherals::ADC1>,
        adc2: Adc<'static, peripherals::ADC2>,
        throttle_pin: AnyAdcChannel<peripherals::ADC2>,
    ) -> Self {
        let max_duty = pwm.max_duty_cycle();
        Self {
            pwm,
            max_duty,
            low,
            hall,
            halt,
            adc1,
            phase_pins,
            current_pin,
            adc2,
            throttle_pin,
        }
    }
}

/// 12bit ADC値を0–1023に変換
#[inline]
fn scale(raw: u16) -> u16 {
    raw >> RESOLUTION_SHIFT
}

impl PowerStage for MotorBoard {
    fn set_high_duty(&mut self, phase: Phase, duty: u8) {
        // 0–255 → 0–max_duty
        let compare = (self.max_duty as u32 * duty as u32 / 255) as u16;
        self.pwm
            .channel(HIGH_SIDE_CHANNELS[phase.index()])
            .set_duty_cycle(compare);
    }

    fn set_low(&mut self, phase: Phase, on: bool) {
        let pin = &mut self.low[phase.index()];
        if on {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }
}

impl Sensors for MotorBoard {
    fn hall(&mut self) -> HallReading {
        HallReading::new(
            self.hall[0].is_high(),
            self.hall[1].is_high(),
            self.hall[2].is_high(),
        )
    }

    fn phase_voltage(&mut self, phase: Phase) -> u16 {
        scale(
            self.adc1
                .blocking_read(&mut self.phase_pins[phase.index()]),
        )
    }

    fn current(&mut self) -> u16 {
        scale(self.adc1.blocking_read(&mut self.current_pin))
    }

    fn throttle(&mut self) -> u16 {
        scale(self.adc2.blocking_read(&mut self.throttle_pin))
    }

    fn halt_asserted(&mut self) -> bool {
        // アクティブLow
        self.halt.is_low()
    }
}
