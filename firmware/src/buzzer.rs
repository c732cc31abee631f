//! ブザー出力と診断ログ
//!
//! アラートパターンのトーン列をTIM3 PWMで鳴らします（ブロッキング）。
//! 診断イベントはログへ出力するのみで、制御判断には使いません。

use embassy_stm32::{
    peripherals,
    time::Hertz,
    timer::simple_pwm::SimplePwm,
};
use embassy_time::{block_for, Duration};
use ebike_commutation::{AlertPattern, DiagnosticEvent, Reporter};

use crate::config::buzzer::DUTY_PERCENT;
use crate::fmt::*;

pub struct Buzzer {
    pwm: SimplePwm<'static, peripherals::TIM3>,
}

impl Buzzer {
    pub fn new(mut pwm: SimplePwm<'static, peripherals::TIM3>) -> Self {
        pwm.ch1().set_duty_cycle(0);
        pwm.ch1().enable();
        Self { pwm }
    }

    fn tone(&mut self, hz: u16) {
        if hz == 0 {
            self.pwm.ch1().set_duty_cycle(0);
            return;
        }
        self.pwm.set_frequency(Hertz(hz as u32));
        let compare = (self.pwm.max_duty_cycle() as u32 * DUTY_PERCENT as u32 / 100) as u16;
        self.pwm.ch1().set_duty_cycle(compare);
    }
}

impl Reporter for Buzzer {
    fn alert(&mut self, pattern: AlertPattern) {
        debug!("Alert: {}", pattern);
        for &(hz, ms) in pattern.tones() {
            self.tone(hz);
            block_for(Duration::from_millis(ms as u64));
        }
        self.tone(0);
    }

    fn report(&mut self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::FaultLatched { .. } => error!("{}", event),
            DiagnosticEvent::Status { .. } => trace!("{}", event),
            _ => info!("{}", event),
        }
    }
}
