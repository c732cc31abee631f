//! LED制御タスク
//!
//! 制御モードをLEDで表示します。
//! LED1: 運転中点灯、LED2: 故障/待機中点滅、LED3: 自己診断中点灯・スリープ中はゆっくり点滅

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Timer};
use ebike_commutation::ControllerMode;

use crate::config::led::BLINK_PERIOD_MS;
use crate::fmt::*;
use crate::state;

/// LED制御タスク
#[embassy_executor::task]
pub async fn led_task(mut leds: [Output<'static>; 3]) {
    info!("LED task started");

    let mut tick = 0u32;

    loop {
        let mode = state::mode();
        let blink = tick % 2 == 0;
        let slow_blink = tick % 8 == 0;

        let pattern = match mode {
            ControllerMode::Disabled => [false, false, false],
            ControllerMode::SelfTest => [false, false, true],
            ControllerMode::Running => [true, false, false],
            ControllerMode::Faulted | ControllerMode::Idle => [false, blink, false],
            ControllerMode::Sleep => [false, false, slow_blink],
        };

        for (led, on) in leds.iter_mut().zip(pattern) {
            if on {
                led.set_high();
            } else {
                led.set_low();
            }
        }

        if tick % 40 == 0 && state::fault_code() != 0 {
            debug!("LED: fault code {}", state::fault_code());
        }

        tick = tick.wrapping_add(1);
        Timer::after(Duration::from_millis(BLINK_PERIOD_MS)).await;
    }
}
