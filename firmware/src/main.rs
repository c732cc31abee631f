#![no_std]
#![no_main]

// This mod MUST go first, so that the others see its macros.
mod fmt;

mod board;
mod buzzer;
mod config;
mod hardware;
mod state;
mod tasks;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use fmt::*;
use tasks::{control_task, enable_button_task, led_task};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // ハードウェア初期化
    let config = hardware::create_clock_config();
    let p = embassy_stm32::init(config);

    info!("═══════════════════════════════════════════════");
    info!("   E-Bike BLDC Controller • STM32G431VB @ 170MHz");
    info!("   Hall-sensored six-step commutation");
    info!("═══════════════════════════════════════════════");

    let hw = hardware::init(p);

    spawner.spawn(led_task(hw.leds)).unwrap();
    spawner.spawn(enable_button_task(hw.enable_button)).unwrap();

    info!("Starting control loop...");
    spawner.spawn(control_task(hw.board, hw.buzzer)).unwrap();

    // メインループ（将来の拡張用）
    loop {
        Timer::after(Duration::from_millis(1000)).await;
    }
}
