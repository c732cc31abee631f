//! 制御タスク
//!
//! 単一の協調ループでコントローラをポーリングします。
//! 運転中は待ちを入れずに毎回Hallを読み、Idle/Sleep中は次の処理時刻まで待機します。

use ebike_commutation::Controller;
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_time::{Delay, Instant, Timer};

use crate::board::MotorBoard;
use crate::buzzer::Buzzer;
use crate::config::{self, control::STATUS_LOG_INTERVAL};
use crate::fmt::*;
use crate::state::{self, ENABLE_REQUEST};

/// 制御タスク
#[embassy_executor::task]
pub async fn control_task(mut board: MotorBoard, mut buzzer: Buzzer) {
    info!("Control task started");

    let controller_config = config::controller_config();
    unwrap!(controller_config.validate());
    let mut controller = Controller::new(controller_config);

    // 自己診断の整定待ちのみで使用
    let mut delay = Delay;

    // デバッグログ用カウンタ
    let mut log_counter = 0u32;

    loop {
        if ENABLE_REQUEST.try_take().is_some() {
            info!("Enable requested");
            controller.request_enable();
        }

        let mode = controller.poll(&mut board, &mut delay, &mut buzzer, Instant::now());
        state::publish(mode, controller.fault());

        log_counter += 1;
        if log_counter >= STATUS_LOG_INTERVAL {
            log_counter = 0;
            debug!(
                "mode={} step={} duty={} fault={} Vmax={}",
                mode,
                controller.step(),
                controller.duty(),
                controller.fault(),
                controller.max_voltage_adc()
            );
        }

        match controller.next_wake() {
            Some(at) => {
                // Idle/Sleep: 期限か有効化要求のどちらかまで待機
                if let Either::Second(()) = select(Timer::at(at), ENABLE_REQUEST.wait()).await {
                    info!("Enable requested while {}", mode);
                    controller.request_enable();
                }
            }
            None => yield_now().await,
        }
    }
}
