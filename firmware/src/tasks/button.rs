//! 有効化ボタンタスク
//!
//! ボタン押下で故障ラッチをクリアし、自己診断からやり直します。

use embassy_stm32::exti::ExtiInput;
use embassy_time::{Duration, Timer};

use crate::fmt::*;
use crate::state::ENABLE_REQUEST;

/// チャタリング除去時間 [ms]
const DEBOUNCE_MS: u64 = 50;

/// 有効化ボタンタスク（アクティブLow）
#[embassy_executor::task]
pub async fn enable_button_task(mut button: ExtiInput<'static>) {
    info!("Enable button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;

        if button.is_low() {
            info!("Enable button pressed");
            ENABLE_REQUEST.signal(());
            button.wait_for_rising_edge().await;
        }
    }
}
