//! タスクモジュール
//!
//! 各タスクの実装を分離して管理します。

pub mod button;
pub mod control;
pub mod led;

// タスク関数を再エクスポート
pub use button::enable_button_task;
pub use control::control_task;
pub use led::led_task;
