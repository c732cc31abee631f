//! Configuration module
//!
//! ボード設定と、起動時に組み立てる制御設定を提供します。
//! 設定の永続化は行いません。

pub mod params;

use ebike_commutation::ControllerConfig;

// params.rsから主要な定数を再エクスポート
pub use params::*;

/// 起動時の制御設定（デフォルト値）
pub fn controller_config() -> ControllerConfig {
    ControllerConfig::default()
}
