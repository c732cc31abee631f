//! グローバル共有状態管理
//!
//! 制御タスクが単独で書き込み、他タスクは読み取りのみ行います。

use core::sync::atomic::{AtomicU8, Ordering};

use ebike_commutation::{ControllerMode, FaultCode};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::signal::Signal;

/// 現在の制御モード（ControllerMode::as_u8）
static MODE: AtomicU8 = AtomicU8::new(0);

/// ラッチ中の故障コード（FaultCode::as_u8）
static FAULT: AtomicU8 = AtomicU8::new(0);

/// 有効化（故障クリア＋自己診断）要求
pub static ENABLE_REQUEST: Signal<ThreadModeRawMutex, ()> = Signal::new();

/// 制御タスクから状態を公開
pub fn publish(mode: ControllerMode, fault: FaultCode) {
    MODE.store(mode.as_u8(), Ordering::Relaxed);
    FAULT.store(fault.as_u8(), Ordering::Relaxed);
}

pub fn mode() -> ControllerMode {
    ControllerMode::from_u8(MODE.load(Ordering::Relaxed)).unwrap_or(ControllerMode::Disabled)
}

pub fn fault_code() -> u8 {
    FAULT.load(Ordering::Relaxed)
}
