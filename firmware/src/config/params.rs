//! ボード固有の設定パラメータ
//!
//! 制御側のしきい値は`ebike_commutation::config`を参照。

/// PWM設定（TIM1ハイサイド）
pub mod pwm {
    use embassy_stm32::time::Hertz;

    /// PWMキャリア周波数（16kHz）
    pub const DEFAULT_FREQUENCY: Hertz = Hertz(16_000);
}

/// ADC設定
pub mod adc {
    /// 12bit生値を制御側の0–1023領域に落とすシフト量
    pub const RESOLUTION_SHIFT: u8 = 2;
}

/// ブザー設定（TIM3 CH1）
pub mod buzzer {
    use embassy_stm32::time::Hertz;

    /// 初期化時の周波数（無音で開始）
    pub const IDLE_FREQUENCY: Hertz = Hertz(2_000);

    /// 発音時のデューティ [%]
    pub const DUTY_PERCENT: u16 = 50;
}

/// 制御ループ設定
pub mod control {
    /// ステータスログ間隔（ループ回数）
    pub const STATUS_LOG_INTERVAL: u32 = 50_000;
}

/// LED表示設定
pub mod led {
    /// 点滅周期 [ms]
    pub const BLINK_PERIOD_MS: u64 = 250;
}
