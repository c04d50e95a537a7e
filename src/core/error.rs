use crate::hardware::AnalogError;
use crate::storage::StorageError;

/// センサー操作のエラー
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// 設定JSONの解析失敗（不正なJSON・必須フィールド欠落）
    #[error("設定の解析に失敗しました: {0}")]
    Parse(#[from] serde_json::Error),

    /// 設定値が不正
    #[error("無効な設定です: {0}")]
    InvalidConfig(String),

    /// 校正時の測定電圧が範囲外
    #[error("測定電圧が範囲外です: {millivolts:.1} mV (0 - {max_millivolts:.0} mV)")]
    OutOfRange { millivolts: f32, max_millivolts: f32 },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Analog(#[from] AnalogError),
}
