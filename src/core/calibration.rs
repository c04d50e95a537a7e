use std::fmt;

use serde::Serialize;

/// 校正ステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    /// ステップ0: 校正溶液への浸漬を案内
    AwaitingSolution,
    /// ステップ1: サンプリングしてK値を確定
    Sampling,
}

impl CalibrationStep {
    /// ステップ番号から変換。不明な番号は`None`
    pub fn from_index(step: i32) -> Option<Self> {
        match step {
            0 => Some(Self::AwaitingSolution),
            1 => Some(Self::Sampling),
            _ => None,
        }
    }
}

/// 校正結果の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalibrationOutcome {
    /// 次のステップへ進む
    Next,
    /// 校正完了
    Done,
    /// エラー
    Error,
    /// 測定値が範囲外
    OutOfRange,
}

impl fmt::Display for CalibrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            CalibrationOutcome::Next => "NEXT",
            CalibrationOutcome::Done => "DONE",
            CalibrationOutcome::Error => "ERROR",
            CalibrationOutcome::OutOfRange => "OUT_OF_RANGE",
        };
        f.write_str(tag)
    }
}

/// 校正レスポンス（結果種別 + オペレーター向けメッセージ）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationResponse {
    pub outcome: CalibrationOutcome,
    pub message: String,
}

impl CalibrationResponse {
    pub fn new(outcome: CalibrationOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }

    pub fn next(message: impl Into<String>) -> Self {
        Self::new(CalibrationOutcome::Next, message)
    }

    pub fn done(message: impl Into<String>) -> Self {
        Self::new(CalibrationOutcome::Done, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(CalibrationOutcome::Error, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(CalibrationOutcome::OutOfRange, message)
    }
}
