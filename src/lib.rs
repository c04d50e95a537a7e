/*!
 * # Water Conductivity Sensor Library
 *
 * ECプローブ（電気伝導度）とPT1000温度プローブを使った水質センサーのドライバ
 *
 * ## モジュール構成
 * - `core`: センサー本体（設定、測定、校正）
 * - `hardware`: アナログ入力（ADC読み取り、平均化、mV変換）
 * - `storage`: 設定ファイルの永続化
 * - `utils`: EC・温度の計算（ハードウェア非依存）
 */

pub mod config;
pub mod core;
pub mod hardware;
pub mod storage;
pub mod utils;

// 内部で使用する型をまとめてエクスポート
pub use crate::core::{
    CalibrationOutcome, CalibrationResponse, Measurement, SensorError, SensorSettings,
    WaterConductivitySensor,
};
pub use hardware::{AdcReader, AnalogError, AnalogInput, AnalogSettings};
pub use storage::{FsStorage, MemoryStorage, Storage, StorageError};

/// ライブラリのバージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
