/// ユーティリティモジュール
/// ハードウェア非依存の純粋関数を提供

pub mod ec_calc;

// 便利な再エクスポート
pub use ec_calc::{calculate_k_value, compensate_ec_temperature, pt1000_voltage_to_celsius};
