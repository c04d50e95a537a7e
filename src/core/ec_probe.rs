use crate::utils::ec_calc::{calculate_k_value, compensate_ec_temperature, ec_from_millivolts};

/// ECプローブの変換オブジェクト
///
/// K値ごとに不変です。K値を変更する場合は新しいインスタンスを作成して置き換えます。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcProbe {
    k_value: f32,
}

impl EcProbe {
    pub fn new(k_value: f32) -> Self {
        Self { k_value }
    }

    /// 校正溶液中の電圧から新しいK値のプローブを作成
    ///
    /// 電圧が0以下の場合は`None`
    pub fn calibrated(voltage_mv: f32, reference_ec: f32) -> Option<Self> {
        calculate_k_value(voltage_mv, reference_ec).map(Self::new)
    }

    pub fn k_value(&self) -> f32 {
        self.k_value
    }

    /// 温度補正済みのEC値（μS/cm、25℃換算）
    pub fn ec_us_cm(&self, voltage_mv: f32, temperature_celsius: f32) -> f32 {
        compensate_ec_temperature(self.ec_us_cm_uncompensated(voltage_mv), temperature_celsius)
    }

    /// 温度補正なしのEC値（μS/cm）
    pub fn ec_us_cm_uncompensated(&self, voltage_mv: f32) -> f32 {
        ec_from_millivolts(voltage_mv, self.k_value)
    }
}
