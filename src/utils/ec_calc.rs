/// EC（電気伝導度）およびPT1000温度の計算ユーティリティ
/// ハードウェア非依存の純粋関数を提供

/// EC変換回路のゲイン抵抗（Ω）
pub const EC_GAIN_RESISTOR: f32 = 820.0;

/// EC変換回路の基準抵抗（Ω）
pub const EC_REFERENCE_RESISTOR: f32 = 200.0;

/// 温度補正の基準温度（℃）
pub const REFERENCE_TEMPERATURE_C: f32 = 25.0;

/// 温度補正係数（2%/℃）
pub const TEMPERATURE_COEFFICIENT: f32 = 0.02;

/// PT1000アンプの差動ゲイン
pub const PT1000_DIFF_GAIN: f32 = 30.0 / 1.8;

/// PT1000ブリッジのオフセット電圧（V）
pub const PT1000_OFFSET_V: f32 = 0.223;

/// PT1000アンプの初段ゲイン
pub const PT1000_STAGE_GAIN: f32 = 2.0;

/// PT1000励起電流（A）
pub const PT1000_EXCITATION_A: f32 = 1.24 / 10000.0;

/// ADC生値の平均を電圧（mV）に変換
///
/// # Arguments
/// - `raw`: ADC生値（平均値）
/// - `reference_mv`: ADC基準電圧（mV）
/// - `resolution`: ADC分解能（コード数、例: 4096）
///
/// # Returns
/// - 電圧（mV）。分解能が0の場合は0.0
///
/// # Examples
/// ```
/// use water_conductivity_sensor::utils::ec_calc::raw_to_millivolts;
///
/// assert_eq!(raw_to_millivolts(2048.0, 3300.0, 4096), 1650.0);
/// ```
pub fn raw_to_millivolts(raw: f32, reference_mv: f32, resolution: u32) -> f32 {
    if resolution == 0 {
        return 0.0;
    }
    raw * reference_mv / resolution as f32
}

/// PT1000アンプ出力電圧から温度を計算
///
/// # Arguments
/// - `voltage_v`: アンプ出力電圧（V）
///
/// # Returns
/// - 温度（℃）
pub fn pt1000_voltage_to_celsius(voltage_v: f32) -> f32 {
    let resistance =
        (voltage_v / PT1000_DIFF_GAIN + PT1000_OFFSET_V) / PT1000_EXCITATION_A / PT1000_STAGE_GAIN;
    (resistance - 1000.0) / 3.85
}

/// K値を適用した未補正のEC値を計算
///
/// # Arguments
/// - `voltage_mv`: EC信号電圧（mV）
/// - `k_value`: 校正定数
///
/// # Returns
/// - EC値（μS/cm）
pub fn ec_from_millivolts(voltage_mv: f32, k_value: f32) -> f32 {
    100000.0 * voltage_mv / EC_GAIN_RESISTOR / EC_REFERENCE_RESISTOR * k_value
}

/// 温度補正されたEC値を計算
///
/// # Arguments
/// - `ec_raw`: 生EC値（μS/cm）
/// - `temperature_celsius`: 測定時の温度（℃）
///
/// # Returns
/// - 25℃換算のEC値（μS/cm）
///
/// # Examples
/// ```
/// use water_conductivity_sensor::utils::ec_calc::compensate_ec_temperature;
///
/// // 30℃で測定したEC 1100μS/cmを25℃換算
/// let ec = compensate_ec_temperature(1100.0, 30.0);
/// assert!((ec - 1000.0).abs() < 1.0);
/// ```
pub fn compensate_ec_temperature(ec_raw: f32, temperature_celsius: f32) -> f32 {
    let compensation_factor =
        1.0 + TEMPERATURE_COEFFICIENT * (temperature_celsius - REFERENCE_TEMPERATURE_C);

    // -25℃以下では補正係数が0以下になるため補正しない
    if compensation_factor <= 0.0 {
        return ec_raw;
    }

    ec_raw / compensation_factor
}

/// 校正溶液での測定電圧から新しいK値を計算
///
/// # Arguments
/// - `voltage_mv`: 校正溶液中のEC信号電圧（mV）
/// - `reference_ec`: 校正溶液の導電率（μS/cm）
///
/// # Returns
/// - K値。電圧が0以下の場合は`None`
pub fn calculate_k_value(voltage_mv: f32, reference_ec: f32) -> Option<f32> {
    if voltage_mv <= 0.0 || !voltage_mv.is_finite() {
        return None;
    }
    Some(reference_ec * EC_GAIN_RESISTOR * EC_REFERENCE_RESISTOR / 100000.0 / voltage_mv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_to_millivolts_midscale() {
        assert_eq!(raw_to_millivolts(2048.0, 3300.0, 4096), 1650.0);
    }

    #[test]
    fn test_raw_to_millivolts_zero_resolution() {
        assert_eq!(raw_to_millivolts(2048.0, 3300.0, 0), 0.0);
    }

    #[test]
    fn test_raw_to_millivolts_full_scale() {
        let mv = raw_to_millivolts(4095.0, 3300.0, 4096);
        assert!(mv < 3300.0);
        assert!(mv > 3299.0);
    }

    #[test]
    fn test_pt1000_at_zero_celsius() {
        // 0℃ = 1000Ω → (1000 * I * G0 - VR0) * GDIFF
        let voltage = (1000.0 * PT1000_EXCITATION_A * PT1000_STAGE_GAIN - PT1000_OFFSET_V)
            * PT1000_DIFF_GAIN;
        let temp = pt1000_voltage_to_celsius(voltage);
        assert!(temp.abs() < 0.05);
    }

    #[test]
    fn test_pt1000_at_25_celsius() {
        // 25℃ ≈ 0.8145V
        let temp = pt1000_voltage_to_celsius(0.8145);
        assert!((temp - 25.0).abs() < 0.1);
    }

    #[test]
    fn test_pt1000_monotonic() {
        let low = pt1000_voltage_to_celsius(0.5);
        let high = pt1000_voltage_to_celsius(1.5);
        assert!(low < high);
    }

    #[test]
    fn test_ec_from_millivolts_unity_k() {
        // 1640mV → 100000 * 1640 / 820 / 200 = 1000μS/cm
        let ec = ec_from_millivolts(1640.0, 1.0);
        assert!((ec - 1000.0).abs() < 0.01);
    }

    #[test]
    fn test_ec_from_millivolts_scales_with_k() {
        let base = ec_from_millivolts(1640.0, 1.0);
        let scaled = ec_from_millivolts(1640.0, 1.5);
        assert!((scaled - base * 1.5).abs() < 0.01);
    }

    #[test]
    fn test_ec_temp_compensation_same_temp() {
        assert_eq!(compensate_ec_temperature(1000.0, 25.0), 1000.0);
    }

    #[test]
    fn test_ec_temp_compensation_lower_temp() {
        // 20℃で900 μS/cm → 25℃換算で約1000 μS/cm
        let ec = compensate_ec_temperature(900.0, 20.0);
        assert!((ec - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_ec_temp_compensation_extreme_cold() {
        // 補正係数が0以下になる温度では補正しない
        assert_eq!(compensate_ec_temperature(1000.0, -30.0), 1000.0);
    }

    #[test]
    fn test_calculate_k_value_standard_solution() {
        let k = calculate_k_value(1650.0, 1413.0).unwrap();
        let expected: f32 = 1413.0 * 820.0 * 200.0 / 100000.0 / 1650.0;
        assert_eq!(k, expected);
        assert!((k - 1.404436).abs() < 1e-5);
    }

    #[test]
    fn test_calculate_k_value_round_trip() {
        // 校正後のK値で同じ電圧を変換すると基準値に戻る
        let k = calculate_k_value(2000.0, 1413.0).unwrap();
        let ec = ec_from_millivolts(2000.0, k);
        assert!((ec - 1413.0).abs() < 0.1);
    }

    #[test]
    fn test_calculate_k_value_zero_voltage() {
        assert_eq!(calculate_k_value(0.0, 1413.0), None);
        assert_eq!(calculate_k_value(-5.0, 1413.0), None);
    }
}
