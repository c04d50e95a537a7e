use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CALIBRATION_REFERENCE, DEFAULT_K_VALUE};
use crate::hardware::AnalogSettings;

/// センサー設定（設定ファイルのJSONと1対1で対応）
///
/// ```json
/// {"Name":"DFWaterConductivity","EC_Pin":36,"Temp_Pin":39,"K_Value":1.0,
///  "Calibration_Reference":1413.0,"ADC_Voltage_mv":3300.0,"ADC_Resolution":4096,
///  "RollingAverage":true,"AverageSize":5}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSettings {
    /// デバイス名
    #[serde(rename = "Name")]
    pub name: String,

    /// ECプローブのアナログピン
    #[serde(rename = "EC_Pin")]
    pub ec_pin: u8,

    /// 温度プローブのアナログピン
    #[serde(rename = "Temp_Pin")]
    pub temp_pin: u8,

    /// 校正定数（K値）
    #[serde(rename = "K_Value")]
    pub k_value: f32,

    /// 校正溶液の導電率（μS/cm）
    #[serde(rename = "Calibration_Reference")]
    pub calibration_reference: f32,

    /// アナログ入力の設定
    #[serde(flatten)]
    pub analog: AnalogSettings,
}

impl SensorSettings {
    pub fn new(name: &str, ec_pin: u8, temp_pin: u8) -> Self {
        Self {
            name: name.to_string(),
            ec_pin,
            temp_pin,
            k_value: DEFAULT_K_VALUE,
            calibration_reference: DEFAULT_CALIBRATION_REFERENCE,
            analog: AnalogSettings::default(),
        }
    }

    /// ピン以外の値を検証（ピンはADC側で検証する）
    pub fn validate(&self) -> Result<(), String> {
        if !(self.k_value.is_finite() && self.k_value > 0.0) {
            return Err(format!("K_Value must be a positive number: {}", self.k_value));
        }
        if !(self.calibration_reference.is_finite() && self.calibration_reference > 0.0) {
            return Err(format!(
                "Calibration_Reference must be a positive number: {}",
                self.calibration_reference
            ));
        }
        if self.ec_pin == self.temp_pin {
            return Err(format!(
                "EC_Pin and Temp_Pin must differ (both GPIO{})",
                self.ec_pin
            ));
        }
        self.analog.validate().map_err(|e| e.to_string())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        let config = crate::config::CONFIG;
        Self::new(config.device_name, config.ec_pin, config.temp_pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SensorSettings::new("tank", 36, 39);
        assert_eq!(settings.k_value, 1.0);
        assert_eq!(settings.calibration_reference, 1413.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_json_field_names() {
        let json = SensorSettings::new("tank", 36, 39).to_json().unwrap();
        for key in [
            "\"Name\"",
            "\"EC_Pin\"",
            "\"Temp_Pin\"",
            "\"K_Value\"",
            "\"Calibration_Reference\"",
            "\"ADC_Voltage_mv\"",
            "\"ADC_Resolution\"",
            "\"RollingAverage\"",
            "\"AverageSize\"",
        ] {
            assert!(json.contains(key), "missing {} in {}", key, json);
        }
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = SensorSettings::new("tank", 34, 35);
        settings.k_value = 1.0473;
        settings.calibration_reference = 12880.0;
        settings.analog.rolling_average = false;

        let parsed = SensorSettings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_legacy_adc_voltage_key() {
        let json = r#"{"Name":"tank","EC_Pin":36,"Temp_Pin":39,"K_Value":1.0,
            "Calibration_Reference":1413.0,"ADC_Volatage_mv":3300,"ADC_Resolution":4096,
            "RollingAverage":true,"AverageSize":5}"#;
        let settings = SensorSettings::from_json(json).unwrap();
        assert_eq!(settings.analog.adc_voltage_mv, 3300.0);
    }

    #[test]
    fn test_missing_field_is_error() {
        let json = r#"{"Name":"tank","EC_Pin":36,"Temp_Pin":39}"#;
        assert!(SensorSettings::from_json(json).is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_k() {
        let mut settings = SensorSettings::new("tank", 36, 39);
        settings.k_value = 0.0;
        assert!(settings.validate().is_err());
        settings.k_value = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_reference() {
        let mut settings = SensorSettings::new("tank", 36, 39);
        settings.calibration_reference = -1413.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shared_pin() {
        let settings = SensorSettings::new("tank", 36, 36);
        assert!(settings.validate().is_err());
    }
}
