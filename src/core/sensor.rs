use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::config::{settings_path, CALIBRATION_SAMPLES, CALIBRATION_SAMPLE_DELAY_MS};
use crate::core::calibration::{CalibrationResponse, CalibrationStep};
use crate::core::description::DeviceDescription;
use crate::core::ec_probe::EcProbe;
use crate::core::error::SensorError;
use crate::core::measurement::Measurement;
use crate::core::settings::SensorSettings;
use crate::hardware::{AdcReader, AnalogInput};
use crate::storage::Storage;
use crate::utils::ec_calc::pt1000_voltage_to_celsius;

/// 水質（EC + 水温）センサー
///
/// DFRobot EC Pro プローブとPT1000温度プローブを2つのアナログ入力で読み取り、
/// 温度補正済みの導電率と水温を測定します。
///
/// # 配線例（ESP32）
/// ```text
/// EC Probe board:
/// - EC signal   -> GPIO36 (ADC1_CH0)
/// - Temp signal -> GPIO39 (ADC1_CH3)
/// ```
pub struct WaterConductivitySensor<A: AdcReader, D: DelayNs, S: Storage> {
    description: DeviceDescription,
    settings: SensorSettings,
    config_path: String,
    analog: AnalogInput<A, D>,
    probe: EcProbe,
    storage: S,
    values: [f32; 2],
}

impl<A: AdcReader, D: DelayNs, S: Storage> WaterConductivitySensor<A, D, S> {
    /// 新しいセンサーインスタンスを作成
    ///
    /// # 引数
    /// * `name` - デバイス名
    /// * `ec_pin` - ECプローブのアナログピン
    /// * `temp_pin` - 温度プローブのアナログピン
    /// * `config_file` - 設定ファイル名（`/settings/sen/`以下に保存）
    pub fn new(
        name: &str,
        ec_pin: u8,
        temp_pin: u8,
        config_file: &str,
        adc: A,
        delay: D,
        storage: S,
    ) -> Self {
        let settings = SensorSettings::new(name, ec_pin, temp_pin);
        Self::with_settings(settings, config_file, adc, delay, storage)
    }

    /// ビルド時設定（cfg.toml）のデフォルト値でインスタンスを作成
    pub fn from_build_config(adc: A, delay: D, storage: S) -> Self {
        let config_file = crate::config::CONFIG.config_file;
        Self::with_settings(SensorSettings::default(), config_file, adc, delay, storage)
    }

    fn with_settings(
        settings: SensorSettings,
        config_file: &str,
        adc: A,
        delay: D,
        storage: S,
    ) -> Self {
        Self {
            description: DeviceDescription::water_sensor(&settings.name),
            analog: AnalogInput::new(adc, delay, settings.analog.clone()),
            probe: EcProbe::new(settings.k_value),
            config_path: settings_path(config_file),
            settings,
            storage,
            values: [0.0; 2],
        }
    }

    /// センサーを開始
    ///
    /// 設定ファイルがなければデフォルト設定を書き出し、あれば読み込んで適用します。
    pub fn begin(&mut self) -> Result<(), SensorError> {
        info!(
            "Starting {} (EC: GPIO{}, Temp: GPIO{})",
            self.description.name, self.settings.ec_pin, self.settings.temp_pin
        );
        self.analog.begin()?;

        let exists = self.storage.file_exists(&self.config_path).map_err(|e| {
            error!("Failed to check settings file: {}", e);
            SensorError::from(e)
        })?;
        if !exists {
            info!("No settings at {}, writing defaults", self.config_path);
            self.check_pins(&self.settings)?;
            let json = self.get_config()?;
            self.storage
                .write_file(&self.config_path, &json)
                .map_err(|e| {
                    error!("Failed to save default settings: {}", e);
                    SensorError::from(e)
                })?;
            Ok(())
        } else {
            let contents = self.storage.read_file(&self.config_path).map_err(|e| {
                error!("Failed to read settings: {}", e);
                SensorError::from(e)
            })?;
            self.set_config(&contents, false)
        }
    }

    /// 測定を実行
    ///
    /// 温度チャンネル、ECチャンネルの順に読み取ります（EC値は同じ測定サイクルの温度で補正）。
    pub fn take_measurement(&mut self) -> Result<Measurement, SensorError> {
        let temp_mv = self.get_millivolts(self.settings.temp_pin)?;
        let ec_mv = self.get_millivolts(self.settings.ec_pin)?;

        let temperature = pt1000_voltage_to_celsius(temp_mv / 1000.0);
        let conductivity = self.probe.ec_us_cm(ec_mv, temperature);

        let measurement = Measurement::new(conductivity, temperature, ec_mv, temp_mv)
            .validated(self.analog.settings().adc_voltage_mv);
        self.values = measurement.values();

        info!("🌊 {}", measurement.get_summary());
        for warning in &measurement.warnings {
            warn!("Measurement warning: {}", warning);
        }

        Ok(measurement)
    }

    /// 最新の測定値 {導電率 (μS/cm), 温度 (℃)}
    pub fn values(&self) -> &[f32; 2] {
        &self.values
    }

    /// 指定ピンの平均電圧（mV）を読み取る
    pub fn get_millivolts(&mut self, pin: u8) -> Result<f32, SensorError> {
        self.analog.configure(pin)?;
        Ok(self.analog.read_millivolts()?)
    }

    /// 現在の設定（アナログ入力の設定を含む）
    pub fn settings(&self) -> SensorSettings {
        SensorSettings {
            name: self.description.name.clone(),
            k_value: self.probe.k_value(),
            analog: self.analog.settings().clone(),
            ..self.settings.clone()
        }
    }

    /// 現在の設定をJSON文字列で取得
    pub fn get_config(&self) -> Result<String, SensorError> {
        Ok(self.settings().to_json()?)
    }

    /// JSON文字列から設定を適用
    ///
    /// 解析・検証に失敗した場合は状態を変更せずにエラーを返します。
    /// `save`がtrueの場合は適用前に設定ファイルへ書き込み、失敗時は適用しません。
    pub fn set_config(&mut self, config: &str, save: bool) -> Result<(), SensorError> {
        let settings = SensorSettings::from_json(config).map_err(|e| {
            error!("Deserialization failed: {}", e);
            SensorError::from(e)
        })?;

        if let Err(reason) = settings.validate() {
            error!("Invalid settings: {}", reason);
            return Err(SensorError::InvalidConfig(reason));
        }
        self.check_pins(&settings)?;

        if save {
            self.save_settings(&settings)?;
        }

        self.apply_settings(settings);
        info!(
            "Settings applied (EC: GPIO{}, Temp: GPIO{}, K: {:.4})",
            self.settings.ec_pin,
            self.settings.temp_pin,
            self.probe.k_value()
        );
        Ok(())
    }

    /// 校正ステップを実行
    ///
    /// * `0` - 校正溶液への浸漬を案内（状態変更なし）
    /// * `1` - ECチャンネルをサンプリングしK値を更新・保存
    /// * その他 - エラー
    pub fn calibrate(&mut self, step: i32) -> CalibrationResponse {
        match CalibrationStep::from_index(step) {
            Some(CalibrationStep::AwaitingSolution) => CalibrationResponse::next(format!(
                "Place the probe in the {:.0} µS/cm calibration solution and wait for the reading to settle, then continue",
                self.settings.calibration_reference
            )),
            Some(CalibrationStep::Sampling) => {
                let rolling_average = self.analog.rolling_average();
                self.analog.set_rolling_average(false);
                let result = self.sample_k_value(rolling_average);
                self.analog.set_rolling_average(rolling_average);

                match result {
                    Ok(k_value) => {
                        info!("✓ Calibration complete, K-value: {:.4}", k_value);
                        CalibrationResponse::done(format!(
                            "Calibration complete, K-value: {:.4}",
                            k_value
                        ))
                    }
                    Err(e @ SensorError::OutOfRange { .. }) => {
                        warn!("Calibration reading out of range: {}", e);
                        CalibrationResponse::out_of_range(e.to_string())
                    }
                    Err(e) => {
                        error!("Calibration failed: {}", e);
                        CalibrationResponse::error(e.to_string())
                    }
                }
            }
            None => {
                warn!("Invalid calibration step: {}", step);
                CalibrationResponse::error(format!(
                    "Invalid calibration step: {} (expected 0 or 1)",
                    step
                ))
            }
        }
    }

    pub fn description(&self) -> &DeviceDescription {
        &self.description
    }

    pub fn config_path(&self) -> &str {
        &self.config_path
    }

    pub fn k_value(&self) -> f32 {
        self.probe.k_value()
    }

    /// 校正溶液中のEC電圧を測定して新しいK値を確定する
    ///
    /// 保存する設定には校正前の移動平均フラグ`rolling_average`を書き込みます。
    fn sample_k_value(&mut self, rolling_average: bool) -> Result<f32, SensorError> {
        self.analog.configure(self.settings.ec_pin)?;
        let voltage_mv = self
            .analog
            .read_millivolts_with(CALIBRATION_SAMPLES, CALIBRATION_SAMPLE_DELAY_MS)?;
        info!("Calibration reading: {:.1} mV", voltage_mv);

        let max_millivolts = self.analog.settings().adc_voltage_mv;
        let out_of_range = SensorError::OutOfRange {
            millivolts: voltage_mv,
            max_millivolts,
        };
        if voltage_mv >= max_millivolts {
            return Err(out_of_range);
        }
        let probe = match EcProbe::calibrated(voltage_mv, self.settings.calibration_reference) {
            Some(probe) => probe,
            None => return Err(out_of_range),
        };

        let mut settings = self.settings();
        settings.k_value = probe.k_value();
        settings.analog.rolling_average = rolling_average;
        self.save_settings(&settings)?;

        self.probe = probe;
        self.settings.k_value = probe.k_value();
        Ok(probe.k_value())
    }

    fn check_pins(&self, settings: &SensorSettings) -> Result<(), SensorError> {
        for pin in [settings.ec_pin, settings.temp_pin] {
            if !self.analog.supports_pin(pin) {
                error!("GPIO{} is not an analog input", pin);
                return Err(SensorError::InvalidConfig(format!(
                    "GPIO{} is not an analog input",
                    pin
                )));
            }
        }
        Ok(())
    }

    fn save_settings(&mut self, settings: &SensorSettings) -> Result<(), SensorError> {
        let json = settings.to_json()?;
        self.storage.write_file(&self.config_path, &json).map_err(|e| {
            error!("Failed to save settings: {}", e);
            SensorError::from(e)
        })
    }

    fn apply_settings(&mut self, settings: SensorSettings) {
        self.description.name = settings.name.clone();
        // K値が変わる場合も含め、変換オブジェクトは常に作り直す
        self.probe = EcProbe::new(settings.k_value);
        self.analog.apply_settings(settings.analog.clone());
        self.settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calibration::CalibrationOutcome;
    use crate::hardware::mock::{MockAdc, MockDelay};
    use crate::storage::MemoryStorage;

    type TestSensor = WaterConductivitySensor<MockAdc, MockDelay, MemoryStorage>;

    fn sensor() -> (TestSensor, MockAdc, MemoryStorage) {
        let adc = MockAdc::new().with_pins(&[34, 35, 36, 39]);
        let storage = MemoryStorage::new();
        let sensor = WaterConductivitySensor::new(
            "tank",
            36,
            39,
            "DFWaterConductivity.json",
            adc.clone(),
            MockDelay::new(),
            storage.clone(),
        );
        (sensor, adc, storage)
    }

    #[test]
    fn test_config_path() {
        let (sensor, _, _) = sensor();
        assert_eq!(sensor.config_path(), "/settings/sen/DFWaterConductivity.json");
    }

    #[test]
    fn test_temperature_sampled_before_ec() {
        let (mut sensor, adc, _) = sensor();
        sensor.take_measurement().unwrap();

        let log = adc.get_read_log();
        assert_eq!(log.len(), 20);
        assert!(log[..10].iter().all(|pin| *pin == 39));
        assert!(log[10..].iter().all(|pin| *pin == 36));
    }

    #[test]
    fn test_values_written_in_order() {
        let (mut sensor, adc, _) = sensor();
        adc.set_value(36, 2048);
        adc.set_value(39, 1011);

        let measurement = sensor.take_measurement().unwrap();
        assert_eq!(
            *sensor.values(),
            [measurement.conductivity_us_cm, measurement.temperature_celsius]
        );
    }

    #[test]
    fn test_set_config_rejects_unsupported_pin() {
        let (mut sensor, _, _) = sensor();
        let mut settings = sensor.settings();
        settings.ec_pin = 2;
        let result = sensor.set_config(&settings.to_json().unwrap(), false);
        assert!(matches!(result, Err(SensorError::InvalidConfig(_))));
        assert_eq!(sensor.settings().ec_pin, 36);
    }

    #[test]
    fn test_calibration_restores_rolling_average() {
        let (mut sensor, adc, _) = sensor();
        adc.set_value(36, 2048);
        assert!(sensor.settings().analog.rolling_average);

        let response = sensor.calibrate(1);
        assert_eq!(response.outcome, CalibrationOutcome::Done);
        assert!(sensor.settings().analog.rolling_average);
    }

    #[test]
    fn test_calibration_restores_rolling_average_on_failure() {
        let (mut sensor, adc, _) = sensor();
        adc.set_read_error(true);

        let response = sensor.calibrate(1);
        assert_eq!(response.outcome, CalibrationOutcome::Error);
        assert!(sensor.settings().analog.rolling_average);
        assert_eq!(sensor.k_value(), 1.0);
    }

    #[test]
    fn test_calibration_uses_long_delay() {
        let adc = MockAdc::new();
        adc.set_value(36, 2048);
        let delay = MockDelay::new();
        let mut sensor = WaterConductivitySensor::new(
            "tank",
            36,
            39,
            "DFWaterConductivity.json",
            adc.clone(),
            delay.clone(),
            MemoryStorage::new(),
        );

        sensor.calibrate(1);
        assert_eq!(adc.read_count(36), 10);
        assert_eq!(delay.total_ms(), 9 * CALIBRATION_SAMPLE_DELAY_MS as u64);
    }

    #[test]
    fn test_calibration_out_of_range_keeps_k() {
        let (mut sensor, adc, storage) = sensor();
        adc.set_value(36, 0);

        let response = sensor.calibrate(1);
        assert_eq!(response.outcome, CalibrationOutcome::OutOfRange);
        assert_eq!(sensor.k_value(), 1.0);
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_calibration_saturated_reading_is_out_of_range() {
        let (mut sensor, adc, _) = sensor();
        adc.set_value(36, 4096);

        let response = sensor.calibrate(1);
        assert_eq!(response.outcome, CalibrationOutcome::OutOfRange);
        assert_eq!(sensor.k_value(), 1.0);
    }

    #[test]
    fn test_calibration_storage_failure_keeps_k() {
        let (mut sensor, adc, storage) = sensor();
        adc.set_value(36, 2048);
        storage.set_write_error(true);

        let response = sensor.calibrate(1);
        assert_eq!(response.outcome, CalibrationOutcome::Error);
        assert_eq!(sensor.k_value(), 1.0);
    }

    #[test]
    fn test_calibration_persists_k_value() {
        let (mut sensor, adc, storage) = sensor();
        adc.set_value(36, 2048);

        sensor.calibrate(1);
        let saved = storage.get(sensor.config_path()).unwrap();
        let settings = SensorSettings::from_json(&saved).unwrap();
        assert_eq!(settings.k_value, sensor.k_value());
        assert!(settings.analog.rolling_average);
    }

    #[test]
    fn test_calibration_persists_disabled_rolling_average() {
        let (mut sensor, adc, storage) = sensor();
        adc.set_value(36, 2048);
        let mut settings = sensor.settings();
        settings.analog.rolling_average = false;
        sensor.set_config(&settings.to_json().unwrap(), false).unwrap();

        assert_eq!(sensor.calibrate(1).outcome, CalibrationOutcome::Done);
        let saved = SensorSettings::from_json(&storage.get(sensor.config_path()).unwrap()).unwrap();
        assert!(!saved.analog.rolling_average);
        assert!(!sensor.settings().analog.rolling_average);
    }

    #[test]
    fn test_begin_does_not_overwrite_when_existence_check_fails() {
        let (mut sensor, _, storage) = sensor();
        storage.insert(sensor.config_path(), "{\"keep\":true}");
        storage.set_read_error(true);

        assert!(matches!(sensor.begin(), Err(SensorError::Storage(_))));
        assert_eq!(storage.write_count(), 0);
        assert_eq!(storage.get(sensor.config_path()).unwrap(), "{\"keep\":true}");
    }
}
