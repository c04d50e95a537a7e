use std::collections::{BTreeMap, VecDeque};

use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_AVERAGE_SIZE, MEASUREMENT_SAMPLES, MEASUREMENT_SAMPLE_DELAY_MS};
use crate::utils::ec_calc::raw_to_millivolts;

/// アナログ入力のエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalogError {
    #[error("アナログ入力に対応していないピンです: GPIO{0}")]
    UnsupportedPin(u8),
    #[error("読み取り対象のピンが設定されていません")]
    NotConfigured,
    #[error("ADC読み取りに失敗しました (GPIO{pin}): {reason}")]
    ReadFailed { pin: u8, reason: String },
}

/// ADC生値を読み取るインターフェース
///
/// 実機用（ESP-IDF oneshot ADC）とテスト用（Mock）の実装を切り替えるためのトレイトです。
pub trait AdcReader {
    /// 指定ピンがアナログ入力として使用可能か
    fn supports_pin(&self, pin: u8) -> bool;

    /// 指定ピンのADC生値を1回読み取る
    fn read_raw(&mut self, pin: u8) -> Result<u16, AnalogError>;
}

/// アナログ入力の設定
///
/// 永続化される設定ファイルにセンサー固有の設定と一緒に保存されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalogSettings {
    /// ADC基準電圧（mV）
    #[serde(rename = "ADC_Voltage_mv", alias = "ADC_Volatage_mv")]
    pub adc_voltage_mv: f32,

    /// ADC分解能（コード数）
    #[serde(rename = "ADC_Resolution")]
    pub adc_resolution: u32,

    /// 移動平均を有効にするか
    #[serde(rename = "RollingAverage")]
    pub rolling_average: bool,

    /// 移動平均のウィンドウ長
    #[serde(rename = "AverageSize")]
    pub average_size: u8,
}

impl AnalogSettings {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.adc_voltage_mv.is_finite() && self.adc_voltage_mv > 0.0) {
            return Err("ADC reference voltage must be positive");
        }
        if self.adc_resolution == 0 {
            return Err("ADC resolution cannot be zero");
        }
        if self.average_size == 0 {
            return Err("Average size cannot be zero");
        }
        Ok(())
    }
}

impl Default for AnalogSettings {
    fn default() -> Self {
        Self {
            adc_voltage_mv: crate::config::CONFIG.adc_voltage_mv,
            adc_resolution: crate::config::CONFIG.adc_resolution,
            rolling_average: true,
            average_size: DEFAULT_AVERAGE_SIZE,
        }
    }
}

/// 平均化付きアナログ入力
///
/// ピン設定・バースト平均・mV変換・移動平均を担当します。
/// センサーはこの構造体を所有し、読み取り前に対象ピンを`configure`します。
pub struct AnalogInput<A: AdcReader, D: DelayNs> {
    adc: A,
    delay: D,
    pin: Option<u8>,
    settings: AnalogSettings,
    samples: u8,
    sample_delay_ms: u32,
    history: BTreeMap<u8, VecDeque<f32>>,
}

impl<A: AdcReader, D: DelayNs> AnalogInput<A, D> {
    pub fn new(adc: A, delay: D, settings: AnalogSettings) -> Self {
        Self {
            adc,
            delay,
            pin: None,
            settings,
            samples: MEASUREMENT_SAMPLES,
            sample_delay_ms: MEASUREMENT_SAMPLE_DELAY_MS,
            history: BTreeMap::new(),
        }
    }

    /// 初期化: 移動平均の履歴をクリアし、設定済みピンを再確認する
    pub fn begin(&mut self) -> Result<(), AnalogError> {
        self.history.clear();
        if let Some(pin) = self.pin {
            self.configure(pin)?;
        }
        Ok(())
    }

    /// 読み取り対象のピンを設定
    pub fn configure(&mut self, pin: u8) -> Result<(), AnalogError> {
        if !self.adc.supports_pin(pin) {
            warn!("GPIO{} is not an analog input", pin);
            return Err(AnalogError::UnsupportedPin(pin));
        }
        self.pin = Some(pin);
        Ok(())
    }

    /// ピンがアナログ入力として使用可能か
    pub fn supports_pin(&self, pin: u8) -> bool {
        self.adc.supports_pin(pin)
    }

    pub fn pin(&self) -> Option<u8> {
        self.pin
    }

    pub fn settings(&self) -> &AnalogSettings {
        &self.settings
    }

    /// 設定を置き換える。ウィンドウ長が変わった場合は履歴を破棄する
    pub fn apply_settings(&mut self, settings: AnalogSettings) {
        if settings.average_size != self.settings.average_size
            || settings.adc_voltage_mv != self.settings.adc_voltage_mv
            || settings.adc_resolution != self.settings.adc_resolution
        {
            self.history.clear();
        }
        self.settings = settings;
    }

    pub fn rolling_average(&self) -> bool {
        self.settings.rolling_average
    }

    pub fn set_rolling_average(&mut self, enabled: bool) {
        self.settings.rolling_average = enabled;
    }

    /// 設定済みピンを通常のサンプル数・遅延で読み取り、mVで返す
    pub fn read_millivolts(&mut self) -> Result<f32, AnalogError> {
        self.read_millivolts_with(self.samples, self.sample_delay_ms)
    }

    /// 設定済みピンを指定のサンプル数・遅延で読み取り、mVで返す
    ///
    /// 移動平均が有効な場合はバースト平均をピンごとのウィンドウに追加し、
    /// ウィンドウ平均を返します。
    pub fn read_millivolts_with(&mut self, samples: u8, delay_ms: u32) -> Result<f32, AnalogError> {
        let pin = self.pin.ok_or(AnalogError::NotConfigured)?;
        let samples = samples.max(1);

        let mut sum: u32 = 0;
        for i in 0..samples {
            sum += self.adc.read_raw(pin)? as u32;
            if i + 1 < samples {
                self.delay.delay_ms(delay_ms);
            }
        }
        let mean_raw = sum as f32 / samples as f32;
        let burst_mv = raw_to_millivolts(
            mean_raw,
            self.settings.adc_voltage_mv,
            self.settings.adc_resolution,
        );

        if !self.settings.rolling_average {
            debug!("GPIO{}: {:.1} mV (raw mean {:.1})", pin, burst_mv, mean_raw);
            return Ok(burst_mv);
        }

        let window = self.settings.average_size.max(1) as usize;
        let history = self.history.entry(pin).or_default();
        history.push_back(burst_mv);
        while history.len() > window {
            history.pop_front();
        }
        let averaged = history.iter().sum::<f32>() / history.len() as f32;
        debug!(
            "GPIO{}: {:.1} mV (burst {:.1} mV, window {}/{})",
            pin,
            averaged,
            burst_mv,
            history.len(),
            window
        );
        Ok(averaged)
    }
}
