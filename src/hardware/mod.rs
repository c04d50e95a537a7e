/// ハードウェア制御モジュール
pub mod analog;
#[cfg(feature = "esp")]
pub mod esp_adc;
pub mod mock;

pub use analog::{AdcReader, AnalogError, AnalogInput, AnalogSettings};
#[cfg(feature = "esp")]
pub use esp_adc::EspAdc;
