/// コアシステムモジュール
pub mod calibration;
pub mod description;
pub mod ec_probe;
pub mod error;
pub mod measurement;
pub mod sensor;
pub mod settings;

pub use calibration::{CalibrationOutcome, CalibrationResponse, CalibrationStep};
pub use description::DeviceDescription;
pub use ec_probe::EcProbe;
pub use error::SensorError;
pub use measurement::Measurement;
pub use sensor::WaterConductivitySensor;
pub use settings::SensorSettings;
