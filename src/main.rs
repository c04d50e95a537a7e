use std::ffi::CString;

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sys::{esp, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};
use log::{error, info, warn};

use water_conductivity_sensor::config::{measurement_interval_ms, CONFIG};
use water_conductivity_sensor::hardware::EspAdc;
use water_conductivity_sensor::{FsStorage, WaterConductivitySensor};

/// SPIFFSを`storage_root`にマウントする
fn mount_spiffs(base_path: &str) -> anyhow::Result<()> {
    let base_path = CString::new(base_path)?;
    let conf = esp_vfs_spiffs_conf_t {
        base_path: base_path.as_ptr(),
        partition_label: std::ptr::null(),
        max_files: 4,
        format_if_mount_failed: true,
    };
    esp!(unsafe { esp_vfs_spiffs_register(&conf) })?;
    // base_pathはVFSに登録された後も参照されるため解放しない
    std::mem::forget(base_path);
    Ok(())
}

/// アプリケーションのメインエントリーポイント
fn main() -> anyhow::Result<()> {
    // ESP-IDFの基本初期化
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("=== Water Conductivity Sensor v{} ===", water_conductivity_sensor::VERSION);

    mount_spiffs(CONFIG.storage_root).map_err(|e| {
        error!("SPIFFSのマウントに失敗しました: {}", e);
        e
    })?;

    let adc = EspAdc::new()?;
    let storage = FsStorage::new(CONFIG.storage_root);
    let mut sensor = WaterConductivitySensor::from_build_config(adc, FreeRtos, storage);

    sensor
        .begin()
        .map_err(|e| anyhow::anyhow!("センサーの初期化に失敗しました: {}", e))?;
    info!("設定: {}", sensor.get_config()?);

    let interval_ms = measurement_interval_ms(CONFIG.measurement_interval_seconds)?;

    loop {
        match sensor.take_measurement() {
            Ok(measurement) if !measurement.is_reliable => {
                warn!("信頼性の低い測定値: {}", measurement.get_summary());
            }
            Ok(_) => {}
            Err(e) => error!("測定に失敗しました: {}", e),
        }
        FreeRtos::delay_ms(interval_ms);
    }
}
