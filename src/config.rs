/// ビルド時設定
///
/// この構造体はビルド時に`cfg.toml`ファイルから読み込まれた設定を保持します。
/// `cfg.toml`が存在しない場合は`#[default]`の値が使われます。
#[toml_cfg::toml_config]
pub struct Config {
    #[default("DFWaterConductivity")]
    device_name: &'static str,

    #[default("DFWaterConductivity.json")]
    config_file: &'static str,

    #[default(36)]
    ec_pin: u8,

    #[default(39)]
    temp_pin: u8,

    // ADC設定
    #[default(3300.0)]
    adc_voltage_mv: f32,

    #[default(4096)]
    adc_resolution: u32,

    // 制御ループ（ESPバイナリのみ使用）
    #[default(60)]
    measurement_interval_seconds: u64,

    #[default("/spiffs")]
    storage_root: &'static str,
}

/// 設定ファイルを保存するディレクトリ
pub const SETTINGS_DIR: &str = "/settings/sen/";

/// K値のデフォルト
pub const DEFAULT_K_VALUE: f32 = 1.0;

/// 校正溶液の導電率デフォルト（μS/cm）
pub const DEFAULT_CALIBRATION_REFERENCE: f32 = 1413.0;

/// 通常測定時のサンプル数
pub const MEASUREMENT_SAMPLES: u8 = 10;

/// 通常測定時のサンプル間遅延（ミリ秒）
pub const MEASUREMENT_SAMPLE_DELAY_MS: u32 = 5;

/// 校正時のサンプル数
pub const CALIBRATION_SAMPLES: u8 = 10;

/// 校正時のサンプル間遅延（ミリ秒）
pub const CALIBRATION_SAMPLE_DELAY_MS: u32 = 100;

/// 移動平均ウィンドウのデフォルト長
pub const DEFAULT_AVERAGE_SIZE: u8 = 5;

/// 設定ファイル名から保存先パスを組み立てる
pub fn settings_path(config_file: &str) -> String {
    format!("{}{}", SETTINGS_DIR, config_file)
}

/// 測定間隔（秒）をFreeRTOSの遅延に渡すミリ秒へ変換
///
/// u32に収まらない間隔（約49日超）はエラーにします。
pub fn measurement_interval_ms(seconds: u64) -> anyhow::Result<u32> {
    let millis = seconds
        .checked_mul(1000)
        .ok_or_else(|| anyhow::anyhow!("measurement interval too long: {}s", seconds))?;
    u32::try_from(millis)
        .map_err(|_| anyhow::anyhow!("measurement interval too long: {}s", seconds))
}
