use esp_idf_svc::sys::{
    adc_atten_t_ADC_ATTEN_DB_12, adc_bitwidth_t_ADC_BITWIDTH_DEFAULT, adc_channel_t,
    adc_oneshot_chan_cfg_t, adc_oneshot_config_channel, adc_oneshot_del_unit,
    adc_oneshot_io_to_channel, adc_oneshot_new_unit, adc_oneshot_read,
    adc_oneshot_unit_handle_t, adc_oneshot_unit_init_cfg_t, adc_unit_t, adc_unit_t_ADC_UNIT_1,
    esp,
};
use log::{info, warn};

use super::analog::{AdcReader, AnalogError};

/// ESP-IDF oneshot ADC1 を使ったADC読み取り
///
/// WiFi競合を避けるため ADC1 に接続されたピンのみ受け付けます。
/// チャンネルは最初の読み取り時に 12dB 減衰で設定されます。
pub struct EspAdc {
    handle: adc_oneshot_unit_handle_t,
    configured: Vec<u8>,
}

impl EspAdc {
    pub fn new() -> anyhow::Result<Self> {
        info!("ADC1を初期化しています (oneshot)");
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = std::ptr::null_mut();
        esp!(unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) })?;

        Ok(Self {
            handle,
            configured: Vec::new(),
        })
    }

    fn channel_of(pin: u8) -> Option<adc_channel_t> {
        let mut unit: adc_unit_t = 0;
        let mut channel: adc_channel_t = 0;
        let result = esp!(unsafe { adc_oneshot_io_to_channel(pin as i32, &mut unit, &mut channel) });
        if result.is_ok() && unit == adc_unit_t_ADC_UNIT_1 {
            Some(channel)
        } else {
            None
        }
    }

    fn ensure_configured(&mut self, pin: u8, channel: adc_channel_t) -> Result<(), AnalogError> {
        if self.configured.contains(&pin) {
            return Ok(());
        }
        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
        };
        esp!(unsafe { adc_oneshot_config_channel(self.handle, channel, &chan_cfg) }).map_err(
            |e| AnalogError::ReadFailed {
                pin,
                reason: format!("channel config: {}", e),
            },
        )?;
        self.configured.push(pin);
        Ok(())
    }
}

impl AdcReader for EspAdc {
    fn supports_pin(&self, pin: u8) -> bool {
        Self::channel_of(pin).is_some()
    }

    fn read_raw(&mut self, pin: u8) -> Result<u16, AnalogError> {
        let channel = Self::channel_of(pin).ok_or(AnalogError::UnsupportedPin(pin))?;
        self.ensure_configured(pin, channel)?;

        let mut raw: i32 = 0;
        esp!(unsafe { adc_oneshot_read(self.handle, channel, &mut raw) }).map_err(|e| {
            warn!("ADC読み取りエラー (GPIO{}): {}", pin, e);
            AnalogError::ReadFailed {
                pin,
                reason: e.to_string(),
            }
        })?;
        Ok(raw.max(0) as u16)
    }
}

impl Drop for EspAdc {
    fn drop(&mut self) {
        unsafe {
            adc_oneshot_del_unit(self.handle);
        }
    }
}
