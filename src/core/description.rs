use serde::Serialize;

/// デバイス説明メタデータ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: &'static str,
    pub parameters: [&'static str; 2],
    pub units: [&'static str; 2],
}

impl DeviceDescription {
    pub fn water_sensor(name: &str) -> Self {
        Self {
            name: name.to_string(),
            device_type: "Water Sensor",
            parameters: ["Conductivity", "Temperature"],
            units: ["µS/cm", "°C"],
        }
    }

    pub fn parameter_quantity(&self) -> usize {
        self.parameters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_sensor_description() {
        let description = DeviceDescription::water_sensor("tank");
        assert_eq!(description.device_type, "Water Sensor");
        assert_eq!(description.parameter_quantity(), 2);
        assert_eq!(description.units, ["µS/cm", "°C"]);
    }
}
