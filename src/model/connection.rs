use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How a locally attached printer is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceConnectionType {
    #[default]
    Network,
    Usb,
}

impl DeviceConnectionType {
    pub fn as_code(&self) -> &'static str {
        match self {
            DeviceConnectionType::Network => "1",
            DeviceConnectionType::Usb => "2",
        }
    }

    /// Unknown codes fall back to the network connection
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "2" => DeviceConnectionType::Usb,
            _ => DeviceConnectionType::Network,
        }
    }
}

impl Serialize for DeviceConnectionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_code())
    }
}

impl<'de> Deserialize<'de> for DeviceConnectionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let code = match &value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(DeviceConnectionType::from_code(&code))
    }
}
