use super::escpos::CODE_PAGE_1251_POSIFLEX;
use crate::model::DeviceConnectionType;
use crate::types::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Connection and layout settings of a Posiflex printer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosiflexSettings {
    pub connection_type: DeviceConnectionType,
    /// USB product id, matched against attached devices
    pub product_id: u16,
    pub device_name: String,
    pub host: String,
    pub port: u16,
    pub code_page: i32,
    /// Blank lines printed for header/footer tasks
    pub offset_header_bottom: u32,
}

impl Default for PosiflexSettings {
    fn default() -> Self {
        Self {
            connection_type: DeviceConnectionType::Network,
            product_id: 0,
            device_name: String::new(),
            host: "192.168.".to_string(),
            port: 9100,
            code_page: CODE_PAGE_1251_POSIFLEX,
            offset_header_bottom: 0,
        }
    }
}

/// Decode settings, falling back to defaults when the JSON is unusable
pub fn extract_settings(json: &str) -> PosiflexSettings {
    serde_json::from_str(json).unwrap_or_else(|e| {
        warn!("Invalid Posiflex settings, using defaults: {}", e);
        PosiflexSettings::default()
    })
}

pub fn pack_settings(settings: &PosiflexSettings) -> Result<String> {
    Ok(serde_json::to_string(settings)?)
}
