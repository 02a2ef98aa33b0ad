//! Blocking HTTP client for the print server API

use super::dto::*;
use crate::model::{EquipmentResponse, Task};
use crate::types::{EquipmentError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default port of the print server
pub const DEFAULT_PORT: u16 = 8080;

/// `http://host:port` from what an operator typed
///
/// Adds the scheme when missing and the port unless the address already
/// ends with it.
pub fn to_http_url(host: &str, port: u16) -> String {
    let mut url = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    let suffix = format!(":{}", port);
    if !host.ends_with(&suffix) {
        url.push_str(&suffix);
    }
    url
}

pub struct PrintServerApi {
    client: Client,
    base_url: Url,
}

impl PrintServerApi {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let raw = to_http_url(host, port);
        let base_url = Url::parse(&raw).map_err(|e| EquipmentError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if base_url.host_str().map_or(true, str::is_empty) {
            return Err(EquipmentError::InvalidUrl(raw));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn post(&self, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| EquipmentError::InvalidUrl(e.to_string()))?;
        debug!("POST {}", url);
        Ok(self.client.post(url))
    }

    fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send()?.error_for_status()?;
        Ok(response.json()?)
    }

    fn zip_body(request: RequestBuilder, settings_zip: &str) -> RequestBuilder {
        request
            .header(CONTENT_TYPE, "text/plain")
            .body(format!("settingZip={}", settings_zip))
    }

    pub fn hi(&self) -> Result<MessageResponse> {
        Self::send(self.post("/hi")?)
    }

    pub fn version(&self) -> Result<VersionResponse> {
        Self::send(self.post("/version")?)
    }

    pub fn device_types(&self) -> Result<DevicesResponse> {
        Self::send(self.post("/supportDeviceType")?)
    }

    pub fn models(&self, type_id: i32) -> Result<ModelsResponse> {
        Self::send(self.post("/supportModels")?.form(&[("typeId", type_id)]))
    }

    pub fn device_settings(&self, driver_id: &str) -> Result<SettingsResponse> {
        Self::send(self.post("/deviceSetting")?.form(&[("driverId", driver_id)]))
    }

    /// Expand previously compressed settings back into editable form
    pub fn extract_device_settings(&self, settings_zip: &str) -> Result<SettingsResponse> {
        Self::send(Self::zip_body(self.post("/deviceSetting")?, settings_zip))
    }

    pub fn compress_settings(&self, values: &SettingsValues) -> Result<CompressedSettingsResponse> {
        Self::send(self.post("/deviceSettingZip")?.json(values))
    }

    /// Fetch a driver's settings, apply `edits` and return the compressed
    /// settings that tasks are executed with
    pub fn configure(
        &self,
        driver_id: &str,
        type_id: i32,
        edits: &[(String, String)],
    ) -> Result<String> {
        let mut settings = self.device_settings(driver_id)?;
        if !settings.base.is_success() {
            return Err(EquipmentError::Server(format!(
                "Obtaining settings failed: {}",
                settings.base.result_info
            )));
        }
        for (id, value) in edits {
            settings.apply(id, value)?;
        }

        let compressed = self.compress_settings(&settings.to_values(type_id))?;
        if !compressed.base.is_success() {
            return Err(EquipmentError::Server(format!(
                "Compressing settings failed: {}",
                compressed.base.result_info
            )));
        }
        if compressed.compressed_settings.is_empty() {
            return Err(EquipmentError::Server("Server returned empty settings".into()));
        }
        info!("Configured driver {} ({} change(s))", driver_id, edits.len());
        Ok(compressed.compressed_settings)
    }

    pub fn taxes(&self, settings_zip: &str) -> Result<TaxesResponse> {
        Self::send(Self::zip_body(self.post("/taxes")?, settings_zip))
    }

    pub fn execute(&self, tasks: &[Task], settings_zip: &str) -> Result<EquipmentResponse> {
        let request = TasksRequest {
            tasks: tasks.to_vec(),
            settings: settings_zip.to_string(),
        };
        Self::send(self.post("/execute")?.json(&request))
    }
}
