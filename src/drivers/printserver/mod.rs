//! Print server driver: tasks are forwarded as JSON over HTTP

pub mod api;
pub mod dto;

pub use api::{to_http_url, PrintServerApi, DEFAULT_PORT};

use super::EcrDriver;
use crate::model::{
    EquipmentResponse, OfdStatusResponse, OpenShiftResponse, SerialResponse, SessionStateResponse,
    Task, Tax,
};
use crate::types::{EquipmentError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where the server lives and which device configuration to run with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintServerSettings {
    pub url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Compressed device settings as returned by `/deviceSettingZip`
    #[serde(default)]
    pub setting_zip: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

pub struct PrintServer {
    api: PrintServerApi,
    settings_zip: String,
}

impl PrintServer {
    pub fn new(url: &str, port: u16, settings_zip: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api: PrintServerApi::new(url, port)?,
            settings_zip: settings_zip.into(),
        })
    }

    pub fn init_from_json(settings: &str) -> Result<Self> {
        let settings: PrintServerSettings = serde_json::from_str(settings)?;
        Self::new(&settings.url, settings.port, settings.setting_zip)
    }

    pub fn api(&self) -> &PrintServerApi {
        &self.api
    }
}

impl EcrDriver for PrintServer {
    fn name(&self) -> &str {
        "print-server"
    }

    fn execute(&mut self, tasks: &[Task], _finish_after: bool) -> Result<EquipmentResponse> {
        info!("Sending {} task(s) to {}", tasks.len(), self.api.base_url());
        self.api.execute(tasks, &self.settings_zip)
    }

    fn get_serial(&mut self, _finish_after: bool) -> Result<SerialResponse> {
        Ok(SerialResponse {
            base: EquipmentResponse::with_info("getInfo is not implemented for PrintServer"),
            ..Default::default()
        })
    }

    fn get_session_state(&mut self, _finish_after: bool) -> Result<SessionStateResponse> {
        Ok(SessionStateResponse {
            base: EquipmentResponse::with_info(
                "getSessionState is not implemented for PrintServer",
            ),
            ..Default::default()
        })
    }

    fn open_shift(&mut self, _finish_after: bool) -> Result<OpenShiftResponse> {
        Ok(OpenShiftResponse {
            base: EquipmentResponse::with_info("openShift is not implemented for PrintServer"),
        })
    }

    fn get_ofd_status(&mut self, _finish_after: bool) -> Result<OfdStatusResponse> {
        Err(EquipmentError::NotSupported("getOfdStatus"))
    }

    fn get_taxes(&mut self, _finish_after: bool) -> Result<Vec<Tax>> {
        let response = self.api.taxes(&self.settings_zip)?;
        if !response.base.is_success() {
            return Err(EquipmentError::Server(format!(
                "Obtaining taxes failed: {}",
                response.base.result_info
            )));
        }
        if response.taxes.is_empty() {
            return Err(EquipmentError::Server("Tax list is empty".into()));
        }
        Ok(response.taxes)
    }

    fn finish(&mut self) {}
}
