//! ECR driver trait and implementations

pub mod posiflex;
pub mod printserver;

pub use posiflex::Posiflex;
pub use printserver::PrintServer;

use crate::model::{
    EquipmentResponse, OfdStatusResponse, OpenShiftResponse, SerialResponse, SessionStateResponse,
    Task, Tax,
};
use crate::types::{EquipmentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A device (or service) that executes print and fiscal tasks
///
/// Every call takes `finish_after`: when true the driver releases its
/// connection once the call is done.
pub trait EcrDriver: Send {
    /// Driver name (e.g., "posiflex")
    fn name(&self) -> &str;

    /// Run the tasks in order
    fn execute(&mut self, tasks: &[Task], finish_after: bool) -> Result<EquipmentResponse>;

    fn get_serial(&mut self, finish_after: bool) -> Result<SerialResponse>;

    fn get_session_state(&mut self, finish_after: bool) -> Result<SessionStateResponse>;

    fn open_shift(&mut self, finish_after: bool) -> Result<OpenShiftResponse>;

    fn get_ofd_status(&mut self, finish_after: bool) -> Result<OfdStatusResponse>;

    fn get_taxes(&mut self, _finish_after: bool) -> Result<Vec<Tax>> {
        Err(EquipmentError::NotSupported("getTaxes"))
    }

    /// Release the connection. Never fails.
    fn finish(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DriverKind {
    Posiflex,
    PrintServer,
}

impl DriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Posiflex => "posiflex",
            DriverKind::PrintServer => "print-server",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a driver from its packed settings
pub fn open_driver(kind: DriverKind, settings: &str) -> Result<Box<dyn EcrDriver>> {
    match kind {
        DriverKind::Posiflex => Ok(Box::new(Posiflex::init_from_json(settings)?)),
        DriverKind::PrintServer => Ok(Box::new(PrintServer::init_from_json(settings)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(DriverKind::Posiflex.to_string(), "posiflex");
        assert_eq!(
            serde_json::to_string(&DriverKind::PrintServer).unwrap(),
            "\"print-server\""
        );
    }

    #[test]
    fn test_open_print_server_driver() {
        let driver = open_driver(
            DriverKind::PrintServer,
            r#"{"url":"127.0.0.1","port":8080,"settingZip":"abc"}"#,
        )
        .unwrap();
        assert_eq!(driver.name(), "print-server");
    }

    #[test]
    fn test_open_posiflex_driver() {
        let driver = open_driver(DriverKind::Posiflex, r#"{"host":"127.0.0.1"}"#).unwrap();
        assert_eq!(driver.name(), "posiflex");
    }

    #[test]
    fn test_open_print_server_bad_settings() {
        let result = open_driver(DriverKind::PrintServer, "{");
        assert!(matches!(result, Err(EquipmentError::Json(_))));
    }
}
