//! Responses returned by ECR drivers

use super::{bool_as_int, ResponseCode, ResponseFlags};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Firmware error: shift is already open
const SHIFT_ALREADY_OPENED: &str = "-3837";

/// Firmware error: shift has been open for more than 24 hours
const SHIFT_EXPIRED_24_HOURS: &str = "-3822";

fn default_result_code() -> i32 {
    ResponseCode::HandlingError.code()
}

/// Result code and message carried by every response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentResponse {
    #[serde(default = "default_result_code")]
    pub result_code: i32,
    #[serde(default)]
    pub result_info: String,
}

impl Default for EquipmentResponse {
    fn default() -> Self {
        Self {
            result_code: default_result_code(),
            result_info: String::new(),
        }
    }
}

impl EquipmentResponse {
    pub fn success() -> Self {
        Self {
            result_code: ResponseCode::Success.code(),
            result_info: String::new(),
        }
    }

    pub fn failure(code: ResponseCode, info: impl Into<String>) -> Self {
        Self {
            result_code: code.code(),
            result_info: info.into(),
        }
    }

    pub fn with_info(info: impl Into<String>) -> Self {
        Self {
            result_info: info.into(),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.result_code == ResponseCode::Success.code()
    }

    /// The code, if it names exactly one known outcome
    pub fn code(&self) -> Option<ResponseCode> {
        ResponseCode::try_from(self.result_code).ok()
    }

    pub fn flags(&self) -> ResponseFlags {
        ResponseFlags::from_bits_truncate(self.result_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenShiftResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
}

impl OpenShiftResponse {
    pub fn shift_already_opened(&self) -> bool {
        self.base.result_info.contains(SHIFT_ALREADY_OPENED)
    }

    pub fn shift_expired_24_hours(&self) -> bool {
        self.base.result_info.contains(SHIFT_EXPIRED_24_HOURS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrSessionState {
    #[serde(with = "bool_as_int", default)]
    pub shift_open: bool,
    #[serde(default)]
    pub shift_number: i32,
    #[serde(with = "bool_as_int", default)]
    pub paper_exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStateResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(default)]
    pub fr_session_state: FrSessionState,
}

/// State of the fiscal data operator link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfdStatus {
    #[serde(with = "bool_as_int", default)]
    pub is_error: bool,
    #[serde(default)]
    pub unset_docs_count: i32,
    #[serde(default)]
    pub error_code: i32,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub error_date: i64,
    #[serde(default)]
    pub error_text: String,
}

impl OfdStatus {
    pub fn error_time(&self) -> Option<DateTime<Utc>> {
        if self.error_date == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(self.error_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfdStatusResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(default)]
    pub ofd_status: OfdStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(default)]
    pub serial: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tax {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_handling_error() {
        let response = EquipmentResponse::default();
        assert_eq!(response.result_code, 4);
        assert!(!response.is_success());
        assert_eq!(response.code(), Some(ResponseCode::HandlingError));
    }

    #[test]
    fn test_missing_code_decodes_as_handling_error() {
        let response: EquipmentResponse = serde_json::from_str(r#"{"resultInfo":"?"}"#).unwrap();
        assert_eq!(response.code(), Some(ResponseCode::HandlingError));
    }

    #[test]
    fn test_combined_code() {
        let response: EquipmentResponse =
            serde_json::from_str(r#"{"resultCode":18,"resultInfo":"x"}"#).unwrap();
        assert_eq!(response.code(), None);
        assert_eq!(
            response.flags().codes(),
            vec![ResponseCode::WrongParameters, ResponseCode::NoConnection]
        );
    }

    #[test]
    fn test_open_shift_markers() {
        let opened = OpenShiftResponse {
            base: EquipmentResponse::failure(ResponseCode::LogicalError, "Error -3837: shift open"),
        };
        assert!(opened.shift_already_opened());
        assert!(!opened.shift_expired_24_hours());

        let expired = OpenShiftResponse {
            base: EquipmentResponse::with_info("code -3822"),
        };
        assert!(expired.shift_expired_24_hours());
    }

    #[test]
    fn test_session_state_flattened() {
        let json = r#"{"resultCode":0,"resultInfo":"","frSessionState":{"shiftOpen":1,"shiftNumber":12,"paperExists":0}}"#;
        let response: SessionStateResponse = serde_json::from_str(json).unwrap();
        assert!(response.base.is_success());
        assert!(response.fr_session_state.shift_open);
        assert_eq!(response.fr_session_state.shift_number, 12);
        assert!(!response.fr_session_state.paper_exists);
    }

    #[test]
    fn test_ofd_error_time() {
        let mut status = OfdStatus::default();
        assert!(status.error_time().is_none());
        status.error_date = 1_700_000_000_000;
        assert_eq!(status.error_time().unwrap().timestamp(), 1_700_000_000);
    }
}
