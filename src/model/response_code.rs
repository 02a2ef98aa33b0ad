use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Result codes reported by drivers and the print server
///
/// Every failure code is a distinct power of two so a raw `resultCode` may
/// carry several of them; see [`ResponseFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResponseCode {
    Success = 0,
    MissedParameters = 1,
    WrongParameters = 2,
    HandlingError = 4,
    AuthorizationError = 8,
    NoConnection = 16,
    LogicalError = 32,
    InternalError = 64,
}

impl ResponseCode {
    pub const ALL: [ResponseCode; 8] = [
        ResponseCode::Success,
        ResponseCode::MissedParameters,
        ResponseCode::WrongParameters,
        ResponseCode::HandlingError,
        ResponseCode::AuthorizationError,
        ResponseCode::NoConnection,
        ResponseCode::LogicalError,
        ResponseCode::InternalError,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ResponseCode::Success
    }
}

impl TryFrom<i32> for ResponseCode {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        ResponseCode::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(value)
    }
}

impl From<ResponseCode> for i32 {
    fn from(code: ResponseCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseCode::Success => "success",
            ResponseCode::MissedParameters => "missed parameters",
            ResponseCode::WrongParameters => "wrong parameters",
            ResponseCode::HandlingError => "handling error",
            ResponseCode::AuthorizationError => "authorization error",
            ResponseCode::NoConnection => "no connection",
            ResponseCode::LogicalError => "logical error",
            ResponseCode::InternalError => "internal error",
        };
        f.write_str(name)
    }
}

impl Serialize for ResponseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = i32::deserialize(deserializer)?;
        ResponseCode::try_from(code)
            .map_err(|c| serde::de::Error::custom(format!("unknown response code {}", c)))
    }
}

bitflags! {
    /// Failure bits of a raw `resultCode`. Success is the empty set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResponseFlags: i32 {
        const MISSED_PARAMETERS = 1;
        const WRONG_PARAMETERS = 2;
        const HANDLING_ERROR = 4;
        const AUTHORIZATION_ERROR = 8;
        const NO_CONNECTION = 16;
        const LOGICAL_ERROR = 32;
        const INTERNAL_ERROR = 64;
    }
}

impl ResponseFlags {
    /// Individual codes set in this mask, lowest bit first
    pub fn codes(self) -> Vec<ResponseCode> {
        ResponseCode::ALL
            .into_iter()
            .filter(|c| !c.is_success() && self.bits() & c.code() != 0)
            .collect()
    }
}

impl From<ResponseCode> for ResponseFlags {
    fn from(code: ResponseCode) -> Self {
        ResponseFlags::from_bits_truncate(code.code())
    }
}
