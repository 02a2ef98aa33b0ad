//! Task type tokens
//!
//! Two token sets are in circulation: the lower-case set that tasks are
//! serialized with, and an older PascalCase set that lacks the printing
//! utility tasks. Parsing accepts both because comparison ignores case.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskType {
    #[default]
    String,
    Barcode,
    Image,
    Registration,
    CloseCheck,
    CancelCheck,
    OpenCheckSell,
    Payment,
    OpenCheckReturn,
    Return,
    CashIncome,
    CashOutcome,
    ClientContact,
    Report,
    SyncTime,
    PrintHeader,
    /// Declared by the server vocabulary, not handled by any driver
    PrintSlip,
    PrintFooter,
    Cut,
}

impl TaskType {
    pub const ALL: [TaskType; 19] = [
        TaskType::String,
        TaskType::Barcode,
        TaskType::Image,
        TaskType::Registration,
        TaskType::CloseCheck,
        TaskType::CancelCheck,
        TaskType::OpenCheckSell,
        TaskType::Payment,
        TaskType::OpenCheckReturn,
        TaskType::Return,
        TaskType::CashIncome,
        TaskType::CashOutcome,
        TaskType::ClientContact,
        TaskType::Report,
        TaskType::SyncTime,
        TaskType::PrintHeader,
        TaskType::PrintSlip,
        TaskType::PrintFooter,
        TaskType::Cut,
    ];

    /// Lower-case wire token
    pub fn as_token(&self) -> &'static str {
        match self {
            TaskType::String => "string",
            TaskType::Barcode => "barcode",
            TaskType::Image => "image",
            TaskType::Registration => "registration",
            TaskType::CloseCheck => "closecheck",
            TaskType::CancelCheck => "cancelcheck",
            TaskType::OpenCheckSell => "openchecksell",
            TaskType::Payment => "payment",
            TaskType::OpenCheckReturn => "opencheckreturn",
            TaskType::Return => "return",
            TaskType::CashIncome => "cashincome",
            TaskType::CashOutcome => "cashoutcome",
            TaskType::ClientContact => "clientcontact",
            TaskType::Report => "report",
            TaskType::SyncTime => "synctime",
            TaskType::PrintHeader => "printheader",
            TaskType::PrintSlip => "printslip",
            TaskType::PrintFooter => "printfooter",
            TaskType::Cut => "cut",
        }
    }

    /// Name in the PascalCase set, `None` for tasks that set never declared
    pub fn pascal_name(&self) -> Option<&'static str> {
        let name = match self {
            TaskType::String => "String",
            TaskType::Barcode => "BarCode",
            TaskType::Image => "Image",
            TaskType::Registration => "Registration",
            TaskType::CloseCheck => "CloseCheck",
            TaskType::CancelCheck => "CancelCheck",
            TaskType::OpenCheckSell => "OpenCheckSell",
            TaskType::Payment => "Payment",
            TaskType::OpenCheckReturn => "OpenCheckReturn",
            TaskType::Return => "Return",
            TaskType::CashIncome => "CashIncome",
            TaskType::CashOutcome => "CashOutcome",
            TaskType::ClientContact => "ClientContact",
            TaskType::Report
            | TaskType::SyncTime
            | TaskType::PrintHeader
            | TaskType::PrintSlip
            | TaskType::PrintFooter
            | TaskType::Cut => return None,
        };
        Some(name)
    }
}

/// Unrecognized task type token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTaskType(pub String);

impl fmt::Display for UnknownTaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown task type '{}'", self.0)
    }
}

impl std::error::Error for UnknownTaskType {}

impl FromStr for TaskType {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_token() == lower)
            .ok_or_else(|| UnknownTaskType(s.to_string()))
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl Serialize for TaskType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_token())
    }
}

impl<'de> Deserialize<'de> for TaskType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lowercase_tokens_unique() {
        let tokens: HashSet<_> = TaskType::ALL.iter().map(|t| t.as_token()).collect();
        assert_eq!(tokens.len(), TaskType::ALL.len());
    }

    #[test]
    fn test_pascal_names_unique() {
        let names: Vec<_> = TaskType::ALL.iter().filter_map(|t| t.pascal_name()).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), 13);
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_pascal_set_lacks_printing_utilities() {
        for t in [
            TaskType::Cut,
            TaskType::SyncTime,
            TaskType::PrintHeader,
            TaskType::PrintFooter,
        ] {
            assert!(t.pascal_name().is_none(), "{} has a PascalCase name", t);
        }
    }

    #[test]
    fn test_parse_both_sets() {
        assert_eq!("closecheck".parse::<TaskType>().unwrap(), TaskType::CloseCheck);
        assert_eq!("CloseCheck".parse::<TaskType>().unwrap(), TaskType::CloseCheck);
        assert_eq!("BarCode".parse::<TaskType>().unwrap(), TaskType::Barcode);
        assert_eq!("CUT".parse::<TaskType>().unwrap(), TaskType::Cut);
    }

    #[test]
    fn test_every_pascal_name_parses_back() {
        for t in TaskType::ALL {
            if let Some(name) = t.pascal_name() {
                assert_eq!(name.parse::<TaskType>().unwrap(), t);
            }
        }
    }

    #[test]
    fn test_unknown_token() {
        let err = "teleport".parse::<TaskType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown task type 'teleport'");
        assert!(serde_json::from_str::<TaskType>("\"teleport\"").is_err());
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskType::OpenCheckSell).unwrap(),
            "\"openchecksell\""
        );
        assert_eq!(TaskType::default(), TaskType::String);
    }
}
