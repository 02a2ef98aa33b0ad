use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fiscal report kinds, numbered as the register firmware numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ReportType {
    /// Closes the shift
    Z = 1,
    /// Shift totals without closing
    X = 2,
    Department = 7,
    Cashiers = 8,
    Hours = 10,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::Z,
        ReportType::X,
        ReportType::Department,
        ReportType::Cashiers,
        ReportType::Hours,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for ReportType {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        ReportType::ALL
            .into_iter()
            .find(|r| r.code() == value)
            .ok_or(value)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportType::Z => "Z",
            ReportType::X => "X",
            ReportType::Department => "Department",
            ReportType::Cashiers => "Cashiers",
            ReportType::Hours => "Hours",
        };
        f.write_str(name)
    }
}

impl Serialize for ReportType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for ReportType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = i32::deserialize(deserializer)?;
        ReportType::try_from(code)
            .map_err(|c| serde::de::Error::custom(format!("unknown report type {}", c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes() {
        assert_eq!(ReportType::Z.code(), 1);
        assert_eq!(ReportType::X.code(), 2);
        assert_eq!(ReportType::Department.code(), 7);
        assert_eq!(ReportType::Cashiers.code(), 8);
        assert_eq!(ReportType::Hours.code(), 10);
    }

    #[test]
    fn test_codes_unique() {
        let codes: HashSet<i32> = ReportType::ALL.iter().map(|r| r.code()).collect();
        assert_eq!(codes.len(), ReportType::ALL.len());
    }

    #[test]
    fn test_gap_codes_rejected() {
        assert_eq!(ReportType::try_from(3), Err(3));
        assert!(serde_json::from_str::<ReportType>("9").is_err());
    }

    #[test]
    fn test_serialized_as_integer() {
        assert_eq!(serde_json::to_string(&ReportType::Hours).unwrap(), "10");
        let parsed: ReportType = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, ReportType::Department);
    }
}
