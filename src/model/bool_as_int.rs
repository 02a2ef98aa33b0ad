//! Booleans as `0`/`1` on the wire
//!
//! Use with `#[serde(with = "bool_as_int")]` or, for optional fields,
//! `#[serde(with = "bool_as_int::option")]`. Decoding accepts either an
//! integer (only `1` is true) or a JSON boolean.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

pub const FALSE: i32 = 0;
pub const TRUE: i32 = 1;

pub fn to_int(value: bool) -> i32 {
    if value {
        TRUE
    } else {
        FALSE
    }
}

pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i32(to_int(*value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    deserializer.deserialize_any(BoolOrIntVisitor)
}

struct BoolOrIntVisitor;

impl<'de> Visitor<'de> for BoolOrIntVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or a boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        Ok(v == TRUE as i64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        Ok(v == TRUE as u64)
    }
}

pub mod option {
    use super::BoolOrIntVisitor;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&super::to_int(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        deserializer.deserialize_option(OptionVisitor)
    }

    struct OptionVisitor;

    impl<'de> Visitor<'de> for OptionVisitor {
        type Value = Option<bool>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("null, an integer or a boolean")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(BoolOrIntVisitor).map(Some)
        }
    }
}
