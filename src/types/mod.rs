//! Shared error types for equipment

mod error;

pub use error::*;
