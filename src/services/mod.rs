//! Services around the drivers

pub mod config;

pub use config::{Config, ConfigService, Profile};
