//! Receipt printer and cash register integration
//!
//! Print jobs are lists of [`model::Task`] handed to an [`drivers::EcrDriver`].

pub mod drivers;
pub mod model;
pub mod services;
pub mod types;
pub mod ui;
