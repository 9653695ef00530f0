//! Contract layer - public API for settings consumers
//!
//! This layer contains the value model, the error type and the client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::SettingsApi;
pub use error::SettingsError;
pub use model::{RawSetting, SettingValue, SettingsMap};
