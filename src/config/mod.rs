//! Configuration module for FileBatch
//!
//! Provides configuration management including CLI arguments,
//! the settings file, and copy tuning.

mod settings;

pub use settings::*;
