//! Configuration file parsing and validation

pub mod style_toml;

pub use style_toml::{Config, DEFAULT_SCRIPT_TIMEOUT_MS};
