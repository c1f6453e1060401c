//! CLI library for testing purposes

pub mod config;
pub mod unused;
pub mod validation;

pub use config::Config;
pub use droidl10n::ResDir;
