//! Configuration management for lanscout.
//!
//! Provides XDG-compliant settings storage. Command-line flags override
//! whatever the settings file provides.

mod settings;

pub use settings::{AppSettings, Paths};
