//! Configuration file and profile management
//!
// Allow nested config module - this is intentional for the config subsystem
#![allow(clippy::module_inception)]
//!
//! An optional TOML file holds named profiles with connection defaults
//! (server URL, region, cluster, TLS files, wait settings) so they don't have to
//! be repeated on every invocation. The file is only ever read.

pub mod config;
pub mod error;

pub use config::{Config, Profile};
pub use error::{ConfigError, Result};
