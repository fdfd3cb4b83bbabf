//! Configuration system
//!
//! Loads ~/.config/repodeps/config.yaml. The file only carries web server
//! settings; the conversion itself takes no configuration.

mod repodeps_config;

pub use repodeps_config::{RepoDepsConfig, ServerConfig};
