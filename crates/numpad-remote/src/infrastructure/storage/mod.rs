//! Persistence for user preferences.
//!
//! Only preferences (host, transport, socket settings) are stored; the
//! connection state itself never outlives the process.

pub mod config;

pub use config::{
    config_file_path, load_config, load_config_from, save_config, save_config_to, AppConfig,
    ConfigError,
};
