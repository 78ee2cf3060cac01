pub mod config;
pub mod manager;


pub use config::{resolve, ConfigOverrides, EndpointConfig, TtsSettings};
pub use manager::SettingsManager;
