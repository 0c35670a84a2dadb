//! Handles settings for the application.
//!
//! Values are read once at start from an optional `settings.toml` and then
//! from environment variables (`APP_NAME`, `ALLOWED_HOSTS`, `TIME_ZONE`, ...),
//! which take precedence.

use std::path::PathBuf;

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use engine::PhoneRegion;
use serde::Deserialize;
use server::SiteSettings;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_name: String,
    pub secret_key: Option<String>,
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub language_code: String,
    pub time_zone: String,
    pub phone_numbers_region: String,
    pub database_url: String,
    pub bind: String,
    pub port: u16,
    pub media_root: PathBuf,
    pub log_level: String,
    pub default_status: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Staffbook".to_string(),
            secret_key: None,
            debug: false,
            allowed_hosts: vec!["localhost".to_string()],
            language_code: "en-us".to_string(),
            time_zone: "UTC".to_string(),
            phone_numbers_region: "US".to_string(),
            database_url: "sqlite:./staffbook.db?mode=rwc".to_string(),
            bind: "127.0.0.1".to_string(),
            port: 8000,
            media_root: PathBuf::from("media"),
            log_level: "info".to_string(),
            default_status: None,
        }
    }
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("allowed_hosts"),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let has_secret = self
            .secret_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !has_secret && !self.debug {
            return Err(SettingsError::Invalid {
                key: "SECRET_KEY",
                reason: "required unless DEBUG is set".to_string(),
            });
        }
        self.tz()?;
        self.phone_region()?;
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz, SettingsError> {
        self.time_zone
            .trim()
            .parse::<Tz>()
            .map_err(|err| SettingsError::Invalid {
                key: "TIME_ZONE",
                reason: err.to_string(),
            })
    }

    pub fn phone_region(&self) -> Result<PhoneRegion, SettingsError> {
        self.phone_numbers_region
            .parse()
            .map_err(|err: engine::EngineError| SettingsError::Invalid {
                key: "PHONE_NUMBERS_REGION",
                reason: err.to_string(),
            })
    }

    pub fn site(&self) -> Result<SiteSettings, SettingsError> {
        Ok(SiteSettings {
            app_name: self.app_name.clone(),
            language_code: self.language_code.clone(),
            time_zone: self.tz()?,
            allowed_hosts: self
                .allowed_hosts
                .iter()
                .map(|host| host.trim().to_string())
                .filter(|host| !host.is_empty())
                .collect(),
            debug: self.debug,
        })
    }
}
