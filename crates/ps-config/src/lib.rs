//! # ps-config
//!
//! Layered settings: built-in defaults, then `photo-search.toml` if present,
//! then `PHOTO_SEARCH__SECTION__KEY` environment variables (a `.env` file is
//! read first).

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ConfigError),

    #[error("unsplash.access_key must not be empty")]
    MissingAccessKey,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection string, e.g. `sqlite:photo_search.db?mode=rwc`
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct UnsplashSettings {
    pub endpoint: String,
    pub access_key: SecretString,
    pub per_page: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub unsplash: UnsplashSettings,
}

impl Settings {
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:photo_search.db?mode=rwc")?
            .set_default("unsplash.endpoint", "https://api.unsplash.com/search/photos")?
            .set_default("unsplash.per_page", 50)
    }

    /// Loads settings for the running process.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }

        let settings: Settings = Self::defaults()?
            .add_source(File::with_name("photo-search").required(false))
            .add_source(
                Environment::with_prefix("PHOTO_SEARCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validated()
    }

    /// Builds settings from an inline TOML document on top of the defaults.
    pub fn from_toml(document: &str) -> Result<Self, SettingsError> {
        let settings: Settings = Self::defaults()?
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validated()
    }

    fn validated(self) -> Result<Self, SettingsError> {
        if self.unsplash.access_key.expose_secret().trim().is_empty() {
            return Err(SettingsError::MissingAccessKey);
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_the_key() {
        let settings = Settings::from_toml("[unsplash]\naccess_key = \"abc\"").unwrap();

        assert_eq!(settings.bind_address(), ("127.0.0.1".to_string(), 8080));
        assert_eq!(settings.database.url, "sqlite:photo_search.db?mode=rwc");
        assert_eq!(settings.unsplash.per_page, 50);
        assert_eq!(settings.unsplash.access_key.expose_secret(), "abc");
    }

    #[test]
    fn document_overrides_defaults() {
        let settings = Settings::from_toml(
            "[server]\nport = 9000\n[database]\nurl = \"sqlite::memory:\"\n[unsplash]\naccess_key = \"abc\"\nper_page = 10",
        )
        .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.database.url, "sqlite::memory:");
        assert_eq!(settings.unsplash.per_page, 10);
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert!(matches!(
            Settings::from_toml(""),
            Err(SettingsError::Load(_))
        ));
        assert!(matches!(
            Settings::from_toml("[unsplash]\naccess_key = \"  \""),
            Err(SettingsError::MissingAccessKey)
        ));
    }

    #[test]
    fn key_is_redacted_in_debug_output() {
        let settings = Settings::from_toml("[unsplash]\naccess_key = \"very-secret\"").unwrap();
        assert!(!format!("{settings:?}").contains("very-secret"));
    }
}
