use crate::application_port::SigningAlgorithm;
use anyhow::{Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub refresh: Refresh,
    pub store: Store,
    pub token: Token,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Refresh {
    pub restrict_minutes: u32,
    /// Base URL of the refresh service, `http://` or `https://`.
    pub url: String,
    /// Whether this process also serves the refresh procedure.
    pub host: bool,
    pub listen_address: String,
    #[serde(default = "default_refresh_client")]
    pub client: String, // "http" or "local"
    #[serde(default = "default_refresh_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "redis" or "memory"
    pub session_url: String,
    pub restriction_url: String,
    #[serde(default = "default_session_prefix")]
    pub session_prefix: String,
    #[serde(default = "default_restriction_prefix")]
    pub restriction_prefix: String,
}

#[derive(Deserialize)]
pub struct Token {
    pub algorithm: SigningAlgorithm,
    pub secret: Option<String>,
    pub private_key_path: Option<String>,
    pub public_key_path: Option<String>,
    pub access_ttl_minutes: u32,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("algorithm", &self.algorithm)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

fn default_refresh_client() -> String {
    "http".to_string()
}

fn default_refresh_timeout_ms() -> u64 {
    2000
}

fn default_session_prefix() -> String {
    "login".to_string()
}

fn default_restriction_prefix() -> String {
    "refresh_restrict".to_string()
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "TESSERA";

/// Loads the TOML settings file, then lets `TESSERA__SECTION__KEY`
/// environment variables override it.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

impl Settings {
    pub fn from_toml(source: &str) -> Result<Settings> {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .map_err(|e| anyhow!(e))?
            .try_deserialize()
            .map_err(|e| anyhow!(e))
    }
}
