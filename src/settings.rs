use std::fmt;
use std::path::{Path, PathBuf};

use config::Config;

use crate::adapter::AdapterConfig;
use crate::constants::{DEFAULT_CONFIG_CONTENT, DEFAULT_REGION, DEFAULT_STAGING_DIR};

#[derive(Debug, serde::Deserialize)]
pub struct Settings {
    pub verbosity: Option<String>,
    pub aws_settings: AwsSettings,
    #[serde(default)]
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub staging: StagingSettings,
}

#[derive(serde::Deserialize)]
pub struct AwsSettings {
    pub profile: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
pub struct StagingSettings {
    pub dir: PathBuf,
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STAGING_DIR),
        }
    }
}

impl AwsSettings {
    /// The static key pair, when both halves are present.
    pub fn static_credentials(&self) -> Option<(String, String)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.clone(), secret.clone()))
            }
            _ => None,
        }
    }
}

// never print the secret key, settings are logged at debug level
impl fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSettings")
            .field("profile", &self.profile)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "<set>"))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let config_path = dirs::config_dir() // Gets the config directory cross-platform
            .map(|mut path| {
                path.push("ai-studio");
                path.push("config.toml");
                path
            })
            .unwrap_or_else(|| PathBuf::from("config.toml")); // Fallback to local config

        // Create the directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).ok(); // Ignore error if dir already exists
        }
        // Check if config file exists, if not create it with defaults
        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG_CONTENT).ok(); // Using ok() to ignore write errors
        }

        Self::load(&config_path)
    }

    /// Layers the file at `config_path` (optional), `AI_STUDIO__*` variables and the
    /// standard AWS credential variables over the built-in defaults.
    pub fn load(config_path: &Path) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::from(config_path.to_path_buf()).required(false))
            .add_source(
                config::Environment::with_prefix("AI_STUDIO")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("verbosity", "info")?
            .set_default("aws_settings.region", DEFAULT_REGION)?
            .set_default("staging.dir", DEFAULT_STAGING_DIR)?
            .set_override_option(
                "aws_settings.access_key_id",
                std::env::var("AWS_ACCESS_KEY_ID").ok(),
            )?
            .set_override_option(
                "aws_settings.secret_access_key",
                std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
            )?
            .set_override_option(
                "aws_settings.region",
                std::env::var("AWS_DEFAULT_REGION").ok(),
            )?
            .build()?;

        settings.try_deserialize()
    }
}
