use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_MATCH_CONFIG_PATH: &str = "config/match.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid pattern syntax in `{pattern}`: {source}")]
    InvalidPatternSyntax {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    // Bridge
    pub bind_addr: String,
    pub bridge_api_key: Option<String>,

    // Matching
    pub match_config_path: String,
    pub match_include: Vec<String>,

    // Geolocation
    pub geolocation_api_url: String,

    // Affordance
    pub translate_command: String,
}

/// The `match` section of the match config document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchConfig {
    #[serde(default)]
    pub include: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MatchDocument {
    #[serde(rename = "match", default)]
    matching: MatchConfig,
}

impl MatchConfig {
    /// Load `{"match": {"include": [...]}}` from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(json: &str) -> serde_json::Result<Self> {
        let document: MatchDocument = serde_json::from_str(json)?;
        Ok(document.matching)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let explicit_match_path = std::env::var("MATCH_CONFIG_PATH").ok();
        let match_config_path = explicit_match_path
            .clone()
            .unwrap_or_else(|| DEFAULT_MATCH_CONFIG_PATH.to_string());

        // Only an explicitly configured file has to exist
        let match_include = if explicit_match_path.is_none()
            && !Path::new(&match_config_path).exists()
        {
            Vec::new()
        } else {
            MatchConfig::load(&match_config_path)
                .context("Failed to load match configuration")?
                .include
        };

        Ok(Self {
            // Bridge
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            bridge_api_key: std::env::var("BRIDGE_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),

            // Matching
            match_config_path,
            match_include,

            // Geolocation
            geolocation_api_url: std::env::var("GEOLOCATION_API_URL")
                .unwrap_or_else(|_| "http://ip-api.com".to_string()),

            // Affordance
            translate_command: std::env::var("TRANSLATE_COMMAND")
                .unwrap_or_else(|_| "/translate".to_string()),
        })
    }
}
