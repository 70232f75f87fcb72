use prep_engine::pinecone_service::DEFAULT_DIMENSION;
use prep_engine::{EngineSettings, PineconeSettings};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_INDEX: &str = "afternoonprep-pinecone";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Process configuration, read once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub engine: EngineSettings,
    pub pinecone: PineconeSettings,
    pub outbound_timeout: Duration,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_source(|key| env::var(key).ok())?;
        log::debug!(
            "Loaded configuration: port={}, index={}, timeout={:?}, upload_dir={}",
            config.port,
            config.pinecone.index_name,
            config.outbound_timeout,
            config.upload_dir.display()
        );
        Ok(config)
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required =
            |key: &str| optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()));

        Ok(Self {
            port: parse_or(optional("PORT"), "PORT", DEFAULT_PORT)?,
            engine: EngineSettings {
                url: required("PRIVATE_AI_ENGINE_URL")?,
                bearer_token: required("BEARER_AUTH")?,
                llm_api_key: optional("OPENAI_API_KEY"),
            },
            pinecone: PineconeSettings {
                api_key: required("PINECONE_API_KEY")?,
                environment: required("PINECONE_ENVIRONMENT")?,
                index_name: optional("PINECONE_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string()),
                dimension: DEFAULT_DIMENSION,
                controller_url: optional("PINECONE_CONTROLLER_URL"),
                index_host: optional("PINECONE_INDEX_HOST"),
            },
            outbound_timeout: Duration::from_secs(parse_or(
                optional("OUTBOUND_TIMEOUT_SECS"),
                "OUTBOUND_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes: parse_or(
                optional("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Loads `config/.env` and `.env` into the environment when present.
pub fn load_dotenv() {
    dotenv::from_path("config/.env").ok();
    dotenv::dotenv().ok();
}
