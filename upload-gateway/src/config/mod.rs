use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub blob: BlobConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    pub backend: BlobBackend,
    /// Base URL of the blob API; objects are PUT to `<api_url>/<pathname>`.
    pub api_url: String,
    /// Write credential. Checked per request, not at startup.
    pub read_write_token: Option<Secret<String>>,
    pub local_path: String,
    /// Prefix of URLs handed out by the local backend. Defaults to
    /// `http://127.0.0.1:<bound port>/blobs`.
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    Http,
    Local,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(GatewayConfig {
            common: common_config,
            blob: BlobConfig {
                backend: get_env("BLOB_BACKEND", Some("http"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                api_url: get_env("BLOB_API_URL", Some("http://localhost:9100"), is_prod)?,
                read_write_token: env::var("BLOB_READ_WRITE_TOKEN")
                    .ok()
                    .filter(|t| !t.is_empty())
                    .map(Secret::new),
                local_path: get_env("BLOB_LOCAL_PATH", Some("storage/blobs"), false)?,
                public_base_url: env::var("BLOB_PUBLIC_BASE_URL").ok(),
            },
        })
    }
}

impl std::str::FromStr for BlobBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(BlobBackend::Http),
            "local" => Ok(BlobBackend::Local),
            _ => Err(format!("Invalid blob backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
