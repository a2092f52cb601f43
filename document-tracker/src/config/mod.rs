use crate::services::UploadMode;
use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub gateway: GatewaySettings,
    pub metadata: MetadataSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Traces are exported only when this is set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone)]
pub struct GatewaySettings {
    /// Base URL of the upload gateway (without `/api/upload`).
    pub url: String,
    #[serde(default)]
    pub upload_mode: UploadMode,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    /// Hosted JSON document store.
    Remote,
    /// A JSON file on local disk.
    Local,
}

#[derive(Deserialize, Clone)]
pub struct MetadataSettings {
    pub backend: MetadataBackend,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    #[serde(default)]
    pub jsonbin: Option<JsonBinSettings>,
}

fn default_local_path() -> String {
    "storage/documents.json".to_string()
}

#[derive(Deserialize, Clone)]
pub struct JsonBinSettings {
    #[serde(default = "default_jsonbin_url")]
    pub base_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Sent as `X-Master-Key`; required for the remote backend.
    #[serde(default)]
    pub master_key: Option<Secret<String>>,
}

fn default_jsonbin_url() -> String {
    "https://api.jsonbin.io/v3/b".to_string()
}

fn default_collection() -> String {
    "documents".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;

    // Run either from the crate directory or from the workspace root.
    let configuration_directory = if base_path.ends_with("document-tracker") {
        base_path.join("config")
    } else {
        base_path.join("document-tracker").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
