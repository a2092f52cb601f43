use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use tempfile::TempDir;
use upload_gateway::config::{BlobBackend, BlobConfig, GatewayConfig};
use upload_gateway::startup::Application;

pub const TEST_TOKEN: &str = "test-rw-token";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub storage_dir: TempDir,
}

impl TestApp {
    /// Gateway backed by a temp directory, serving blobs under `/blobs`.
    pub async fn spawn_local() -> Self {
        let storage_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blob = BlobConfig {
            backend: BlobBackend::Local,
            api_url: "http://unused.invalid".to_string(),
            read_write_token: None,
            local_path: storage_dir.path().to_string_lossy().to_string(),
            public_base_url: None,
        };
        Self::spawn(blob, storage_dir).await
    }

    /// Gateway forwarding to a remote blob API at `api_url`.
    pub async fn spawn_http(api_url: &str, token: Option<&str>) -> Self {
        let storage_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blob = BlobConfig {
            backend: BlobBackend::Http,
            api_url: api_url.to_string(),
            read_write_token: token.map(|t| Secret::new(t.to_string())),
            local_path: storage_dir.path().to_string_lossy().to_string(),
            public_base_url: None,
        };
        Self::spawn(blob, storage_dir).await
    }

    async fn spawn(blob: BlobConfig, storage_dir: TempDir) -> Self {
        let config = GatewayConfig {
            common: CoreConfig {
                port: 0, // Random port for testing
                ..CoreConfig::default()
            },
            blob,
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            storage_dir,
        }
    }

    pub fn upload_url(&self) -> String {
        format!("{}/api/upload", self.address)
    }
}
