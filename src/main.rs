use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use quillforge::api::{router, AppState};
use quillforge::services::{AppConfig, ConfigStore, InferenceClient, ModelRegistry, StageRunner};

const DEFAULT_PORT: u16 = 5000;

fn load_config() -> AppConfig {
    let Some(dir) = ConfigStore::default_config_dir() else {
        return AppConfig::default();
    };
    match ConfigStore::new(dir).load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Falling back to default config: {}", e);
            AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quillforge::init_logging();

    let port = std::env::var("QUILLFORGE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let config = load_config();
    let registry = Arc::new(ModelRegistry::with_client(InferenceClient::new()));
    if let Some(model) = &config.default_paraphrase_model {
        if let Err(e) = registry.select_model(model) {
            warn!("Ignoring configured default paraphrase model: {}", e);
        }
    }
    let runner = Arc::new(StageRunner::new(registry));
    let app = router(AppState::new(runner, config.detection));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
