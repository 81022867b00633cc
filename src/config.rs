// src/config.rs

use std::{env, sync::Arc};

use crate::{
    common::notify::TracingNotifier,
    db::{FileCache, FixtureRepository},
    services::{auth::StaticAuthProvider, dashboard_service::DashboardStore},
};

// Configuração lida do ambiente (.env é opcional)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fixture_path: String,
    pub cache_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let fixture_path = env::var("DASHBOARD_FIXTURE")
            .map_err(|_| anyhow::anyhow!("DASHBOARD_FIXTURE deve ser definida"))?;
        let cache_path =
            env::var("DASHBOARD_CACHE_FILE").unwrap_or_else(|_| ".dashboard-cache.json".to_string());

        Ok(Self { fixture_path, cache_path })
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub notifier: Arc<TracingNotifier>,
    pub auth: Arc<StaticAuthProvider>,
    pub store: DashboardStore,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let repo = Arc::new(FixtureRepository::load(&config.fixture_path).await?);
        tracing::info!("✅ Fixture carregada de {}", config.fixture_path);

        let cache = Arc::new(FileCache::open(&config.cache_path)?);

        // --- Monta o gráfico de dependências ---
        let notifier = Arc::new(TracingNotifier::new());
        let auth = Arc::new(StaticAuthProvider::new(Some(repo.principal().clone())));
        let store = DashboardStore::new(
            auth.clone(),
            repo.clone(),
            repo,
            cache,
            notifier.clone(),
        );

        Ok(Self { config, notifier, auth, store })
    }
}
