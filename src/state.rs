use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::store::{MemoryStore, PgStore, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<AppConfig>,
    /// Held for the whole of each action so handlers never interleave.
    pub gate: Arc<Mutex<()>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()?).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = match &config.database_url {
            Some(url) => {
                let pg = PgStore::connect(url, config.db_max_connections).await?;
                if let Err(e) = sqlx::migrate!("./migrations").run(pg.pool()).await {
                    warn!(error = %e, "migration failed; sheets will be created on first use");
                }
                info!("using postgres record store");
                Arc::new(pg) as Arc<dyn RecordStore>
            }
            None => {
                warn!("DATABASE_URL not set; records are kept in memory only");
                Arc::new(MemoryStore::new()) as Arc<dyn RecordStore>
            }
        };
        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn RecordStore>, config: Arc<AppConfig>) -> Self {
        Self {
            store,
            config,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Fresh empty in-memory state with default config.
    pub fn in_memory() -> Self {
        Self::from_parts(Arc::new(MemoryStore::new()), Arc::new(AppConfig::default()))
    }
}
