use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::catalog::PgCatalog;
use crate::config::AppConfig;
use crate::nutrition::{CatalogLookup, GoalTargets};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn CatalogLookup>,
    pub default_goals: GoalTargets,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let catalog = Arc::new(PgCatalog::new(db.clone())) as Arc<dyn CatalogLookup>;

        Ok(Self {
            db,
            config,
            catalog,
            default_goals: GoalTargets::default(),
        })
    }
}
