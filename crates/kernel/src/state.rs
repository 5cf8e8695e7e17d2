//! Application state shared across all handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::facets::{ExecutionLimits, FacetConfig, FacetService};
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Facet search execution over the configured table.
    facets: FacetService,

    /// Page template renderer.
    theme: ThemeEngine,

    /// Directory searched for static assets.
    assets_dir: PathBuf,
}

impl AppState {
    /// Load the facet configuration, connect to PostgreSQL and set up
    /// templates.
    pub async fn new(config: &Config) -> Result<Self> {
        let facet_config = FacetConfig::load(&config.facets_config).with_context(|| {
            format!(
                "failed to load facet configuration from {}",
                config.facets_config.display()
            )
        })?;
        info!(
            table = %facet_config.database_table,
            facets = facet_config.facets.len(),
            "facet configuration loaded"
        );

        let db = db::create_pool(config).await?;
        info!("database pool created");

        let theme = ThemeEngine::new(config.templates_dir.as_deref())?;

        Ok(Self::from_parts(
            db,
            facet_config,
            theme,
            config.assets_dir.clone(),
            config.execution_limits(),
        ))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        db: PgPool,
        facet_config: FacetConfig,
        theme: ThemeEngine,
        assets_dir: PathBuf,
        limits: ExecutionLimits,
    ) -> Self {
        let facets = FacetService::new(db.clone(), Arc::new(facet_config), limits);
        Self {
            inner: Arc::new(AppStateInner {
                db,
                facets,
                theme,
                assets_dir,
            }),
        }
    }

    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub fn facets(&self) -> &FacetService {
        &self.inner.facets
    }

    pub fn facet_config(&self) -> &FacetConfig {
        self.inner.facets.config()
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }

    pub fn assets_dir(&self) -> &Path {
        &self.inner.assets_dir
    }

    /// Check if PostgreSQL is reachable.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
