//! Application state wiring the registry, services and platform together.
//!
//! Services in purgebot-core are generic over repository/platform traits;
//! AppState pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use purgebot_core::retention::scheduler::{RetentionScheduler, SchedulerSettings};
use purgebot_core::service::retention::RetentionService;
use purgebot_infra::config::{TOKEN_ENV, bot_token_from_env, load_config};
use purgebot_infra::discord::DiscordClient;
use purgebot_infra::filesystem::resolve_data_dir;
use purgebot_infra::sqlite::channel::SqliteChannelRepository;
use purgebot_infra::sqlite::pool::DatabasePool;
use purgebot_types::config::RetentionConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteRetentionService = RetentionService<SqliteChannelRepository>;

pub type ConcreteScheduler = RetentionScheduler<SqliteChannelRepository, DiscordClient>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub retention_service: Arc<ConcreteRetentionService>,
    pub config: RetentionConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    ///
    /// `force_dry_run` comes from a `--dry-run` flag and wins over the
    /// config file and environment. In dry-run mode nothing is created on disk.
    pub async fn init(force_dry_run: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        let mut config = load_config(&data_dir).await;
        config.dry_run |= force_dry_run;

        if !config.dry_run {
            tokio::fs::create_dir_all(&data_dir)
                .await
                .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
        }

        let db_pool = DatabasePool::open_registry(&data_dir, config.dry_run)
            .await
            .context("failed to open the channel registry")?;

        let retention_service = RetentionService::new(
            SqliteChannelRepository::new(db_pool.clone()),
            config.dry_run,
        );

        tracing::debug!(data_dir = %data_dir.display(), dry_run = config.dry_run, "application state ready");

        Ok(Self {
            retention_service: Arc::new(retention_service),
            config,
            data_dir,
            db_pool,
        })
    }

    /// Connect to Discord and build a scheduler over the shared registry.
    ///
    /// Fails if the bot token is missing or rejected.
    pub async fn retention_scheduler(
        &self,
        settings: SchedulerSettings,
    ) -> anyhow::Result<ConcreteScheduler> {
        let token = bot_token_from_env()
            .with_context(|| format!("{TOKEN_ENV} must be set to a Discord bot token"))?;
        let client = DiscordClient::new(token, &self.config.discord)?;

        let user = client
            .verify()
            .await
            .context("failed to connect to Discord")?;
        tracing::info!(bot = %user.username, "connected to Discord");

        Ok(RetentionScheduler::new(
            SqliteChannelRepository::new(self.db_pool.clone()),
            client,
            settings,
        ))
    }
}
