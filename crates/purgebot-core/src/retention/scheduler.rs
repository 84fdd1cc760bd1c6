//! Timer-driven retention scheduler.
//!
//! Provides:
//! - One tick per interval: list the registry, compute a cutoff per channel,
//!   resolve the channel and purge everything older than the cutoff
//! - Non-overlapping ticks (a tick that finds another in flight does nothing)
//! - Per-channel fault isolation (one failing channel never stops the rest)
//! - Dry-run mode that only computes and logs cutoffs
//! - Cooperative shutdown through a [`CancellationToken`]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use purgebot_types::channel::ChannelPolicy;
use purgebot_types::config::RetentionConfig;
use purgebot_types::error::PlatformError;
use purgebot_types::platform::{PurgeRequest, PurgeSummary};

use super::report::{ChannelOutcome, PurgeOutcome, TickReport};
use crate::platform::MessagingPlatform;
use crate::repository::channel::ChannelRepository;

/// Runtime knobs for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub interval: Duration,
    pub dry_run: bool,
    pub purge_concurrency: usize,
    pub purge_reason: String,
}

impl SchedulerSettings {
    pub fn from_config(config: &RetentionConfig) -> Self {
        Self {
            interval: config.tick_interval(),
            dry_run: config.dry_run,
            purge_concurrency: config.purge_concurrency(),
            purge_reason: config.purge_reason.clone(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&RetentionConfig::default())
    }
}

/// Periodically enforces every registered channel's retention policy.
///
/// Holds no state between ticks besides the tick guard: the registry is
/// re-read every tick, so registrations take effect on the next tick at
/// the latest.
pub struct RetentionScheduler<R: ChannelRepository, P: MessagingPlatform> {
    repo: R,
    platform: P,
    settings: SchedulerSettings,
    tick_guard: Mutex<()>,
}

impl<R: ChannelRepository, P: MessagingPlatform> RetentionScheduler<R, P> {
    pub fn new(repo: R, platform: P, settings: SchedulerSettings) -> Self {
        Self {
            repo,
            platform,
            settings,
            tick_guard: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Run one tick against the current time.
    pub async fn run_tick(&self) -> TickReport {
        self.run_tick_at(Utc::now()).await
    }

    /// Run one tick as if the clock read `now`.
    ///
    /// Returns [`TickReport::Busy`] without doing anything if another tick
    /// is still in progress.
    pub async fn run_tick_at(&self, now: DateTime<Utc>) -> TickReport {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            return TickReport::Busy;
        };

        let policies = match self.repo.list_all().await {
            Ok(policies) => policies,
            Err(e) => {
                return TickReport::RegistryUnavailable {
                    at: now,
                    error: e.to_string(),
                };
            }
        };

        let outcomes = if self.settings.purge_concurrency <= 1 {
            let mut outcomes = Vec::with_capacity(policies.len());
            for policy in policies {
                outcomes.push(self.enforce(policy, now).await);
            }
            outcomes
        } else {
            stream::iter(policies)
                .map(|policy| self.enforce(policy, now))
                .buffer_unordered(self.settings.purge_concurrency)
                .collect::<Vec<_>>()
                .await
        };

        TickReport::Completed { at: now, outcomes }
    }

    /// Apply one channel's policy. Never fails: errors become
    /// [`PurgeOutcome::Failed`].
    async fn enforce(&self, policy: ChannelPolicy, now: DateTime<Utc>) -> ChannelOutcome {
        let channel_id = policy.channel_id;
        let cutoff = policy.cutoff(now);

        if self.settings.dry_run {
            tracing::info!(%channel_id, %cutoff, "dry run: would purge messages before cutoff");
            return ChannelOutcome {
                channel_id,
                cutoff,
                outcome: PurgeOutcome::DryRun,
            };
        }

        tracing::info!(%channel_id, %cutoff, "purging messages before cutoff");
        let request = PurgeRequest::retention(cutoff, self.settings.purge_reason.clone());

        let outcome = match self.purge_channel(&policy, &request).await {
            Ok(summary) => {
                tracing::debug!(%channel_id, deleted = summary.deleted, "channel purged");
                PurgeOutcome::Purged {
                    deleted: summary.deleted,
                }
            }
            Err(e) => {
                tracing::warn!(
                    %channel_id,
                    error = %e,
                    "purge failed, will try again on the next cycle"
                );
                PurgeOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        ChannelOutcome {
            channel_id,
            cutoff,
            outcome,
        }
    }

    async fn purge_channel(
        &self,
        policy: &ChannelPolicy,
        request: &PurgeRequest,
    ) -> Result<PurgeSummary, PlatformError> {
        let handle = self.platform.resolve_channel(policy.channel_id).await?;
        self.platform.purge(&handle, request).await
    }

    /// Tick every interval until `cancel` fires.
    ///
    /// The first tick runs immediately. Ticks are awaited inline and late
    /// timer fires are skipped, so ticks never overlap. Cancelling during a
    /// tick abandons it; already-issued deletions stay done.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.settings.interval.as_secs(),
            dry_run = self.settings.dry_run,
            "retention scheduler started"
        );

        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("abandoning in-flight retention tick");
                    break;
                }
                report = self.run_tick() => report.log(),
            }
        }

        tracing::info!("retention scheduler stopped");
    }
}

impl<R, P> RetentionScheduler<R, P>
where
    R: ChannelRepository + 'static,
    P: MessagingPlatform + 'static,
{
    /// Start the scheduler on the tokio runtime.
    ///
    /// Call once the platform connection is ready.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
