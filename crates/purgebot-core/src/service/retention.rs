//! Channel registration service.
//!
//! Backs the register / unregister / info commands. Parses the raw command
//! text, writes to the registry, and turns every outcome into something the
//! command layer can reply with. In dry-run mode mutations stop here and
//! never reach the repository.

use purgebot_types::channel::{ChannelId, ChannelPolicy};
use purgebot_types::error::CommandError;
use purgebot_types::max_age::{MaxAge, parse_max_age};

use crate::repository::channel::ChannelRepository;

/// Result of a register command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The policy was written to the registry.
    Saved { channel_id: ChannelId, max_age: MaxAge },
    /// Dry-run mode: nothing was written.
    DryRun { channel_id: ChannelId, max_age: MaxAge },
}

impl Registration {
    pub fn max_age(&self) -> MaxAge {
        match self {
            Registration::Saved { max_age, .. } | Registration::DryRun { max_age, .. } => *max_age,
        }
    }

    pub fn reply(&self) -> String {
        match self {
            Registration::Saved { max_age, .. } => format!(
                "auto purging set up with a max message age of {max_age} \
                 (the first purge runs on the next cycle)"
            ),
            Registration::DryRun { max_age, .. } => format!(
                "SAFEMODE: would have added this channel for auto purging with a max message age of {max_age}"
            ),
        }
    }
}

/// Result of an unregister command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unregistration {
    Removed(ChannelId),
    DryRun(ChannelId),
}

impl Unregistration {
    pub fn reply(&self) -> &'static str {
        match self {
            Unregistration::Removed(_) => "this channel won't be included in auto purges anymore",
            Unregistration::DryRun(_) => "SAFEMODE: would have removed this channel from auto purges",
        }
    }
}

/// Reply text for the info command.
pub fn policy_reply(policy: Option<&ChannelPolicy>) -> String {
    match policy {
        Some(policy) => format!(
            "this channel auto deletes messages that are more than {} old",
            policy.max_age
        ),
        None => "this channel does not have auto deletion set up".to_string(),
    }
}

/// Service behind the channel commands.
///
/// Generic over the repository trait to maintain clean architecture --
/// purgebot-core never depends on purgebot-infra.
pub struct RetentionService<R: ChannelRepository> {
    repo: R,
    dry_run: bool,
}

impl<R: ChannelRepository> RetentionService<R> {
    pub fn new(repo: R, dry_run: bool) -> Self {
        Self { repo, dry_run }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Register a channel, or update its max age if it is already registered.
    ///
    /// `raw_command` is the full command text, e.g. `"register 5d"`. A
    /// malformed duration is rejected before the registry is touched.
    pub async fn register_or_update(
        &self,
        channel_id: ChannelId,
        raw_command: &str,
    ) -> Result<Registration, CommandError> {
        let max_age = parse_max_age(raw_command)?;

        if self.dry_run {
            tracing::info!(%channel_id, %max_age, "dry run: would register channel");
            return Ok(Registration::DryRun { channel_id, max_age });
        }

        self.repo.upsert(channel_id, max_age).await.map_err(|e| {
            tracing::warn!(%channel_id, error = %e, "failed to register channel");
            CommandError::Storage(e)
        })?;

        tracing::info!(
            %channel_id,
            max_age_minutes = max_age.minutes(),
            "channel registered for auto purging"
        );
        Ok(Registration::Saved { channel_id, max_age })
    }

    /// Stop purging a channel. Unregistering an unknown channel succeeds.
    pub async fn unregister(&self, channel_id: ChannelId) -> Result<Unregistration, CommandError> {
        if self.dry_run {
            tracing::info!(%channel_id, "dry run: would unregister channel");
            return Ok(Unregistration::DryRun(channel_id));
        }

        self.repo.remove(channel_id).await.map_err(|e| {
            tracing::warn!(%channel_id, error = %e, "failed to unregister channel");
            CommandError::Storage(e)
        })?;

        tracing::info!(%channel_id, "channel removed from auto purging");
        Ok(Unregistration::Removed(channel_id))
    }

    /// Current policy for a channel, if any.
    pub async fn query_policy(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<ChannelPolicy>, CommandError> {
        self.repo.get(channel_id).await.map_err(|e| {
            tracing::warn!(%channel_id, error = %e, "failed to look up channel policy");
            CommandError::Storage(e)
        })
    }

    /// Every registered policy, sorted by channel id.
    pub async fn list_policies(&self) -> Result<Vec<ChannelPolicy>, CommandError> {
        let mut policies = self.repo.list_all().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to list channel policies");
            CommandError::Storage(e)
        })?;
        policies.sort_by_key(|p| p.channel_id);
        Ok(policies)
    }
}
