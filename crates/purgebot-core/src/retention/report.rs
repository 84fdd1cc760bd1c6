//! Per-tick outcome reporting.

use chrono::{DateTime, Utc};
use serde::Serialize;

use purgebot_types::channel::ChannelId;

/// What happened to one channel during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PurgeOutcome {
    Purged { deleted: u64 },
    /// Dry-run mode: the cutoff was computed and logged only.
    DryRun,
    /// Resolution or deletion failed. The channel stays registered and is
    /// retried on the next tick.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelOutcome {
    pub channel_id: ChannelId,
    pub cutoff: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: PurgeOutcome,
}

/// Result of one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tick", rename_all = "snake_case")]
pub enum TickReport {
    /// Every registered channel was visited.
    Completed {
        at: DateTime<Utc>,
        outcomes: Vec<ChannelOutcome>,
    },
    /// The registry could not be listed; nothing was purged.
    RegistryUnavailable { at: DateTime<Utc>, error: String },
    /// Another tick was still running; this one did nothing.
    Busy,
}

impl TickReport {
    pub fn outcomes(&self) -> &[ChannelOutcome] {
        match self {
            TickReport::Completed { outcomes, .. } => outcomes,
            _ => &[],
        }
    }

    /// Total messages deleted across all channels.
    pub fn deleted(&self) -> u64 {
        self.outcomes()
            .iter()
            .map(|o| match o.outcome {
                PurgeOutcome::Purged { deleted } => deleted,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> usize {
        self.outcomes()
            .iter()
            .filter(|o| matches!(o.outcome, PurgeOutcome::Failed { .. }))
            .count()
    }

    /// Emit a one-line summary at an appropriate level.
    pub fn log(&self) {
        match self {
            TickReport::Completed { at, outcomes } => {
                let failures = self.failures();
                if failures > 0 {
                    tracing::warn!(
                        %at,
                        channels = outcomes.len(),
                        deleted = self.deleted(),
                        failures,
                        "retention tick finished with failures"
                    );
                } else {
                    tracing::debug!(
                        %at,
                        channels = outcomes.len(),
                        deleted = self.deleted(),
                        "retention tick finished"
                    );
                }
            }
            TickReport::RegistryUnavailable { at, error } => {
                tracing::warn!(%at, %error, "retention tick skipped: registry unavailable");
            }
            TickReport::Busy => {
                tracing::debug!("retention tick skipped: previous tick still running");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: u64, outcome: PurgeOutcome) -> ChannelOutcome {
        ChannelOutcome {
            channel_id: ChannelId(id),
            cutoff: Utc::now(),
            outcome,
        }
    }

    #[test]
    fn test_totals() {
        let report = TickReport::Completed {
            at: Utc::now(),
            outcomes: vec![
                outcome(1, PurgeOutcome::Purged { deleted: 3 }),
                outcome(2, PurgeOutcome::Failed { error: "boom".into() }),
                outcome(3, PurgeOutcome::Purged { deleted: 4 }),
                outcome(4, PurgeOutcome::DryRun),
            ],
        };
        assert_eq!(report.deleted(), 7);
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn test_skipped_ticks_have_no_outcomes() {
        assert!(TickReport::Busy.outcomes().is_empty());
        let report = TickReport::RegistryUnavailable {
            at: Utc::now(),
            error: "down".into(),
        };
        assert_eq!(report.deleted(), 0);
    }

    #[test]
    fn test_serializes_with_status_tags() {
        let json = serde_json::to_value(outcome(7, PurgeOutcome::Purged { deleted: 2 })).unwrap();
        assert_eq!(json["channel_id"], 7);
        assert_eq!(json["status"], "purged");
        assert_eq!(json["deleted"], 2);

        let json = serde_json::to_value(TickReport::Busy).unwrap();
        assert_eq!(json["tick"], "busy");
    }
}
