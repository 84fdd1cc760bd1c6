//! Request and response shapes exchanged with the messaging platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channel::ChannelId;

/// Reason attached to purge requests when none is configured.
pub const DEFAULT_PURGE_REASON: &str = "included in periodic channel purge";

/// A channel that the platform confirmed exists and is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHandle {
    pub id: ChannelId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub guild_id: Option<u64>,
}

impl ChannelHandle {
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            name: None,
            guild_id: None,
        }
    }
}

/// "Delete every message in the channel strictly older than `before`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeRequest {
    pub before: DateTime<Utc>,
    /// Walk history from the oldest message forward.
    pub oldest_first: bool,
    /// Maximum number of messages to delete. `None` means unbounded.
    pub limit: Option<usize>,
    /// Audit-log reason shown on the platform side.
    pub reason: String,
}

impl PurgeRequest {
    /// The retention purge: oldest-first, unbounded.
    pub fn retention(before: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            before,
            oldest_first: true,
            limit: None,
            reason: reason.into(),
        }
    }
}

/// What a purge request accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeSummary {
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_request_is_unbounded_oldest_first() {
        let now = Utc::now();
        let req = PurgeRequest::retention(now, DEFAULT_PURGE_REASON);
        assert!(req.oldest_first);
        assert!(req.limit.is_none());
        assert_eq!(req.before, now);
        assert_eq!(req.reason, "included in periodic channel purge");
    }
}
