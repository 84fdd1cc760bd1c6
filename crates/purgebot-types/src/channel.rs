use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::max_age::MaxAge;

/// Platform-assigned channel identifier (a Discord snowflake).
///
/// Opaque to the registry: it is only ever compared for equality and
/// round-tripped through storage as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl ChannelId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Retention policy for a single channel.
///
/// At most one policy exists per channel. Messages older than `max_age`
/// are eligible for deletion on every scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPolicy {
    pub channel_id: ChannelId,
    pub max_age: MaxAge,
    /// When the channel was first registered. `None` for policies that were
    /// never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
    /// When the max age was last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChannelPolicy {
    /// Create an unpersisted policy (no timestamps).
    pub fn new(channel_id: ChannelId, max_age: MaxAge) -> Self {
        Self {
            channel_id,
            max_age,
            registered_at: None,
            updated_at: None,
        }
    }

    /// The instant before which messages in this channel should be purged.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.max_age.as_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_channel_id_roundtrip() {
        let id: ChannelId = "1098765432101234567".parse().unwrap();
        assert_eq!(id, ChannelId(1_098_765_432_101_234_567));
        assert_eq!(id.to_string(), "1098765432101234567");
    }

    #[test]
    fn test_channel_id_rejects_garbage() {
        assert!("general".parse::<ChannelId>().is_err());
        assert!("-5".parse::<ChannelId>().is_err());
    }

    #[test]
    fn test_channel_id_serializes_as_number() {
        let json = serde_json::to_string(&ChannelId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_cutoff_subtracts_max_age() {
        let policy = ChannelPolicy::new(ChannelId(1), MaxAge::from_minutes(60).unwrap());
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        assert_eq!(policy.cutoff(now), expected);
    }
}
