//! Discord snowflake helpers.
//!
//! A snowflake's top 42 bits are milliseconds since the Discord epoch, so a
//! timestamp can be turned into the smallest snowflake at that instant and
//! compared against message ids directly.

use chrono::{DateTime, Duration, Utc};

/// 2015-01-01T00:00:00Z in Unix milliseconds.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

const TIMESTAMP_SHIFT: u32 = 22;

/// Messages older than this many days cannot be bulk deleted.
pub const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;

/// Messages this close to the bulk-delete age limit are deleted singly, so a
/// message cannot age past the limit between planning and the request.
pub const BULK_DELETE_MARGIN_SECS: i64 = 60;

/// Bulk delete accepts between 2 and 100 ids.
pub const BULK_DELETE_MAX: usize = 100;

/// Smallest snowflake created at `ts`. Every message with a lower id is
/// strictly older than `ts`.
pub fn snowflake_from_timestamp(ts: DateTime<Utc>) -> u64 {
    let ms = ts.timestamp_millis() - DISCORD_EPOCH_MS;
    if ms <= 0 {
        0
    } else {
        (ms as u64) << TIMESTAMP_SHIFT
    }
}

/// Creation time encoded in a snowflake.
pub fn timestamp_from_snowflake(id: u64) -> DateTime<Utc> {
    let ms = (id >> TIMESTAMP_SHIFT) as i64 + DISCORD_EPOCH_MS;
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Split message ids into bulk-deletable chunks and ids that must be deleted
/// one at a time.
///
/// Messages younger than [`BULK_DELETE_MAX_AGE_DAYS`] (less
/// [`BULK_DELETE_MARGIN_SECS`]) go into chunks of at most
/// [`BULK_DELETE_MAX`]. Older messages, and a chunk that would hold a single
/// id, are returned as singles. Input order is preserved within each group.
pub fn plan_deletion(ids: &[u64], now: DateTime<Utc>) -> (Vec<Vec<u64>>, Vec<u64>) {
    let bulk_window =
        Duration::days(BULK_DELETE_MAX_AGE_DAYS) - Duration::seconds(BULK_DELETE_MARGIN_SECS);
    let bulk_floor = snowflake_from_timestamp(now - bulk_window);
    let (young, mut singles): (Vec<u64>, Vec<u64>) = ids.iter().partition(|id| **id > bulk_floor);

    let mut chunks = Vec::new();
    for chunk in young.chunks(BULK_DELETE_MAX) {
        if chunk.len() == 1 {
            singles.push(chunk[0]);
        } else {
            chunks.push(chunk.to_vec());
        }
    }

    (chunks, singles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_known_snowflake_timestamp() {
        // Discord's documented example: 175928847299117063 -> 2016-04-30T11:18:25.796Z
        let ts = timestamp_from_snowflake(175_928_847_299_117_063);
        assert_eq!(ts.timestamp_millis(), 1_462_015_105_796);
    }

    #[test]
    fn test_snowflake_ordering_matches_time() {
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let boundary = snowflake_from_timestamp(cutoff);

        let older = snowflake_from_timestamp(cutoff - Duration::milliseconds(1)) | 0x3F_FFFF;
        let same_instant = boundary | 1;
        assert!(older < boundary);
        assert!(same_instant >= boundary);
        assert_eq!(timestamp_from_snowflake(boundary), cutoff);
    }

    #[test]
    fn test_pre_epoch_timestamp_is_zero() {
        let ts = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(snowflake_from_timestamp(ts), 0);
    }

    #[test]
    fn test_plan_deletion_splits_by_age() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let old = snowflake_from_timestamp(now - Duration::days(30));
        let young_a = snowflake_from_timestamp(now - Duration::days(1));
        let young_b = young_a + 1;

        let (chunks, singles) = plan_deletion(&[old, young_a, young_b], now);
        assert_eq!(chunks, vec![vec![young_a, young_b]]);
        assert_eq!(singles, vec![old]);
    }

    #[test]
    fn test_plan_deletion_lone_young_message_is_single() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let young = snowflake_from_timestamp(now - Duration::hours(2));

        let (chunks, singles) = plan_deletion(&[young], now);
        assert!(chunks.is_empty());
        assert_eq!(singles, vec![young]);
    }

    #[test]
    fn test_plan_deletion_near_age_limit_is_single() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let limit = now - Duration::days(BULK_DELETE_MAX_AGE_DAYS);
        let almost_expired_a = snowflake_from_timestamp(limit + Duration::seconds(30));
        let almost_expired_b = almost_expired_a + 1;
        let safe_a = snowflake_from_timestamp(limit + Duration::minutes(5));
        let safe_b = safe_a + 1;

        let (chunks, singles) =
            plan_deletion(&[almost_expired_a, almost_expired_b, safe_a, safe_b], now);
        assert_eq!(chunks, vec![vec![safe_a, safe_b]]);
        assert_eq!(singles, vec![almost_expired_a, almost_expired_b]);
    }

    #[test]
    fn test_plan_deletion_chunks_at_100() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let base = snowflake_from_timestamp(now - Duration::hours(1));
        let ids: Vec<u64> = (0..201).map(|i| base + i).collect();

        let (chunks, singles) = plan_deletion(&ids, now);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 100));
        assert_eq!(singles, vec![base + 200]);
    }
}
