//! Channel registry trait definition.

use purgebot_types::channel::{ChannelId, ChannelPolicy};
use purgebot_types::error::RepositoryError;
use purgebot_types::max_age::MaxAge;

/// Persistent mapping from channel to retention policy.
///
/// Every method reports store trouble as a [`RepositoryError`]; callers
/// decide whether that becomes a user reply or a log line. Implementations
/// acquire a connection per call and never hold one between calls.
pub trait ChannelRepository: Send + Sync {
    /// Insert the channel, or replace its max age if already registered.
    ///
    /// Must be a single conditional write: concurrent upserts for the same
    /// channel never produce two rows, and a failed upsert leaves the
    /// previous policy untouched.
    fn upsert(
        &self,
        channel_id: ChannelId,
        max_age: MaxAge,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove the channel. No-op if it is not registered.
    fn remove(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Look up a single channel's policy.
    fn get(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<Option<ChannelPolicy>, RepositoryError>> + Send;

    /// Every registered policy. Ordering is not significant.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChannelPolicy>, RepositoryError>> + Send;
}
