//! Messaging platform trait (port).
//!
//! The scheduler only needs two capabilities from the chat platform:
//! confirming a channel still exists, and deleting old messages from it.
//! The Discord REST implementation lives in purgebot-infra.

use purgebot_types::channel::ChannelId;
use purgebot_types::error::PlatformError;
use purgebot_types::platform::{ChannelHandle, PurgeRequest, PurgeSummary};

pub trait MessagingPlatform: Send + Sync {
    /// Resolve a registered id into a live channel.
    ///
    /// Returns [`PlatformError::NotFound`] when the channel was deleted or
    /// the bot can no longer see it.
    fn resolve_channel(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<ChannelHandle, PlatformError>> + Send;

    /// Delete messages in `channel` strictly older than `request.before`.
    fn purge(
        &self,
        channel: &ChannelHandle,
        request: &PurgeRequest,
    ) -> impl std::future::Future<Output = Result<PurgeSummary, PlatformError>> + Send;
}
