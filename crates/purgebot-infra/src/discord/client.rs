//! DiscordClient -- concrete [`MessagingPlatform`] implementation for Discord.
//!
//! Talks to the Discord REST API with a bot token. Purging walks channel
//! history page by page, bulk-deletes messages younger than two weeks and
//! deletes older ones individually.
//!
//! The token is wrapped in [`secrecy::SecretString`] and is only exposed when
//! building the `Authorization` header.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};

use purgebot_core::platform::MessagingPlatform;
use purgebot_types::channel::ChannelId;
use purgebot_types::config::DiscordConfig;
use purgebot_types::error::PlatformError;
use purgebot_types::platform::{ChannelHandle, PurgeRequest, PurgeSummary};

use super::snowflake::{plan_deletion, snowflake_from_timestamp};
use super::types::{
    BulkDeleteBody, DiscordChannel, DiscordErrorBody, DiscordMessage, DiscordUser, RateLimitBody,
};

/// Messages fetched per history request (Discord maximum).
const PAGE_SIZE: usize = 100;

/// Rate limits shorter than this are waited out instead of failing the purge.
const MAX_RATE_LIMIT_WAIT_MS: u64 = 10_000;

const MAX_RATE_LIMIT_RETRIES: u32 = 3;

const AUDIT_LOG_REASON: &str = "X-Audit-Log-Reason";

/// Discord REST client.
///
/// Does not derive Debug; the token must never end up in logs.
pub struct DiscordClient {
    client: reqwest::Client,
    token: SecretString,
    base_url: String,
}

/// History cursor: forward from the oldest message, or backward from the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    After(u64),
    Before(u64),
}

impl DiscordClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `token` - Discord bot token wrapped in SecretString
    /// * `config` - API base URL and request timeout
    pub fn new(token: SecretString, config: &DiscordConfig) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!(
                "DiscordBot (https://github.com/purgebot/purgebot, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()
            .map_err(|e| PlatformError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token.expose_secret())
    }

    /// Check the token by fetching the bot's own user. This is the readiness
    /// signal for starting the scheduler.
    pub async fn verify(&self) -> Result<DiscordUser, PlatformError> {
        let url = self.url("/users/@me");
        let response = self.execute(|| self.client.get(&url)).await?;
        response
            .json()
            .await
            .map_err(|e| PlatformError::Deserialization(format!("invalid user: {e}")))
    }

    /// Send a request, waiting out short rate limits.
    async fn execute<F>(&self, build: F) -> Result<reqwest::Response, PlatformError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut retries = 0;
        loop {
            let response = build()
                .header(AUTHORIZATION, self.auth_header())
                .send()
                .await
                .map_err(|e| PlatformError::Request(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                let retry_after_ms = parse_retry_after_ms(&body);
                match retry_after_ms {
                    Some(wait_ms)
                        if wait_ms <= MAX_RATE_LIMIT_WAIT_MS && retries < MAX_RATE_LIMIT_RETRIES =>
                    {
                        retries += 1;
                        tracing::debug!(wait_ms, retries, "rate limited by Discord, waiting");
                        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                        continue;
                    }
                    _ => return Err(PlatformError::RateLimited { retry_after_ms }),
                }
            }

            return Err(map_status(status.as_u16(), body));
        }
    }

    /// One page of message ids, ascending.
    async fn fetch_page(&self, channel_id: ChannelId, cursor: Cursor) -> Result<Vec<u64>, PlatformError> {
        let url = self.url(&history_path(channel_id, cursor));
        let response = self.execute(|| self.client.get(&url)).await?;
        let messages: Vec<DiscordMessage> = response
            .json()
            .await
            .map_err(|e| PlatformError::Deserialization(format!("invalid message page: {e}")))?;

        let mut ids = messages
            .iter()
            .map(|m| {
                m.id.parse::<u64>()
                    .map_err(|e| PlatformError::Deserialization(format!("invalid message id: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_unstable();
        Ok(ids)
    }

    async fn bulk_delete(&self, channel_id: ChannelId, ids: &[u64], reason: &str) -> Result<(), PlatformError> {
        let url = self.url(&format!("/channels/{channel_id}/messages/bulk-delete"));
        let body = BulkDeleteBody {
            messages: ids.iter().map(u64::to_string).collect(),
        };
        let reason = encode_reason(reason);
        self.execute(|| {
            self.client
                .post(&url)
                .header(AUDIT_LOG_REASON, &reason)
                .json(&body)
        })
        .await?;
        Ok(())
    }

    /// Delete one message. Returns `false` if it was already gone.
    async fn delete_message(&self, channel_id: ChannelId, id: u64, reason: &str) -> Result<bool, PlatformError> {
        let url = self.url(&format!("/channels/{channel_id}/messages/{id}"));
        let reason = encode_reason(reason);
        match self
            .execute(|| self.client.delete(&url).header(AUDIT_LOG_REASON, &reason))
            .await
        {
            Ok(_) => Ok(true),
            Err(PlatformError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete a batch of ids, bulk where Discord allows it.
    async fn delete_ids(&self, channel_id: ChannelId, ids: &[u64], reason: &str) -> Result<u64, PlatformError> {
        let (chunks, singles) = plan_deletion(ids, Utc::now());
        let mut deleted = 0u64;

        for chunk in &chunks {
            self.bulk_delete(channel_id, chunk, reason).await?;
            deleted += chunk.len() as u64;
        }
        for id in singles {
            if self.delete_message(channel_id, id, reason).await? {
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}

impl MessagingPlatform for DiscordClient {
    async fn resolve_channel(&self, channel_id: ChannelId) -> Result<ChannelHandle, PlatformError> {
        let url = self.url(&format!("/channels/{channel_id}"));
        let response = self.execute(|| self.client.get(&url)).await?;
        let channel: DiscordChannel = response
            .json()
            .await
            .map_err(|e| PlatformError::Deserialization(format!("invalid channel: {e}")))?;

        Ok(ChannelHandle {
            id: channel_id,
            name: channel.name,
            guild_id: channel.guild_id.and_then(|g| g.parse().ok()),
        })
    }

    async fn purge(&self, channel: &ChannelHandle, request: &PurgeRequest) -> Result<PurgeSummary, PlatformError> {
        let cutoff = snowflake_from_timestamp(request.before);
        let mut cursor = if request.oldest_first {
            Cursor::After(0)
        } else {
            Cursor::Before(cutoff)
        };
        let mut remaining = request.limit;
        let mut deleted = 0u64;

        loop {
            if remaining == Some(0) {
                break;
            }

            let page = self.fetch_page(channel.id, cursor).await?;
            let Some((&first, &last)) = page.first().zip(page.last()) else {
                break;
            };
            let full_page = page.len() >= PAGE_SIZE;
            let reached_cutoff = last >= cutoff;

            let mut eligible: Vec<u64> = page.into_iter().filter(|id| *id < cutoff).collect();
            if !request.oldest_first {
                // Newest first: delete from the top of the eligible range.
                eligible.reverse();
            }
            if let Some(limit) = remaining.as_mut() {
                eligible.truncate(*limit);
                *limit -= eligible.len();
            }

            if !eligible.is_empty() {
                let count = self
                    .delete_ids(channel.id, &eligible, &request.reason)
                    .await
                    .inspect_err(|e| {
                        tracing::debug!(channel_id = %channel.id, deleted, error = %e, "purge interrupted");
                    })?;
                deleted += count;
            }

            cursor = match cursor {
                Cursor::After(_) if reached_cutoff => break,
                Cursor::After(_) => Cursor::After(last),
                Cursor::Before(_) => Cursor::Before(first),
            };
            if !full_page {
                break;
            }
        }

        Ok(PurgeSummary { deleted })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn history_path(channel_id: ChannelId, cursor: Cursor) -> String {
    match cursor {
        Cursor::After(id) => format!("/channels/{channel_id}/messages?limit={PAGE_SIZE}&after={id}"),
        Cursor::Before(id) => format!("/channels/{channel_id}/messages?limit={PAGE_SIZE}&before={id}"),
    }
}

fn parse_retry_after_ms(body: &str) -> Option<u64> {
    serde_json::from_str::<RateLimitBody>(body)
        .ok()
        .map(|b| (b.retry_after.max(0.0) * 1000.0).ceil() as u64)
}

fn map_status(status: u16, body: String) -> PlatformError {
    let message = serde_json::from_str::<DiscordErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.clone());
    match status {
        401 => PlatformError::Unauthorized,
        403 => PlatformError::Forbidden(message),
        404 => PlatformError::NotFound,
        _ => PlatformError::Unexpected { status, body },
    }
}

/// Percent-encode an audit-log reason for use as a header value.
fn encode_reason(reason: &str) -> String {
    urlencoding::encode(reason).into_owned()
}
