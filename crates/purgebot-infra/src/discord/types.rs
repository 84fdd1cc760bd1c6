//! Discord REST wire types (the subset purgebot reads and writes).

use serde::{Deserialize, Serialize};

/// `GET /users/@me`
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
}

/// `GET /channels/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// One entry of `GET /channels/{id}/messages`. Only the id is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
}

/// `POST /channels/{id}/messages/bulk-delete`
#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteBody {
    pub messages: Vec<String>,
}

/// Body of a 429 response.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitBody {
    /// Seconds to wait.
    pub retry_after: f64,
    #[serde(default)]
    pub global: bool,
}

/// Body of most 4xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordErrorBody {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
}
