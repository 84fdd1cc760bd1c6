//! Discord REST implementation of the messaging platform.
//!
//! Only the handful of endpoints the retention loop needs are covered:
//! token verification, channel lookup, message history paging and message
//! deletion (single and bulk).

pub mod client;
pub mod snowflake;
pub mod types;

pub use client::DiscordClient;
