//! Shared domain types for purgebot.
//!
//! This crate contains the core domain types used across the workspace:
//! channel policies, the max-age duration parser, platform request/response
//! shapes, configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod channel;
pub mod config;
pub mod error;
pub mod max_age;
pub mod platform;
