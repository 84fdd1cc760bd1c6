//! Infrastructure layer for purgebot.
//!
//! Contains implementations of the traits defined in `purgebot-core`:
//! the SQLite channel registry and the Discord REST platform client, plus
//! data-directory and configuration loading.

pub mod config;
pub mod discord;
pub mod filesystem;
pub mod sqlite;
