//! Retention logic and port definitions for purgebot.
//!
//! This crate defines the "ports" (repository and platform traits) that the
//! infrastructure layer implements, plus the command-facing
//! [`service::retention::RetentionService`] and the periodic
//! [`retention::scheduler::RetentionScheduler`]. It depends only on
//! `purgebot-types` -- never on `purgebot-infra` or any database/IO crate.

pub mod platform;
pub mod repository;
pub mod retention;
pub mod service;
