//! Periodic retention enforcement.
//!
//! [`scheduler::RetentionScheduler`] re-reads the registry every tick and
//! purges each channel; [`report`] describes what a tick did.

pub mod report;
pub mod scheduler;
