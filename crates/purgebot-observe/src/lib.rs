//! Observability setup for purgebot: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
