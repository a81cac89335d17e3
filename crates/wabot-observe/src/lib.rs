//! Observability setup for wabot: structured console and file logging with
//! optional OpenTelemetry span export.

pub mod tracing_setup;
