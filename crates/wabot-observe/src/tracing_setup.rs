//! Tracing subscriber initialization: console output, an append-only log
//! file, and optional OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use wabot_observe::tracing_setup::{TracingOptions, init_tracing};
//!
//! let _guard = init_tracing(&TracingOptions {
//!     filter: "info".to_string(),
//!     log_file: Some("bot.log".into()),
//!     enable_otel: false,
//! })
//! .unwrap();
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// What to install.
#[derive(Debug, Clone)]
pub struct TracingOptions {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub filter: String,
    /// Append log lines to this file as well as the console.
    pub log_file: Option<PathBuf>,
    /// Bridge spans to OpenTelemetry with a stdout exporter.
    pub enable_otel: bool,
}

/// Keeps the file writer's background worker alive. Dropping it flushes
/// buffered lines, so hold it until the process exits.
pub struct TracingGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the global tracing subscriber.
///
/// - Always installs a console `fmt` layer (timestamp, level, message).
/// - With `log_file`, adds a non-ANSI `fmt` layer appending to that file.
///   The file is never rotated.
/// - With `enable_otel`, additionally bridges spans to OpenTelemetry using a
///   stdout exporter.
/// - `RUST_LOG` overrides `filter` when set.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened, the global subscriber
/// has already been set, or the OTel pipeline fails to initialize.
pub fn init_tracing(options: &TracingOptions) -> Result<TracingGuard, Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.filter));

    let console_layer = tracing_subscriber::fmt::layer().with_target(false);

    let (file_layer, file_guard) = match &options.log_file {
        Some(path) => {
            let (writer, guard) = open_log_writer(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let otel_layer = if options.enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("wabot");

        // Store the provider for shutdown and register it globally.
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(TracingGuard { _file: file_guard })
}

/// Open `path` for appending behind a non-blocking writer.
///
/// Creates the parent directory if needed. Existing content is kept.
pub fn open_log_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), Box<dyn std::error::Error>> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("log file path has no file name: {}", path.display()))?
        .to_string_lossy()
        .into_owned();

    std::fs::create_dir_all(&dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)?;

    Ok(tracing_appender::non_blocking(appender))
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Safe to call even when OTel was not enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
