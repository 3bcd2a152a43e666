//! Subscriber setup: `tracing` macros → OpenTelemetry → trace file.

use super::span_formatter::SCOPE_NAME;
use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the trace output inside the data directory.
pub const TRACE_FILE: &str = "dsanotes-otlp.jsonl";

/// Installs the global subscriber.
///
/// # Parameters
///
/// * `config` - Plugin configuration. `trace_level` is an `EnvFilter`
///   directive such as `info` or `dsanotes=debug`; an invalid directive falls
///   back to `info`. `cloud_name` is attached to the trace resource.
///
/// # File Location
///
/// Traces go to `~/.local/share/zellij/dsanotes/dsanotes-otlp.jsonl` when
/// Zellij was started from the home directory.
///
/// # Initialization Behavior
///
/// - Nothing is installed if the data directory cannot be created
/// - Calling this a second time has no effect
///
/// # Example
///
/// ```rust,ignore
/// use dsanotes::observability::init_tracing;
/// use dsanotes::Config;
///
/// let config = Config::from_zellij(&configuration)?;
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.trace_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let data_dir = crate::infrastructure::get_data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![
        KeyValue::new("service.name", SCOPE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("dsanotes.cloud_name", config.cloud_name.clone()),
    ]);

    let provider = tracer::create_tracer_provider(data_dir.join(TRACE_FILE), resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SCOPE_NAME));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .try_init();
}


