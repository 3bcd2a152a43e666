//! Tracer provider whose spans go to a local JSON-lines file.
//!
//! The plugin sandbox has no collector to talk to, so finished spans are
//! encoded as OTLP JSON and appended to a [`RotatingFile`] one batch per line.

use super::file_writer::RotatingFile;
use super::span_formatter::OtlpJsonEncoder;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;

/// Span exporter writing OTLP JSON lines.
struct JsonLinesExporter {
    file: RotatingFile,
    encoder: OtlpJsonEncoder,
    is_shutdown: bool,
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.is_shutdown {
            Err(TraceError::from("trace exporter already shut down"))
        } else {
            let line = self.encoder.encode(&batch).to_string();
            self.file
                .write_line(&line)
                .map_err(|e| TraceError::from(e.to_string()))
        };
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown = true;
    }
}

impl std::fmt::Debug for JsonLinesExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExporter")
            .field("file", &self.file)
            .field("is_shutdown", &self.is_shutdown)
            .finish_non_exhaustive()
    }
}

/// Builds a provider that exports every span as soon as it ends.
///
/// # Parameters
///
/// * `path` - Trace file, rotated by [`RotatingFile`](super::file_writer::RotatingFile)
/// * `resource` - Attributes stamped on every exported span
///
/// # Returns
///
/// A provider with a simple span processor: each span is written as soon
/// as it ends.
pub fn create_tracer_provider(path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = JsonLinesExporter {
        file: RotatingFile::new(path),
        encoder: OtlpJsonEncoder::new(resource.clone()),
        is_shutdown: false,
    };

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}


