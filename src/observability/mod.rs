//! OpenTelemetry-based observability with file-based trace export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK provider → JsonLinesExporter → file
//! ```
//!
//! Spans are written as OTLP JSON, one batch per line, to
//! `~/.local/share/zellij/dsanotes/dsanotes-otlp.jsonl`. The file rotates at
//! 10 MB and three rotations are kept. The level comes from the
//! `trace_level` plugin option (default `info`).
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup
//! - [`tracer`]: Tracer provider and span exporter
//! - [`span_formatter`]: OTLP JSON encoding
//! - [`file_writer`]: Size-rotated line writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, TRACE_FILE};
