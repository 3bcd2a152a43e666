//! Infrastructure layer for the Zellij plugin sandbox.
//!
//! Inside the sandbox the host filesystem is reachable under `/host`. Paths
//! the user types (export destination, images to upload) and paths shown
//! back to the user are translated here.

pub mod paths;

pub use paths::{expand_tilde, get_data_dir, resolve_export_path, strip_host_prefix, to_sandbox_path};


