//! Application layer coordinating state, events, and actions.
//!
//! Sits between the plugin shim (`main.rs`) and the domain, upload and
//! export layers. Data flows one way:
//!
//! ```text
//! Key / host event → Event → handle_event → AppState mutation → Actions
//!                      ↑                                            ↓
//!                      └──── UploadFinished / ExportFinished ◄──── shim
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing logic and state transitions
//! - [`modes`]: Input mode state machine types
//! - [`state`]: Central application state container and view model computation

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{EditTarget, InputMode, SearchFocus};
pub use state::{AppState, StatusMessage, UploadFailure, WebAccess};


