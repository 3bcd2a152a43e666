//! Zellij plugin wrapper and entry point.
//!
//! The thin integration layer between the dsanotes library and Zellij: it
//! maps keys to library events, performs the side effects the handler asks
//! for, and feeds their outcomes back in as events.
//!
//! # Plugin Lifecycle
//!
//! 1. **Load**: Parse config. A missing `cloud_name` stops here and only the
//!    error is rendered. Otherwise initialize tracing and `AppState`, request
//!    permissions and subscribe.
//! 2. **Update**: Translate Zellij events, delegate to `handle_event`, run
//!    the returned actions.
//! 3. **Render**: Call the library render function.
//!
//! # Side Effects
//!
//! - `Upload`: read the file from the sandbox and issue a host `web_request`.
//!   The `WebRequestResult` carries the section id and file back in its
//!   context and becomes `UploadFinished`.
//! - `WriteExport`: write the Markdown file, then report `ExportFinished`.
//! - `CloseFocus`: hide the pane.
//!
//! Uploads need the `WebAccess` permission. Until Zellij reports it granted,
//! the library fails each upload task itself rather than emitting a request.
//!
//! # Keybindings
//!
//! Normal mode:
//! - `j`/`k`, `Down`/`Up`: move
//! - `n`: new section, `D`: delete, `Space`: fold
//! - `J`/`K`: move section down/up, `m`: grab, then `Enter` to drop
//! - `t`/`a`/`c`: edit title/algorithm/code, `l`: next language
//! - `p`/`o`: upload to problem solving/output
//! - `P`/`O`: manage problem solving/output images
//! - `e`: export, `/`: search, `q`: close
//!
//! Editing and path prompts: type, `Enter` to save or submit (new line in
//! algorithm and code), `Esc` to leave.
//!
//! Image gallery: `j`/`k` move, `J`/`K` reorder, `d` delete, `Esc` back.

#![allow(clippy::multiple_crate_versions)]

#[cfg(target_family = "wasm")]
use zellij_tile::prelude::*;

#[cfg(target_family = "wasm")]
register_plugin!(State);

#[cfg(target_family = "wasm")]
use shim::State;

#[cfg(not(target_family = "wasm"))]
fn main() {
    eprintln!("dsanotes is a Zellij plugin; build it for wasm32-wasip1 and load the .wasm in Zellij");
}

#[cfg(target_family = "wasm")]
mod shim {
    use std::collections::{BTreeMap, VecDeque};

    use dsanotes::app::EditTarget;
    use dsanotes::domain::{ImageField, SectionId};
    use dsanotes::export::write_document;
    use dsanotes::infrastructure::{resolve_export_path, to_sandbox_path};
    use dsanotes::upload::{parse_response, CloudinaryClient, UploadTask};
    use dsanotes::{handle_event, Action, AppState, Config, Event, InputMode, SearchFocus, Theme, UploadError};
    use zellij_tile::prelude::{
        hide_self, request_permission, subscribe, web_request, BareKey, EventType, HttpVerb, KeyModifier,
        KeyWithModifier, PermissionStatus, PermissionType, ZellijPlugin,
    };

    /// Context key carrying the target section of an upload request.
    const CONTEXT_SECTION: &str = "section_id";
    /// Context key carrying the file of an upload request.
    const CONTEXT_FILE: &str = "file";

    /// Plugin state wrapper.
    pub struct State {
        app: AppState,
        uploader: Option<CloudinaryClient>,
        /// Configuration error that prevents the form from being shown.
        fatal: Option<String>,
    }

    impl Default for State {
        fn default() -> Self {
            Self {
                app: AppState::new(Theme::default(), resolve_export_path(None)),
                uploader: None,
                fatal: None,
            }
        }
    }

    impl ZellijPlugin for State {
        fn load(&mut self, configuration: BTreeMap<String, String>) {
            let config = match Config::from_zellij(&configuration) {
                Ok(config) => config,
                Err(e) => {
                    self.fatal = Some(e.to_string());
                    return;
                }
            };

            dsanotes::observability::init_tracing(&config);
            let _guard = tracing::debug_span!("plugin_load").entered();

            self.app = dsanotes::initialize(&config);
            self.uploader = Some(config.uploader());

            request_permission(&[
                PermissionType::ChangeApplicationState,
                PermissionType::WebAccess,
                PermissionType::FullHdAccess,
            ]);
            subscribe(&[EventType::Key, EventType::WebRequestResult, EventType::PermissionRequestResult]);

            tracing::debug!(cloud_name = %config.cloud_name, "plugin load complete");
        }

        fn update(&mut self, event: zellij_tile::prelude::Event) -> bool {
            if self.fatal.is_some() {
                return false;
            }

            let event_name = Self::event_name(&event);
            let _guard = tracing::debug_span!("plugin_update_event", event_type = %event_name).entered();

            let our_event = match event {
                zellij_tile::prelude::Event::Key(ref key) => match self.map_key_event(key) {
                    Some(event) => event,
                    None => return false,
                },
                zellij_tile::prelude::Event::WebRequestResult(status, _headers, body, context) => {
                    match Self::map_web_result(status, &body, &context) {
                        Some(event) => event,
                        None => return false,
                    }
                }
                zellij_tile::prelude::Event::PermissionRequestResult(status) => Self::handle_permission_result(status),
                _ => return false,
            };

            self.dispatch(our_event)
        }

        fn render(&mut self, rows: usize, cols: usize) {
            match &self.fatal {
                Some(message) => dsanotes::ui::render_fatal(message, rows, cols),
                None => dsanotes::ui::render(&self.app, rows, cols),
            }
        }
    }

    impl State {
        /// Runs an event and every follow-up event its actions produce.
        fn dispatch(&mut self, first: Event) -> bool {
            let mut pending = VecDeque::from([first]);
            let mut should_render = false;

            while let Some(event) = pending.pop_front() {
                match handle_event(&mut self.app, &event) {
                    Ok((render, actions)) => {
                        tracing::debug!(action_count = actions.len(), should_render = render, "event handled");
                        should_render |= render;
                        pending.extend(actions.iter().filter_map(|action| self.execute_action(action)));
                    }
                    Err(e) => tracing::warn!(error = %e, "error handling event"),
                }
            }

            should_render
        }

        /// Records the permission answer; uploads issued before a grant fail
        /// instead of waiting on a request the host would drop.
        fn handle_permission_result(status: PermissionStatus) -> Event {
            Event::PermissionResult {
                granted: matches!(status, PermissionStatus::Granted),
            }
        }

        fn event_name(event: &zellij_tile::prelude::Event) -> String {
            match event {
                zellij_tile::prelude::Event::Key(key) => format!("Key({:?})", key.bare_key),
                zellij_tile::prelude::Event::WebRequestResult(status, ..) => format!("WebRequestResult({status})"),
                zellij_tile::prelude::Event::PermissionRequestResult(..) => "PermissionRequestResult".to_string(),
                _ => "Other".to_string(),
            }
        }

        /// Maps keyboard events to application events for the current mode.
        fn map_key_event(&self, key: &KeyWithModifier) -> Option<Event> {
            tracing::debug!(bare_key = ?key.bare_key, mode = ?self.app.input_mode, "key event");

            if key.has_modifiers(&[KeyModifier::Ctrl]) {
                return match key.bare_key {
                    BareKey::Char('n') => Some(Event::KeyDown),
                    BareKey::Char('p') => Some(Event::KeyUp),
                    _ => None,
                };
            }

            match self.app.input_mode {
                InputMode::Normal => Self::map_normal_key(key.bare_key),
                InputMode::Search(focus) => Self::map_search_key(key.bare_key, focus),
                InputMode::Editing(_) | InputMode::PathPrompt(_) => Self::map_text_key(key.bare_key),
                InputMode::Images(_) => Some(match key.bare_key {
                    BareKey::Down | BareKey::Char('j') => Event::KeyDown,
                    BareKey::Up | BareKey::Char('k') => Event::KeyUp,
                    BareKey::Char('J') => Event::MoveImage { offset: 1 },
                    BareKey::Char('K') => Event::MoveImage { offset: -1 },
                    BareKey::Char('d') | BareKey::Delete => Event::RemoveImage,
                    BareKey::Esc | BareKey::Char('q') => Event::Escape,
                    _ => return None,
                }),
                InputMode::Moving { .. } => Some(match key.bare_key {
                    BareKey::Down | BareKey::Char('j') => Event::KeyDown,
                    BareKey::Up | BareKey::Char('k') => Event::KeyUp,
                    BareKey::Enter | BareKey::Char('m') => Event::Confirm,
                    BareKey::Esc => Event::Escape,
                    _ => return None,
                }),
            }
        }

        fn map_normal_key(key: BareKey) -> Option<Event> {
            Some(match key {
                BareKey::Down | BareKey::Char('j') => Event::KeyDown,
                BareKey::Up | BareKey::Char('k') => Event::KeyUp,
                BareKey::Char('n') => Event::AddSection,
                BareKey::Char('D') => Event::RemoveSection,
                BareKey::Char(' ') | BareKey::Enter => Event::ToggleCollapse,
                BareKey::Char('J') => Event::MoveSection { offset: 1 },
                BareKey::Char('K') => Event::MoveSection { offset: -1 },
                BareKey::Char('m') => Event::GrabSection,
                BareKey::Char('t') => Event::EditField(EditTarget::Title),
                BareKey::Char('a') => Event::EditField(EditTarget::Algorithm),
                BareKey::Char('c') => Event::EditField(EditTarget::Code),
                BareKey::Char('l') => Event::CycleLanguage,
                BareKey::Char('p') => Event::StartUpload(ImageField::ProblemSolving),
                BareKey::Char('o') => Event::StartUpload(ImageField::Output),
                BareKey::Char('P') => Event::ManageImages(ImageField::ProblemSolving),
                BareKey::Char('O') => Event::ManageImages(ImageField::Output),
                BareKey::Char('e') => Event::Export,
                BareKey::Char('/') => Event::SearchMode,
                BareKey::Char('q') => Event::CloseFocus,
                _ => return None,
            })
        }

        fn map_search_key(key: BareKey, focus: SearchFocus) -> Option<Event> {
            Some(match (key, focus) {
                (BareKey::Esc, _) => Event::Escape,
                (BareKey::Enter, _) => Event::Confirm,
                (BareKey::Down, _) | (BareKey::Char('j'), SearchFocus::Navigating) => Event::KeyDown,
                (BareKey::Up, _) | (BareKey::Char('k'), SearchFocus::Navigating) => Event::KeyUp,
                (BareKey::Tab, SearchFocus::Typing) => Event::FocusResults,
                (BareKey::Char('/'), SearchFocus::Navigating) => Event::FocusSearchBar,
                (BareKey::Backspace, SearchFocus::Typing) => Event::Backspace,
                (BareKey::Char(c), SearchFocus::Typing) => Event::Char(c),
                _ => return None,
            })
        }

        fn map_text_key(key: BareKey) -> Option<Event> {
            Some(match key {
                BareKey::Esc => Event::Escape,
                BareKey::Enter => Event::Confirm,
                BareKey::Backspace => Event::Backspace,
                BareKey::Tab => Event::Char('\t'),
                BareKey::Char(c) => Event::Char(c),
                _ => return None,
            })
        }

        /// Turns the host's answer to an upload request into `UploadFinished`.
        fn map_web_result(status: u16, body: &[u8], context: &BTreeMap<String, String>) -> Option<Event> {
            let section_id = context.get(CONTEXT_SECTION)?.parse::<SectionId>().ok()?;
            let file = context.get(CONTEXT_FILE)?.clone();
            let result = parse_response(status, body);

            tracing::debug!(status, file = %file, ok = result.is_ok(), "upload response received");
            Some(Event::UploadFinished {
                section_id,
                file,
                result,
            })
        }

        /// Executes an action; returns the event reporting its outcome when
        /// the outcome is known immediately.
        #[tracing::instrument(level = "debug", skip(self))]
        fn execute_action(&self, action: &Action) -> Option<Event> {
            match action {
                Action::CloseFocus => {
                    hide_self();
                    None
                }
                Action::Upload(task) => self.start_upload(task),
                Action::WriteExport { path, content } => Some(Event::ExportFinished {
                    path: path.clone(),
                    success: write_document(path, content),
                }),
            }
        }

        /// Reads the task's file and hands the request to the host.
        fn start_upload(&self, task: &UploadTask) -> Option<Event> {
            let failed = |error: UploadError| {
                Some(Event::UploadFinished {
                    section_id: task.section_id,
                    file: task.file.clone(),
                    result: Err(error),
                })
            };

            let Some(client) = &self.uploader else {
                return failed(UploadError::Transport("no image host configured".to_string()));
            };

            let path = to_sandbox_path(&task.file);
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    return failed(UploadError::Read {
                        path: task.file.clone(),
                        message: e.to_string(),
                    })
                }
            };

            let request = match client.build_request(&bytes) {
                Ok(request) => request,
                Err(e) => return failed(e),
            };

            let context = BTreeMap::from([
                (CONTEXT_SECTION.to_string(), task.section_id.to_string()),
                (CONTEXT_FILE.to_string(), task.file.clone()),
            ]);

            tracing::debug!(
                file = %task.file,
                index = task.index,
                total = task.total,
                bytes = bytes.len(),
                "issuing upload request"
            );
            web_request(request.url, HttpVerb::Post, request.headers, request.body, context);
            None
        }
    }
}


