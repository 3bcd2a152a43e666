//! Event handling and state transition logic.
//!
//! [`handle_event`] is the only place the document and the interface state
//! change. It never performs I/O; side effects come back as [`Action`]s for
//! the plugin shim to run.
//!
//! # Event Types
//!
//! - **Navigation**: `KeyDown`, `KeyUp`
//! - **Section list**: `AddSection`, `RemoveSection`, `ToggleCollapse`,
//!   `MoveSection`, `GrabSection`, `SectionDragEnd`
//! - **Fields**: `EditField`, `CycleLanguage`
//! - **Images**: `StartUpload`, `ManageImages`, `MoveImage`, `RemoveImage`
//! - **Text input**: `Char`, `Backspace`, `Confirm`, `Escape`
//! - **Completions**: `UploadFinished`, `ExportFinished`
//! - **Host**: `PermissionResult`
//!
//! # Upload Queue
//!
//! Every confirmed path prompt becomes one [`UploadBatch`] at the back of
//! `AppState::uploads`. Only the front batch runs, and it has at most one
//! task in flight; the next [`Action::Upload`] is emitted only when the
//! previous task's `UploadFinished` arrives.
//!
//! The host silently drops web requests it has no permission for, so a task
//! is only handed out while [`WebAccess::Granted`]. Otherwise it fails at once
//! with a transport error and the batch stops like any other failure.

use super::modes::{EditTarget, InputMode, SearchFocus};
use super::state::{UploadFailure, WebAccess};
use crate::app::{Action, AppState};
use crate::domain::error::Result;
use crate::domain::{ImageField, SectionId, SectionUpdate, UploadError};
use crate::export::generate_document;
use crate::infrastructure::strip_host_prefix;
use crate::upload::{BatchStep, UploadBatch, UploadTask};
use std::path::PathBuf;

/// Events triggered by user input or by completed side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Moves the cursor of the current mode down (wraps to top).
    KeyDown,
    /// Moves the cursor of the current mode up (wraps to bottom).
    KeyUp,
    /// Hides the plugin pane.
    CloseFocus,

    /// Appends an empty section and selects it.
    AddSection,
    /// Removes the selected section.
    RemoveSection,
    /// Collapses or expands the selected section.
    ToggleCollapse,
    /// Moves the selected section by `offset` positions.
    MoveSection { offset: isize },
    /// Picks up the selected section; the next `Confirm` drops it at the
    /// cursor.
    GrabSection,
    /// Completes a drag gesture.
    ///
    /// `destination == None` means the section was dropped outside the list
    /// and nothing moves.
    SectionDragEnd {
        source: usize,
        destination: Option<usize>,
    },

    /// Opens the prompt on one text field of the selected section.
    EditField(EditTarget),
    /// Switches the code language of the selected section.
    CycleLanguage,

    /// Opens the path prompt for uploading into one gallery.
    StartUpload(ImageField),
    /// Opens one gallery of the selected section for reordering and deletion.
    ManageImages(ImageField),
    /// Moves the image under the cursor by `offset` positions.
    MoveImage { offset: isize },
    /// Deletes the image under the cursor.
    RemoveImage,

    /// Renders the document and writes it to the export path.
    Export,

    /// Enters search mode with typing focus.
    SearchMode,
    /// Focuses the search input field (from navigating mode).
    FocusSearchBar,
    /// Focuses the search results list (from typing mode).
    FocusResults,

    /// Types a character into the active text buffer.
    Char(char),
    /// Removes the last character of the active text buffer.
    Backspace,
    /// Enter key: saves, submits, jumps or drops depending on the mode.
    Confirm,
    /// Leaves the current mode.
    Escape,

    /// Outcome of one upload task issued through [`Action::Upload`].
    UploadFinished {
        section_id: SectionId,
        file: String,
        result: std::result::Result<String, UploadError>,
    },

    /// Outcome of an [`Action::WriteExport`].
    ExportFinished { path: PathBuf, success: bool },

    /// Answer to the plugin's permission request.
    PermissionResult { granted: bool },
}

/// Processes an event, mutates application state, and returns whether to
/// re-render along with the actions to execute.
///
/// # Errors
///
/// Reserved for failures of state transitions; none of the current
/// transitions fail.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::KeyDown => Ok((move_cursor(state, 1), vec![])),
        Event::KeyUp => Ok((move_cursor(state, -1), vec![])),
        Event::CloseFocus => Ok((false, vec![Action::CloseFocus])),

        Event::AddSection => {
            state.document.add_section();
            state.selected_index = state.document.len() - 1;
            Ok((true, vec![]))
        }
        Event::RemoveSection => {
            let Some(id) = state.selected_section_id() else {
                return Ok((false, vec![]));
            };
            state.document.remove_section(id);
            drop_uploads_for(state, id);
            state.clamp_selection();
            Ok((true, vec![]))
        }
        Event::ToggleCollapse => {
            let Some(id) = state.selected_section_id() else {
                return Ok((false, vec![]));
            };
            Ok((state.document.toggle_collapse(id), vec![]))
        }
        Event::MoveSection { offset } => {
            let Some(id) = state.selected_section_id() else {
                return Ok((false, vec![]));
            };
            if !state.document.move_section(id, *offset) {
                return Ok((false, vec![]));
            }
            if let Some(position) = state.document.position(id) {
                state.selected_index = position;
            }
            Ok((true, vec![]))
        }
        Event::GrabSection => {
            if state.selected_section().is_none() {
                return Ok((false, vec![]));
            }
            state.input_mode = InputMode::Moving {
                from: state.selected_index,
            };
            Ok((true, vec![]))
        }
        Event::SectionDragEnd { source, destination } => {
            state.input_mode = InputMode::Normal;
            if state.document.reorder_sections(*source, *destination) {
                if let Some(to) = destination {
                    state.selected_index = *to;
                }
            }
            Ok((true, vec![]))
        }

        Event::EditField(target) => {
            let Some(section) = state.selected_section() else {
                return Ok((false, vec![]));
            };
            let current = match target {
                EditTarget::Title => section.title.clone(),
                EditTarget::Algorithm => section.algorithm.clone(),
                EditTarget::Code => section.code.content.clone(),
            };
            state.edit_buffer = current;
            state.input_mode = InputMode::Editing(*target);
            Ok((true, vec![]))
        }
        Event::CycleLanguage => {
            let Some(section) = state.selected_section() else {
                return Ok((false, vec![]));
            };
            let (id, language) = (section.id, section.code.language.next());
            state.document.update_field(id, SectionUpdate::Language(language));
            Ok((true, vec![]))
        }

        Event::StartUpload(field) => {
            if state.selected_section().is_none() {
                return Ok((false, vec![]));
            }
            state.edit_buffer.clear();
            state.input_mode = InputMode::PathPrompt(*field);
            Ok((true, vec![]))
        }
        Event::ManageImages(field) => {
            if state.selected_section().is_none() {
                return Ok((false, vec![]));
            }
            state.image_index = 0;
            state.input_mode = InputMode::Images(*field);
            Ok((true, vec![]))
        }
        Event::MoveImage { offset } => {
            let InputMode::Images(field) = state.input_mode else {
                return Ok((false, vec![]));
            };
            let Some(id) = state.selected_section_id() else {
                return Ok((false, vec![]));
            };
            let count = state.selected_image_count(field);
            let from = state.image_index;
            let to = from.checked_add_signed(*offset).filter(|to| *to < count);
            if !state.document.reorder_images(id, field, from, to) {
                return Ok((false, vec![]));
            }
            if let Some(to) = to {
                state.image_index = to;
            }
            Ok((true, vec![]))
        }
        Event::RemoveImage => {
            let InputMode::Images(field) = state.input_mode else {
                return Ok((false, vec![]));
            };
            let Some(section) = state.selected_section() else {
                return Ok((false, vec![]));
            };
            let Some(image) = section.images(field).get(state.image_index) else {
                return Ok((false, vec![]));
            };
            let (id, image_id) = (section.id, image.id);
            state.document.remove_image(id, image_id, field);
            state.clamp_image_index(field);
            Ok((true, vec![]))
        }

        Event::Export => {
            let content = generate_document(state.document.sections());
            tracing::debug!(
                sections = state.document.len(),
                bytes = content.len(),
                path = %state.export_path.display(),
                "exporting document"
            );
            Ok((
                false,
                vec![Action::WriteExport {
                    path: state.export_path.clone(),
                    content,
                }],
            ))
        }

        Event::SearchMode => {
            tracing::debug!("entering search mode");
            state.input_mode = InputMode::Search(SearchFocus::Typing);
            state.search_query.clear();
            state.search_index = 0;
            state.apply_search_filter();
            Ok((true, vec![]))
        }
        Event::FocusSearchBar => {
            state.input_mode = InputMode::Search(SearchFocus::Typing);
            Ok((true, vec![]))
        }
        Event::FocusResults => {
            if state.search_query.is_empty() {
                exit_search(state);
            } else {
                state.input_mode = InputMode::Search(SearchFocus::Navigating);
            }
            Ok((true, vec![]))
        }

        Event::Char(c) => match state.input_mode {
            InputMode::Search(_) => {
                state.search_query.push(*c);
                tracing::trace!(query = %state.search_query, char = %c, "search query updated");
                state.search_index = 0;
                state.apply_search_filter();
                Ok((true, vec![]))
            }
            InputMode::Editing(_) | InputMode::PathPrompt(_) => {
                state.edit_buffer.push(*c);
                Ok((true, vec![]))
            }
            InputMode::Normal | InputMode::Images(_) | InputMode::Moving { .. } => Ok((false, vec![])),
        },
        Event::Backspace => match state.input_mode {
            InputMode::Search(_) => {
                state.search_query.pop();
                state.apply_search_filter();
                Ok((true, vec![]))
            }
            InputMode::Editing(_) | InputMode::PathPrompt(_) => {
                state.edit_buffer.pop();
                Ok((true, vec![]))
            }
            InputMode::Normal | InputMode::Images(_) | InputMode::Moving { .. } => Ok((false, vec![])),
        },
        Event::Confirm => match state.input_mode {
            InputMode::Search(_) => {
                if let Some(target) = state.search_target() {
                    state.selected_index = target;
                }
                exit_search(state);
                Ok((true, vec![]))
            }
            InputMode::Editing(target) if target.is_multiline() => {
                state.edit_buffer.push('\n');
                Ok((true, vec![]))
            }
            InputMode::Editing(target) => {
                commit_edit(state, target);
                Ok((true, vec![]))
            }
            InputMode::PathPrompt(field) => {
                let files = parse_paths(&state.edit_buffer);
                state.edit_buffer.clear();
                state.input_mode = InputMode::Normal;
                let actions = match state.selected_section_id() {
                    Some(id) => enqueue_upload(state, id, field, files),
                    None => vec![],
                };
                Ok((true, actions))
            }
            InputMode::Moving { from } => {
                let drag_end = Event::SectionDragEnd {
                    source: from,
                    destination: Some(state.selected_index),
                };
                handle_event(state, &drag_end)
            }
            InputMode::Normal | InputMode::Images(_) => Ok((false, vec![])),
        },
        Event::Escape => {
            match state.input_mode {
                InputMode::Normal => return Ok((false, vec![])),
                InputMode::Search(_) => exit_search(state),
                InputMode::Editing(target) => commit_edit(state, target),
                InputMode::PathPrompt(_) => state.edit_buffer.clear(),
                InputMode::Images(_) => {}
                InputMode::Moving { from } => state.selected_index = from,
            }
            state.input_mode = InputMode::Normal;
            Ok((true, vec![]))
        }

        Event::UploadFinished {
            section_id,
            file,
            result,
        } => Ok(finish_upload(state, *section_id, file, result)),

        Event::ExportFinished { path, success } => {
            let shown = strip_host_prefix(&path.display().to_string());
            if *success {
                state.set_status(format!("Exported to {shown}"), false);
            } else {
                state.set_status(format!("Export to {shown} failed"), true);
            }
            Ok((true, vec![]))
        }

        Event::PermissionResult { granted } => {
            state.web_access = if *granted { WebAccess::Granted } else { WebAccess::Denied };
            if *granted {
                tracing::debug!("permissions granted");
                Ok((false, vec![]))
            } else {
                tracing::warn!("permissions denied, uploads will fail");
                state.set_status("Web access denied: uploads are disabled".to_string(), true);
                Ok((true, vec![]))
            }
        }
    }
}

/// Moves whichever cursor the current mode uses. Returns whether anything
/// visible changed.
fn move_cursor(state: &mut AppState, direction: i8) -> bool {
    match state.input_mode {
        InputMode::Normal | InputMode::Moving { .. } => {
            if direction > 0 {
                state.move_selection_down();
            } else {
                state.move_selection_up();
            }
            true
        }
        InputMode::Search(_) => {
            if direction > 0 {
                state.move_search_cursor_down();
            } else {
                state.move_search_cursor_up();
            }
            true
        }
        InputMode::Images(field) => {
            if direction > 0 {
                state.move_image_cursor_down(field);
            } else {
                state.move_image_cursor_up(field);
            }
            true
        }
        InputMode::Editing(_) | InputMode::PathPrompt(_) => false,
    }
}

fn exit_search(state: &mut AppState) {
    tracing::debug!(query = %state.search_query, "exiting search mode");
    state.input_mode = InputMode::Normal;
    state.search_query.clear();
    state.search_index = 0;
    state.apply_search_filter();
}

/// Writes the prompt buffer into the edited field and leaves editing mode.
fn commit_edit(state: &mut AppState, target: EditTarget) {
    let text = std::mem::take(&mut state.edit_buffer);
    state.input_mode = InputMode::Normal;
    let Some(id) = state.selected_section_id() else {
        return;
    };
    let update = match target {
        EditTarget::Title => SectionUpdate::Title(text),
        EditTarget::Algorithm => SectionUpdate::Algorithm(text),
        EditTarget::Code => SectionUpdate::Code(text),
    };
    state.document.update_field(id, update);
}

/// Splits prompt input into file paths; commas and line breaks separate
/// entries and blanks are skipped.
fn parse_paths(input: &str) -> Vec<String> {
    input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Queues a batch and starts it if nothing else is running.
fn enqueue_upload(state: &mut AppState, id: SectionId, field: ImageField, files: Vec<String>) -> Vec<Action> {
    let Some(batch) = UploadBatch::new(id, field, files) else {
        return vec![];
    };
    tracing::debug!(section_id = %id, files = batch.total(), queued = state.uploads.len(), "upload batch queued");
    state.uploads.push_back(batch);
    if state.uploads.len() == 1 {
        start_next_batch(state)
    } else {
        vec![]
    }
}

/// Starts the front batch, discarding batches whose section is gone.
fn start_next_batch(state: &mut AppState) -> Vec<Action> {
    while let Some(batch) = state.uploads.front_mut() {
        if let Some(task) = batch.begin(&mut state.document) {
            return issue(state, task);
        }
        state.uploads.pop_front();
    }
    vec![]
}

/// Hands the in-flight task to the shim, or fails it on the spot when the
/// host would drop the request.
fn issue(state: &mut AppState, task: UploadTask) -> Vec<Action> {
    if state.web_access == WebAccess::Granted {
        return vec![Action::Upload(task)];
    }
    let error = UploadError::Transport(format!("web access not granted ({})", state.web_access));
    finish_upload(state, task.section_id, &task.file, &Err(error)).1
}

/// Forgets queued batches for a removed section. A batch already running
/// for it only loses its pending files; its in-flight answer still has to
/// arrive before the queue moves on.
fn drop_uploads_for(state: &mut AppState, id: SectionId) {
    let mut uploads = std::mem::take(&mut state.uploads).into_iter();
    if let Some(mut running) = uploads.next() {
        if running.section_id() == id {
            running.truncate();
        }
        state.uploads.push_back(running);
    }
    state.uploads.extend(uploads.filter(|batch| batch.section_id() != id));
}

fn finish_upload(
    state: &mut AppState,
    section_id: SectionId,
    file: &str,
    result: &std::result::Result<String, UploadError>,
) -> (bool, Vec<Action>) {
    let Some(batch) = state.uploads.front_mut() else {
        tracing::debug!(file, "upload result without a running batch, ignoring");
        return (false, vec![]);
    };
    let expected = batch
        .in_flight()
        .is_some_and(|task| task.section_id == section_id && task.file == file);
    if !expected {
        tracing::debug!(file, "upload result does not match the in-flight task, ignoring");
        return (false, vec![]);
    }

    let field = batch.field();
    let step = match result {
        Ok(url) => batch.record_success(&mut state.document, url.clone()),
        Err(error) => {
            let step = batch.record_failure(&mut state.document, error);
            state.last_upload_failure = Some(UploadFailure {
                section_id,
                file: file.to_string(),
                error: error.clone(),
                at: chrono::Utc::now(),
            });
            state.set_status(format!("Upload of {file} failed: {error}"), true);
            step
        }
    };

    let finished = matches!(step, BatchStep::Finished { .. });
    match step {
        BatchStep::Next(task) => (true, issue(state, task)),
        BatchStep::Finished { uploaded } | BatchStep::Stopped { uploaded } => {
            if finished {
                let noun = if uploaded == 1 { "image" } else { "images" };
                state.set_status(format!("Uploaded {uploaded} {noun} to {}", field.label()), false);
            }
            tracing::info!(uploaded, field = ?field, finished, "upload batch done");
            state.uploads.pop_front();
            (true, start_next_batch(state))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Language;
    use crate::ui::theme::Theme;
    use crate::upload::UploadTask;

    fn new_state() -> AppState {
        let mut state = AppState::new(Theme::default(), PathBuf::from("/host/dsa.md"));
        send(&mut state, Event::PermissionResult { granted: true });
        state
    }

    fn send(state: &mut AppState, event: Event) -> (bool, Vec<Action>) {
        handle_event(state, &event).unwrap()
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                send(state, Event::Confirm);
            } else {
                send(state, Event::Char(c));
            }
        }
    }

    fn upload_task(actions: &[Action]) -> UploadTask {
        match actions {
            [Action::Upload(task)] => task.clone(),
            other => panic!("expected one upload action, got {other:?}"),
        }
    }

    fn finish(state: &mut AppState, task: &UploadTask, result: std::result::Result<String, UploadError>) -> Vec<Action> {
        send(
            state,
            Event::UploadFinished {
                section_id: task.section_id,
                file: task.file.clone(),
                result,
            },
        )
        .1
    }

    fn with_sections(count: usize) -> AppState {
        let mut state = new_state();
        for _ in 0..count {
            send(&mut state, Event::AddSection);
        }
        state
    }

    #[test]
    fn add_section_selects_it() {
        let mut state = with_sections(2);
        assert_eq!(state.document.len(), 2);
        assert_eq!(state.selected_index, 1);
    }

    #[test]
    fn remove_section_clamps_cursor() {
        let mut state = with_sections(2);
        send(&mut state, Event::RemoveSection);
        assert_eq!(state.document.len(), 1);
        assert_eq!(state.selected_index, 0);

        send(&mut state, Event::RemoveSection);
        assert!(state.document.is_empty());
        assert_eq!(send(&mut state, Event::RemoveSection), (false, vec![]));
    }

    #[test]
    fn editing_title_saves_on_enter() {
        let mut state = with_sections(1);
        send(&mut state, Event::EditField(EditTarget::Title));
        type_text(&mut state, "Intro");
        send(&mut state, Event::Confirm);

        assert_eq!(state.input_mode, InputMode::Normal);
        assert_eq!(state.document.get(0).unwrap().title, "Intro");
        assert!(state.edit_buffer.is_empty());
    }

    #[test]
    fn code_accepts_line_breaks_and_saves_on_escape() {
        let mut state = with_sections(1);
        send(&mut state, Event::EditField(EditTarget::Code));
        type_text(&mut state, "int x;\nreturn x;");
        send(&mut state, Event::Escape);

        assert_eq!(state.document.get(0).unwrap().code.content, "int x;\nreturn x;");
    }

    #[test]
    fn editing_starts_from_current_value() {
        let mut state = with_sections(1);
        send(&mut state, Event::EditField(EditTarget::Algorithm));
        type_text(&mut state, "abc");
        send(&mut state, Event::Escape);

        send(&mut state, Event::EditField(EditTarget::Algorithm));
        assert_eq!(state.edit_buffer, "abc");
        send(&mut state, Event::Backspace);
        send(&mut state, Event::Escape);
        assert_eq!(state.document.get(0).unwrap().algorithm, "ab");
    }

    #[test]
    fn cycle_language_alternates() {
        let mut state = with_sections(1);
        send(&mut state, Event::CycleLanguage);
        assert_eq!(state.document.get(0).unwrap().code.language, Language::C);
        send(&mut state, Event::CycleLanguage);
        assert_eq!(state.document.get(0).unwrap().code.language, Language::Cpp);
    }

    #[test]
    fn grab_and_drop_reorders() {
        let mut state = with_sections(3);
        let ids: Vec<SectionId> = state.document.sections().iter().map(|s| s.id).collect();
        state.selected_index = 0;

        send(&mut state, Event::GrabSection);
        assert_eq!(state.input_mode, InputMode::Moving { from: 0 });
        send(&mut state, Event::KeyDown);
        send(&mut state, Event::KeyDown);
        send(&mut state, Event::Confirm);

        let order: Vec<SectionId> = state.document.sections().iter().map(|s| s.id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
        assert_eq!(state.selected_index, 2);
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn cancelled_grab_leaves_order() {
        let mut state = with_sections(3);
        let before = state.document.clone();
        state.selected_index = 1;

        send(&mut state, Event::GrabSection);
        send(&mut state, Event::KeyUp);
        send(&mut state, Event::Escape);

        assert_eq!(state.document, before);
        assert_eq!(state.selected_index, 1);
    }

    #[test]
    fn drag_without_destination_is_noop() {
        let mut state = with_sections(3);
        let before = state.document.clone();
        send(&mut state, Event::SectionDragEnd { source: 0, destination: None });
        assert_eq!(state.document, before);
    }

    #[test]
    fn move_section_follows_selection() {
        let mut state = with_sections(2);
        let moved = state.selected_section_id().unwrap();

        send(&mut state, Event::MoveSection { offset: -1 });
        assert_eq!(state.document.get(0).unwrap().id, moved);
        assert_eq!(state.selected_index, 0);

        assert_eq!(send(&mut state, Event::MoveSection { offset: -1 }), (false, vec![]));
    }

    #[test]
    fn export_renders_current_document() {
        let mut state = with_sections(1);
        send(&mut state, Event::EditField(EditTarget::Title));
        type_text(&mut state, "Intro\n");

        let (_, actions) = send(&mut state, Event::Export);
        let [Action::WriteExport { path, content }] = actions.as_slice() else {
            panic!("expected export action, got {actions:?}");
        };
        assert_eq!(path, &PathBuf::from("/host/dsa.md"));
        assert!(content.starts_with("# Intro\n\n1. Algorithm:\n"));

        send(&mut state, Event::ExportFinished { path: path.clone(), success: true });
        let status = state.status.as_ref().unwrap();
        assert!(!status.is_error);
        assert_eq!(status.text, "Exported to ~/dsa.md");
    }

    #[test]
    fn uploads_run_one_at_a_time_in_order() {
        let mut state = with_sections(1);
        let id = state.selected_section_id().unwrap();

        send(&mut state, Event::StartUpload(ImageField::Output));
        type_text(&mut state, " a.png, b.png ,c.png");
        let (_, actions) = send(&mut state, Event::Confirm);

        let first = upload_task(&actions);
        assert_eq!(first.file, "a.png");
        assert_eq!(state.document.section(id).unwrap().upload_progress, Some(0.0));

        let second = upload_task(&finish(&mut state, &first, Ok("u/a".to_string())));
        assert_eq!(second.file, "b.png");
        let third = upload_task(&finish(&mut state, &second, Ok("u/b".to_string())));
        assert_eq!(third.file, "c.png");
        assert!(finish(&mut state, &third, Ok("u/c".to_string())).is_empty());

        let section = state.document.section(id).unwrap();
        let urls: Vec<&str> = section.output.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["u/a", "u/b", "u/c"]);
        assert!(section.upload_progress.is_none());
        assert!(state.uploads.is_empty());
        assert_eq!(state.status.as_ref().unwrap().text, "Uploaded 3 images to Output");
    }

    #[test]
    fn failed_upload_stops_batch_and_is_recorded() {
        let mut state = with_sections(1);
        send(&mut state, Event::StartUpload(ImageField::ProblemSolving));
        type_text(&mut state, "a,b,c");
        let first = upload_task(&send(&mut state, Event::Confirm).1);
        let second = upload_task(&finish(&mut state, &first, Ok("u/a".to_string())));

        let actions = finish(&mut state, &second, Err(UploadError::Status { status: 400, message: "bad".to_string() }));

        assert!(actions.is_empty());
        let section = state.document.get(0).unwrap();
        assert_eq!(section.problem_solving.len(), 1);
        assert!(section.upload_progress.is_none());
        let failure = state.last_upload_failure.as_ref().unwrap();
        assert_eq!(failure.file, "b");
        assert!(state.status.as_ref().unwrap().is_error);
        assert!(state.uploads.is_empty());
    }

    #[test]
    fn uploads_fail_fast_without_web_access() {
        let mut state = AppState::new(Theme::default(), PathBuf::from("/host/dsa.md"));
        send(&mut state, Event::AddSection);
        send(&mut state, Event::AddSection);
        let first = state.document.get(0).unwrap().id;

        for index in [0, 1] {
            state.selected_index = index;
            send(&mut state, Event::StartUpload(ImageField::Output));
            type_text(&mut state, "a.png,b.png");
            let (_, actions) = send(&mut state, Event::Confirm);
            assert!(actions.is_empty());
        }

        assert!(state.uploads.is_empty());
        assert!(state.document.sections().iter().all(|s| s.upload_progress.is_none() && s.output.is_empty()));
        let failure = state.last_upload_failure.as_ref().unwrap();
        assert_eq!(failure.file, "a.png");
        assert!(matches!(failure.error, UploadError::Transport(_)));
        assert!(state.status.as_ref().unwrap().is_error);

        send(&mut state, Event::PermissionResult { granted: false });
        state.selected_index = 0;
        send(&mut state, Event::StartUpload(ImageField::ProblemSolving));
        type_text(&mut state, "c.png");
        assert!(send(&mut state, Event::Confirm).1.is_empty());
        assert_eq!(state.last_upload_failure.as_ref().unwrap().section_id, first);

        send(&mut state, Event::PermissionResult { granted: true });
        send(&mut state, Event::StartUpload(ImageField::ProblemSolving));
        type_text(&mut state, "c.png");
        let task = upload_task(&send(&mut state, Event::Confirm).1);
        assert_eq!(task.file, "c.png");
    }

    #[test]
    fn denied_permission_is_shown() {
        let mut state = new_state();
        let (render, actions) = send(&mut state, Event::PermissionResult { granted: false });
        assert!(render);
        assert!(actions.is_empty());
        assert_eq!(state.web_access, WebAccess::Denied);
        assert!(state.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn second_batch_waits_for_first() {
        let mut state = with_sections(2);
        state.selected_index = 0;
        send(&mut state, Event::StartUpload(ImageField::Output));
        type_text(&mut state, "a");
        let first = upload_task(&send(&mut state, Event::Confirm).1);

        state.selected_index = 1;
        send(&mut state, Event::StartUpload(ImageField::Output));
        type_text(&mut state, "b");
        let (_, actions) = send(&mut state, Event::Confirm);
        assert!(actions.is_empty());
        assert_eq!(state.uploads.len(), 2);

        let next = upload_task(&finish(&mut state, &first, Ok("u/a".to_string())));
        assert_eq!(next.file, "b");
        assert_eq!(next.section_id, state.document.get(1).unwrap().id);
    }

    #[test]
    fn removing_section_mid_batch_drops_remaining_files() {
        let mut state = with_sections(1);
        send(&mut state, Event::StartUpload(ImageField::Output));
        type_text(&mut state, "a,b");
        let first = upload_task(&send(&mut state, Event::Confirm).1);

        send(&mut state, Event::RemoveSection);
        let actions = finish(&mut state, &first, Ok("u/a".to_string()));

        assert!(actions.is_empty());
        assert!(state.uploads.is_empty());
        assert!(state.document.is_empty());
    }

    #[test]
    fn stale_upload_result_is_ignored() {
        let mut state = with_sections(1);
        let task = UploadTask {
            section_id: state.selected_section_id().unwrap(),
            field: ImageField::Output,
            file: "ghost.png".to_string(),
            index: 0,
            total: 1,
        };
        assert!(finish(&mut state, &task, Ok("u".to_string())).is_empty());
        assert!(state.document.get(0).unwrap().output.is_empty());
    }

    #[test]
    fn blank_path_prompt_uploads_nothing() {
        let mut state = with_sections(1);
        send(&mut state, Event::StartUpload(ImageField::Output));
        type_text(&mut state, " , ");
        let (_, actions) = send(&mut state, Event::Confirm);
        assert!(actions.is_empty());
        assert!(state.uploads.is_empty());
        assert!(state.document.get(0).unwrap().upload_progress.is_none());
    }

    #[test]
    fn gallery_reorder_and_delete() {
        let mut state = with_sections(1);
        let id = state.selected_section_id().unwrap();
        for url in ["x", "y", "z"] {
            state.document.append_image(id, ImageField::Output, crate::domain::Image::new(url));
        }

        send(&mut state, Event::ManageImages(ImageField::Output));
        send(&mut state, Event::MoveImage { offset: 1 });
        assert_eq!(state.image_index, 1);
        let urls: Vec<String> = state.document.section(id).unwrap().output.iter().map(|i| i.url.clone()).collect();
        assert_eq!(urls, vec!["y", "x", "z"]);

        send(&mut state, Event::KeyDown);
        send(&mut state, Event::RemoveImage);
        let urls: Vec<String> = state.document.section(id).unwrap().output.iter().map(|i| i.url.clone()).collect();
        assert_eq!(urls, vec!["y", "x"]);
        assert_eq!(state.image_index, 1);

        assert_eq!(send(&mut state, Event::MoveImage { offset: 1 }), (false, vec![]));
        send(&mut state, Event::Escape);
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn search_jumps_to_match() {
        let mut state = with_sections(3);
        for (index, title) in ["Binary Search", "Merge Sort", "Heap"].iter().enumerate() {
            let id = state.document.get(index).unwrap().id;
            state.document.update_field(id, SectionUpdate::Title((*title).to_string()));
        }
        state.selected_index = 0;

        send(&mut state, Event::SearchMode);
        type_text(&mut state, "merge");
        assert_eq!(state.search_results, vec![1]);
        send(&mut state, Event::Confirm);

        assert_eq!(state.selected_index, 1);
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.search_query.is_empty());
    }

    #[test]
    fn chars_in_normal_mode_are_ignored() {
        let mut state = with_sections(1);
        let before = state.document.clone();
        assert_eq!(send(&mut state, Event::Char('x')), (false, vec![]));
        assert_eq!(state.document, before);
    }

    #[test]
    fn paths_split_on_commas_and_newlines() {
        assert_eq!(parse_paths("a.png, ~/b.png\n c.png,,"), vec!["a.png", "~/b.png", "c.png"]);
        assert!(parse_paths("  ").is_empty());
    }

    #[test]
    fn close_focus_emits_action() {
        let mut state = new_state();
        assert_eq!(send(&mut state, Event::CloseFocus), (false, vec![Action::CloseFocus]));
    }
}
