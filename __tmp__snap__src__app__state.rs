//! Application state management and view model computation.
//!
//! [`AppState`] wraps the [`Document`] together with everything that only
//! exists for the interface: cursor positions, the input mode and its text
//! buffer, search results, the upload queue and the status line. It is owned
//! by the plugin shim and mutated only by [`handle_event`](super::handle_event).
//!
//! # View Model Computation
//!
//! `compute_viewmodel` flattens the document into list rows (section lines,
//! detail lines for expanded sections, image lines in gallery mode), keeps the
//! focused row centred in the available height, and truncates text to the
//! terminal width.

use super::modes::{InputMode, SearchFocus};
use crate::domain::{Document, ImageField, Section, SectionId, UploadError};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{
    DisplayRow, EmptyState, FooterInfo, HeaderInfo, PromptInfo, RowKind, StatusInfo, UIViewModel,
};
use crate::upload::UploadBatch;
use chrono::{DateTime, Utc};
use fuzzy_matcher::skim::SkimMatcherV2;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::path::PathBuf;

/// Width of the label column, including the trailing gap.
const LABEL_COLUMN_WIDTH: usize = 37;

/// Columns kept free at the right edge.
const SAFETY_MARGIN: usize = 2;

/// Record of the most recent failed upload, kept for display.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFailure {
    pub section_id: SectionId,
    pub file: String,
    pub error: UploadError,
    pub at: DateTime<Utc>,
}

/// Message shown on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Whether the host lets the plugin issue web requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WebAccess {
    /// The permission prompt has not been answered yet.
    #[default]
    Pending,
    Granted,
    Denied,
}

impl fmt::Display for WebAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "permission prompt not answered",
            Self::Granted => "granted",
            Self::Denied => "permission denied",
        })
    }
}

/// Central application state container.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The sections being assembled.
    pub document: Document,

    /// Index of the selected section. In `Moving` mode this is the drop
    /// target.
    pub selected_index: usize,

    /// Index of the selected image in `Images` mode.
    pub image_index: usize,

    /// Current input handling mode.
    pub input_mode: InputMode,

    /// Text being typed in `Editing` or `PathPrompt` mode.
    pub edit_buffer: String,

    /// Current search query string.
    pub search_query: String,

    /// Document indices of sections matching `search_query`, in document
    /// order.
    pub search_results: Vec<usize>,

    /// Cursor within `search_results`.
    pub search_index: usize,

    /// Upload batches; the front one is running, the rest wait their turn.
    pub uploads: VecDeque<UploadBatch>,

    /// Most recent failed upload.
    pub last_upload_failure: Option<UploadFailure>,

    /// Result of the last export or upload batch.
    pub status: Option<StatusMessage>,

    /// Host permission for web requests; uploads fail fast unless granted.
    pub web_access: WebAccess,

    /// Where exports are written.
    pub export_path: PathBuf,

    /// Color scheme for UI rendering.
    pub theme: Theme,
}

impl AppState {
    /// Creates a state with an empty document.
    #[must_use]
    pub fn new(theme: Theme, export_path: PathBuf) -> Self {
        Self {
            document: Document::new(),
            selected_index: 0,
            image_index: 0,
            input_mode: InputMode::Normal,
            edit_buffer: String::new(),
            search_query: String::new(),
            search_results: Vec::new(),
            search_index: 0,
            uploads: VecDeque::new(),
            last_upload_failure: None,
            status: None,
            web_access: WebAccess::Pending,
            export_path,
            theme,
        }
    }

    /// The section under the cursor.
    #[must_use]
    pub fn selected_section(&self) -> Option<&Section> {
        self.document.get(self.selected_index)
    }

    #[must_use]
    pub fn selected_section_id(&self) -> Option<SectionId> {
        self.selected_section().map(|s| s.id)
    }

    /// Moves selection cursor down by one position, wrapping to top if at end.
    pub fn move_selection_down(&mut self) {
        if self.document.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.document.len();
    }

    /// Moves selection cursor up by one position, wrapping to bottom if at start.
    pub fn move_selection_up(&mut self) {
        if self.document.is_empty() {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = self.document.len() - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Keeps the cursor on an existing section after removals.
    pub fn clamp_selection(&mut self) {
        self.selected_index = self
            .selected_index
            .min(self.document.len().saturating_sub(1));
    }

    /// Number of images in `field` of the selected section.
    #[must_use]
    pub fn selected_image_count(&self, field: ImageField) -> usize {
        self.selected_section().map_or(0, |s| s.images(field).len())
    }

    pub fn move_image_cursor_down(&mut self, field: ImageField) {
        let count = self.selected_image_count(field);
        if count > 0 {
            self.image_index = (self.image_index + 1) % count;
        }
    }

    pub fn move_image_cursor_up(&mut self, field: ImageField) {
        let count = self.selected_image_count(field);
        if count > 0 {
            self.image_index = if self.image_index == 0 { count - 1 } else { self.image_index - 1 };
        }
    }

    pub fn clamp_image_index(&mut self, field: ImageField) {
        self.image_index = self
            .image_index
            .min(self.selected_image_count(field).saturating_sub(1));
    }

    /// Replaces the status line.
    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
        });
    }

    /// Whether an upload batch is running.
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        !self.uploads.is_empty()
    }

    /// Recomputes `search_results` from the query.
    ///
    /// Every whitespace-separated token must fuzzy-match the lowercase title.
    /// An empty query matches every section.
    pub fn apply_search_filter(&mut self) {
        use fuzzy_matcher::FuzzyMatcher;

        let _span = tracing::debug_span!(
            "apply_search_filter",
            total_sections = self.document.len(),
            query_len = self.search_query.len()
        )
        .entered();

        let tokens: Vec<String> = self
            .search_query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let matcher = SkimMatcherV2::default();
        self.search_results = self
            .document
            .sections()
            .iter()
            .enumerate()
            .filter(|(_, section)| {
                let title = section.title.to_lowercase();
                tokens.iter().all(|token| matcher.fuzzy_match(&title, token).is_some())
            })
            .map(|(index, _)| index)
            .collect();

        self.search_index = self
            .search_index
            .min(self.search_results.len().saturating_sub(1));

        tracing::debug!(matches = self.search_results.len(), "search filter applied");
    }

    /// Document index of the highlighted search match.
    #[must_use]
    pub fn search_target(&self) -> Option<usize> {
        self.search_results.get(self.search_index).copied()
    }

    pub fn move_search_cursor_down(&mut self) {
        if !self.search_results.is_empty() {
            self.search_index = (self.search_index + 1) % self.search_results.len();
        }
    }

    pub fn move_search_cursor_up(&mut self) {
        if !self.search_results.is_empty() {
            self.search_index = if self.search_index == 0 {
                self.search_results.len() - 1
            } else {
                self.search_index - 1
            };
        }
    }

    /// Computes a renderable UI view model from current state and terminal
    /// dimensions.
    #[must_use]
    pub fn compute_viewmodel(&self, rows: usize, cols: usize) -> UIViewModel {
        let header = self.compute_header();
        let footer = self.compute_footer();
        let prompt = self.compute_prompt();
        let status = self.status.as_ref().map(|s| StatusInfo {
            message: s.text.clone(),
            is_error: s.is_error,
        });

        if self.document.is_empty() {
            return UIViewModel {
                rows: vec![],
                header,
                footer,
                prompt,
                status,
                empty_state: Some(EmptyState {
                    message: "No sections yet".to_string(),
                    subtitle: "Press n to add a section".to_string(),
                }),
            };
        }

        let (all_rows, focus) = self.build_rows(cols);
        let available_rows = self.calculate_available_rows(rows);
        let (start, end) = Self::visible_window(all_rows.len(), focus, available_rows);

        UIViewModel {
            rows: all_rows.into_iter().skip(start).take(end - start).collect(),
            header,
            footer,
            prompt,
            status,
            empty_state: None,
        }
    }

    /// Picks the `[start, end)` slice of `len` rows that keeps `focus` near the
    /// middle of `available` lines and fills the space when near either end.
    fn visible_window(len: usize, focus: usize, available: usize) -> (usize, usize) {
        let mut start = focus.saturating_sub(available / 2);
        let end = (start + available).min(len);

        if end - start < available && len >= available {
            start = end.saturating_sub(available);
        }

        (start.min(end), end)
    }

    /// Flattens the document into list rows and returns the focused row.
    fn build_rows(&self, cols: usize) -> (Vec<DisplayRow>, usize) {
        let in_search = matches!(self.input_mode, InputMode::Search(_));
        let matcher = (in_search && !self.search_query.is_empty()).then(SkimMatcherV2::default);
        let detail_width = cols.saturating_sub(LABEL_COLUMN_WIDTH + SAFETY_MARGIN);

        let indices: Vec<usize> = if in_search {
            self.search_results.clone()
        } else {
            (0..self.document.len()).collect()
        };

        let cursor = if in_search {
            self.search_target()
        } else {
            Some(self.selected_index)
        };

        let mut rows = Vec::new();
        let mut focus = 0;

        for index in indices {
            let Some(section) = self.document.get(index) else {
                continue;
            };
            let is_cursor = cursor == Some(index);
            let gallery = match self.input_mode {
                InputMode::Images(field) if is_cursor => Some(field),
                _ => None,
            };

            if is_cursor {
                focus = rows.len();
            }
            rows.push(self.section_row(index, section, is_cursor, detail_width, matcher.as_ref()));

            if in_search || (section.is_collapsed && gallery.is_none()) {
                continue;
            }

            rows.push(detail_row("Algorithm", first_line(&section.algorithm), detail_width));
            for field in [ImageField::ProblemSolving, ImageField::Output] {
                if field == ImageField::Output {
                    let code = format!("{}: {}", section.code.language, first_line(&section.code.content));
                    rows.push(detail_row("Code", &code, detail_width));
                }
                let count = section.images(field).len();
                rows.push(detail_row(field.label(), &image_count(count), detail_width));

                if gallery == Some(field) {
                    for (position, image) in section.images(field).iter().enumerate() {
                        let is_selected = position == self.image_index;
                        if is_selected {
                            focus = rows.len();
                        }
                        rows.push(DisplayRow {
                            kind: RowKind::Image,
                            label: truncate(&format!("{}.", position + 1), LABEL_COLUMN_WIDTH - 2),
                            detail: truncate(&image.url, detail_width),
                            is_selected,
                            is_marked: false,
                            progress: None,
                            highlight_ranges: vec![],
                        });
                    }
                }
            }
        }

        (rows, focus)
    }

    fn section_row(
        &self,
        index: usize,
        section: &Section,
        is_cursor: bool,
        detail_width: usize,
        matcher: Option<&SkimMatcherV2>,
    ) -> DisplayRow {
        let arrow = if section.is_collapsed { '▸' } else { '▾' };
        let title = if section.title.is_empty() { "(untitled)" } else { section.title.as_str() };
        let prefix = format!("{arrow} {}. ", index + 1);
        let label = truncate(&format!("{prefix}{title}"), LABEL_COLUMN_WIDTH - 2);

        let highlight_ranges = matcher.map_or_else(Vec::new, |m| {
            let offset = prefix.chars().count();
            let label_len = label.chars().count();
            self.compute_highlight_ranges(&section.title, m)
                .into_iter()
                .map(|(start, end)| (start + offset, end + offset))
                .filter(|(start, _)| *start < label_len)
                .map(|(start, end)| (start, end.min(label_len)))
                .collect()
        });

        let detail = format!(
            "{} · {} problem solving · {} output",
            section.code.language,
            section.problem_solving.len(),
            section.output.len()
        );

        DisplayRow {
            kind: RowKind::Section,
            label,
            detail: truncate(&detail, detail_width),
            is_selected: is_cursor && !matches!(self.input_mode, InputMode::Images(_)),
            is_marked: matches!(self.input_mode, InputMode::Moving { from } if from == index),
            progress: section.upload_progress,
            highlight_ranges,
        }
    }

    /// Computes character index ranges to highlight for fuzzy match
    /// visualization, coalescing consecutive indices.
    ///
    /// Each query token is matched on its own, the same way the filter
    /// matches, and the union of their indices is highlighted.
    fn compute_highlight_ranges(&self, text: &str, matcher: &SkimMatcherV2) -> Vec<(usize, usize)> {
        use fuzzy_matcher::FuzzyMatcher;

        let indices: BTreeSet<usize> = self
            .search_query
            .split_whitespace()
            .map(str::to_lowercase)
            .filter_map(|token| matcher.fuzzy_indices(text, &token))
            .flat_map(|(_score, indices)| indices)
            .collect();

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for idx in indices {
            match ranges.last_mut() {
                Some((_, end)) if *end == idx => *end = idx + 1,
                _ => ranges.push((idx, idx + 1)),
            }
        }
        ranges
    }

    fn compute_header(&self) -> HeaderInfo {
        let count = self.document.len();
        let noun = if count == 1 { "section" } else { "sections" };
        let uploading = self.uploads.front().map_or_else(String::new, |batch| {
            format!(" · uploading {}/{}", batch.completed(), batch.total())
        });
        HeaderInfo {
            title: format!(" DSA Notes ({count} {noun}){uploading} "),
        }
    }

    fn compute_footer(&self) -> FooterInfo {
        let keybindings = match self.input_mode {
            InputMode::Normal => {
                "j/k: navigate  n: new  D: delete  space: fold  J/K: move  m: grab  t/a/c: edit  l: lang  p/o: upload  P/O: images  e: export  /: search  q: quit"
            }
            InputMode::Search(SearchFocus::Typing) => "ESC: exit search  Enter: jump  Tab: results  Ctrl+n/p: navigate",
            InputMode::Search(SearchFocus::Navigating) => "ESC: exit search  /: edit query  j/k: navigate  Enter: jump",
            InputMode::Editing(target) if target.is_multiline() => "ESC: save  Enter: new line  Backspace: delete",
            InputMode::Editing(_) => "Enter/ESC: save  Backspace: delete",
            InputMode::PathPrompt(_) => "Enter: upload  ESC: cancel  Separate files with commas",
            InputMode::Images(_) => "j/k: navigate  J/K: move  d: delete  ESC: back",
            InputMode::Moving { .. } => "j/k: choose position  Enter: drop  ESC: cancel",
        };

        FooterInfo {
            keybindings: keybindings.to_string(),
        }
    }

    fn compute_prompt(&self) -> Option<PromptInfo> {
        let (label, text) = match self.input_mode {
            InputMode::Editing(target) => (target.label().to_string(), &self.edit_buffer),
            InputMode::PathPrompt(field) => (format!("Upload to {}", field.label()), &self.edit_buffer),
            InputMode::Search(_) => ("Search".to_string(), &self.search_query),
            InputMode::Normal | InputMode::Images(_) | InputMode::Moving { .. } => return None,
        };

        Some(PromptInfo {
            label,
            text: text.replace('\n', "⏎"),
        })
    }

    /// Rows left for the list after header, borders, status, footer and an
    /// optional 3-line prompt box.
    const fn calculate_available_rows(&self, total_rows: usize) -> usize {
        match self.input_mode {
            InputMode::Editing(_) | InputMode::PathPrompt(_) | InputMode::Search(_) => total_rows.saturating_sub(9),
            InputMode::Normal | InputMode::Images(_) | InputMode::Moving { .. } => total_rows.saturating_sub(6),
        }
    }
}

fn detail_row(label: &str, detail: &str, detail_width: usize) -> DisplayRow {
    DisplayRow {
        kind: RowKind::Detail,
        label: truncate(label, LABEL_COLUMN_WIDTH - 4),
        detail: truncate(detail, detail_width),
        is_selected: false,
        is_marked: false,
        progress: None,
        highlight_ranges: vec![],
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn image_count(count: usize) -> String {
    match count {
        0 => "no images".to_string(),
        1 => "1 image".to_string(),
        n => format!("{n} images"),
    }
}

/// Shortens `text` to at most `max` characters, ending in `...` when cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
