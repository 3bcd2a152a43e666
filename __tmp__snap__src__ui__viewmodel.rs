//! View model types representing renderable UI state.
//!
//! Computed by `AppState::compute_viewmodel()` and consumed by the renderer.
//! They carry display-ready text only; no document data leaks into
//! rendering.

/// Complete UI view model for rendering.
#[derive(Debug, Clone)]
pub struct UIViewModel {
    /// Visible window of list rows.
    pub rows: Vec<DisplayRow>,

    /// Header information (title and section count).
    pub header: HeaderInfo,

    /// Footer information (keybindings for the current mode).
    pub footer: FooterInfo,

    /// Prompt box shown while editing, entering paths or searching.
    pub prompt: Option<PromptInfo>,

    /// One-line result of the last export or upload.
    pub status: Option<StatusInfo>,

    /// Shown instead of the list when there is nothing to list.
    pub empty_state: Option<EmptyState>,
}

/// What a list row represents; drives indentation and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A section heading line.
    Section,
    /// A field summary under an expanded section.
    Detail,
    /// One image of the gallery being managed.
    Image,
}

/// One line of the section list.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub kind: RowKind,

    /// Left column text (already truncated).
    pub label: String,

    /// Right column text (already truncated).
    pub detail: String,

    /// Whether the cursor is on this row.
    pub is_selected: bool,

    /// Whether this is the section currently picked up for moving.
    pub is_marked: bool,

    /// Upload progress of the section, shown on section rows.
    pub progress: Option<f64>,

    /// Character ranges of `label` matched by the search query.
    pub highlight_ranges: Vec<(usize, usize)>,
}

/// Header display information.
#[derive(Debug, Clone)]
pub struct HeaderInfo {
    pub title: String,
}

/// Footer display information.
#[derive(Debug, Clone)]
pub struct FooterInfo {
    pub keybindings: String,
}

/// Empty state message display information.
#[derive(Debug, Clone)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

/// Prompt box contents.
#[derive(Debug, Clone)]
pub struct PromptInfo {
    /// Label before the text, e.g. `Title` or `Search`.
    pub label: String,
    /// Current text; line breaks are shown as `⏎`.
    pub text: String,
}

/// Status line contents.
#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub message: String,
    pub is_error: bool,
}


