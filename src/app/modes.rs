//! Input mode state types for the application.
//!
//! The mode decides how the plugin shim maps raw keys to events and how the
//! handler interprets the generic ones (`Char`, `Confirm`, `Escape`, cursor
//! movement).
//!
//! # State Machine
//!
//! ```text
//!            ┌──── / ────► Search(Typing) ◄─ / ─► Search(Navigating)
//!            │
//! Normal ────┼──── t/a/c ─► Editing(target) ── Esc ──► Normal
//!            ├──── p/o ───► PathPrompt(field) ─ Enter ─► Normal (+ upload)
//!            ├──── P/O ───► Images(field) ───── Esc ──► Normal
//!            └──── m ─────► Moving { from } ─ Enter/Esc ─► Normal
//! ```

use crate::domain::ImageField;

/// Focus state within search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    /// Characters go into the query.
    Typing,
    /// Cursor keys move through the matches.
    Navigating,
}

/// Section field being edited in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Title,
    Algorithm,
    Code,
}

impl EditTarget {
    /// Whether `Enter` inserts a line break instead of saving.
    #[must_use]
    pub const fn is_multiline(self) -> bool {
        !matches!(self, Self::Title)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Algorithm => "Algorithm",
            Self::Code => "Code",
        }
    }
}

/// Current input handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigation and single-key commands.
    Normal,

    /// Fuzzy search over section titles.
    Search(SearchFocus),

    /// Editing one text field of the selected section.
    Editing(EditTarget),

    /// Typing the files to upload into one gallery of the selected section.
    PathPrompt(ImageField),

    /// Browsing one gallery of the selected section to reorder or delete.
    Images(ImageField),

    /// A section has been picked up and is waiting to be dropped.
    ///
    /// `from` is its index at pick-up time; the selection cursor marks the
    /// drop target.
    Moving { from: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_title_is_single_line() {
        assert!(!EditTarget::Title.is_multiline());
        assert!(EditTarget::Algorithm.is_multiline());
        assert!(EditTarget::Code.is_multiline());
    }
}
