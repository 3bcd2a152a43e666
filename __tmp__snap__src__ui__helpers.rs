//! Shared rendering utilities.
//!
//! Text here is measured in characters, never bytes: section titles and image
//! URLs are arbitrary user input, and the chrome uses box-drawing glyphs.

use crate::ui::theme::Theme;

/// Moves the cursor to a 1-indexed row and column.
pub fn position_cursor(row: usize, col: usize) {
    print!("\u{1b}[{row};{col}H");
}

/// Visible width of `text` in terminal cells, counting one cell per char.
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.chars().count()
}

/// Prints `text` centered in `cols` cells, padding both sides.
pub fn print_centered(text: &str, cols: usize) {
    let width = display_width(text).min(cols);
    let left = cols.saturating_sub(width) / 2;
    let visible: String = text.chars().take(width).collect();

    print!("{}", " ".repeat(left));
    print!("{visible}");
    print!("{}", " ".repeat(cols.saturating_sub(left + width)));
}

/// Renders text with fuzzy-match ranges highlighted.
///
/// Ranges are `(start, end)` character indices, end exclusive, sorted and
/// non-overlapping. On a selected row the selection colors win and ranges
/// are ignored.
pub fn render_highlighted_text(text: &str, ranges: &[(usize, usize)], theme: &Theme, is_selected: bool) {
    if ranges.is_empty() || is_selected {
        print!("{text}");
        return;
    }

    let chars: Vec<char> = text.chars().collect();
    let mut current_pos = 0;

    for &(start, end) in ranges {
        let start = start.min(chars.len());
        let end = end.min(chars.len());
        if start < current_pos || start >= end {
            continue;
        }

        let plain: String = chars[current_pos..start].iter().collect();
        print!("{plain}");

        print!("{}", Theme::fg(&theme.colors.match_highlight_fg));
        print!("{}", Theme::bg(&theme.colors.match_highlight_bg));
        let highlighted: String = chars[start..end].iter().collect();
        print!("{highlighted}");
        print!("{}", Theme::reset());
        print!("{}", Theme::fg(&theme.colors.text_normal));

        current_pos = end;
    }

    if current_pos < chars.len() {
        let remaining: String = chars[current_pos..].iter().collect();
        print!("{remaining}");
    }
}

/// Keeps the end of `text` within `width` cells, marking the cut with `…`.
///
/// Used for prompt input so the caret position stays visible while typing.
#[must_use]
pub fn fit_tail(text: &str, width: usize) -> String {
    let len = display_width(text);
    if len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let keep = width - 1;
    let tail: String = text.chars().skip(len - keep).collect();
    format!("…{tail}")
}
