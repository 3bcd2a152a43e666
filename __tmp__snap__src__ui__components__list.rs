//! Section list renderer.
//!
//! Two columns: the label (section heading, field name or image number) in
//! a fixed 37-cell column, then the detail text. Detail and image rows are
//! indented under their section.

use crate::ui::helpers::{self, display_width, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{DisplayRow, RowKind};

/// Width of the label column, including the gap before the detail.
const LABEL_COLUMN: usize = 37;

/// Renders every row starting at `row`. Returns the next free row.
pub fn render_list_rows(row: usize, rows: &[DisplayRow], theme: &Theme, cols: usize) -> usize {
    let mut current_row = row;
    for item in rows {
        current_row = render_list_row(current_row, item, theme, cols);
    }
    current_row
}

/// Leading spaces for each row kind.
const fn indent(kind: RowKind) -> usize {
    match kind {
        RowKind::Section => 0,
        RowKind::Detail => 4,
        RowKind::Image => 6,
    }
}

/// Right-aligned progress tag, e.g. ` 50%`.
#[must_use]
pub fn progress_label(progress: f64) -> String {
    format!("{:>3.0}%", progress.clamp(0.0, 100.0))
}

/// Renders one row padded to the full width.
///
/// Styling precedence: selection background, then the moving marker, then
/// match highlights, then normal or dimmed text.
fn render_list_row(row: usize, item: &DisplayRow, theme: &Theme, cols: usize) -> usize {
    position_cursor(row, 1);

    let base_fg = match item.kind {
        RowKind::Section => &theme.colors.text_normal,
        RowKind::Detail | RowKind::Image => &theme.colors.text_dim,
    };

    if item.is_selected {
        print!("{}", Theme::fg(&theme.colors.selection_fg));
        print!("{}", Theme::bg(&theme.colors.selection_bg));
    } else if item.is_marked {
        print!("{}", Theme::bold());
        print!("{}", Theme::fg(&theme.colors.drop_target_fg));
    } else {
        print!("{}", Theme::fg(base_fg));
    }

    let pad = indent(item.kind);
    print!("{}", " ".repeat(pad));
    helpers::render_highlighted_text(&item.label, &item.highlight_ranges, theme, item.is_selected || item.is_marked);

    let label_width = pad + display_width(&item.label);
    print!("{}", " ".repeat(LABEL_COLUMN.saturating_sub(label_width)));
    print!("{}", item.detail);
    let mut used = LABEL_COLUMN.max(label_width) + display_width(&item.detail);

    if let Some(progress) = item.progress {
        let tag = format!("  {}", progress_label(progress));
        if !item.is_selected {
            print!("{}", Theme::fg(&theme.colors.progress_fg));
        }
        print!("{tag}");
        used += display_width(&tag);
    }

    print!("{}", " ".repeat(cols.saturating_sub(used)));
    print!("{}", Theme::reset());
    row + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_rounded_and_clamped() {
        assert_eq!(progress_label(0.0), "  0%");
        assert_eq!(progress_label(33.333), " 33%");
        assert_eq!(progress_label(100.0), "100%");
        assert_eq!(progress_label(140.0), "100%");
    }

    #[test]
    fn nested_rows_are_indented() {
        assert!(indent(RowKind::Section) < indent(RowKind::Detail));
        assert!(indent(RowKind::Detail) < indent(RowKind::Image));
    }
}


