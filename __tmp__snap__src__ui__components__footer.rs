//! Footer and status line renderers.
//!
//! The footer lists the keys of the current mode; the status line above it
//! reports the outcome of the last export or upload batch.

use crate::ui::helpers::{display_width, position_cursor, print_centered};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{FooterInfo, StatusInfo};

/// Renders dimmed, centered keybinding hints. Text wider than the terminal
/// is cut at the right edge.
pub fn render_footer(row: usize, footer: &FooterInfo, theme: &Theme, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::fg(&theme.colors.text_dim));
    print_centered(&footer.keybindings, cols);
    print!("{}", Theme::reset());
    row + 1
}

/// Renders the status line, or clears it when there is nothing to report.
pub fn render_status(row: usize, status: Option<&StatusInfo>, theme: &Theme, cols: usize) -> usize {
    position_cursor(row, 1);

    let Some(status) = status else {
        print!("{}", " ".repeat(cols));
        return row + 1;
    };

    let color = if status.is_error {
        &theme.colors.error_fg
    } else {
        &theme.colors.text_normal
    };
    let text: String = format!(" {}", status.message).chars().take(cols).collect();

    print!("{}", Theme::fg(color));
    print!("{text}");
    print!("{}", " ".repeat(cols.saturating_sub(display_width(&text))));
    print!("{}", Theme::reset());
    row + 1
}


