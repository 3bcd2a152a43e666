//! Composable UI component renderers.
//!
//! # Components
//!
//! - [`header`]: Title bar with section count and upload activity
//! - [`prompt`]: Boxed input line for editing, paths and search
//! - [`list`]: Sections with their field and image rows
//! - [`empty`]: Message for a document without sections
//! - [`footer`]: Status line and keybinding hints
//!
//! # Layout
//!
//! ```text
//! [blank line]
//! [Header]
//! [Border]
//! [Prompt - 3 lines, only while typing]
//! [List rows or empty state]
//! [Blank padding to fill screen]
//! [Status]
//! [Border]
//! [Footer]
//! ```
//!
//! Chrome takes 6 lines, 9 with the prompt; the view model sizes its row
//! window to match.

mod empty;
mod footer;
mod header;
mod list;
mod prompt;

pub use list::progress_label;

use crate::ui::helpers::position_cursor;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::UIViewModel;

use empty::render_empty_state;
use footer::{render_footer, render_status};
use header::render_header;
use list::render_list_rows;
use prompt::render_prompt;

/// Renders a horizontal border line. Returns the next free row.
fn render_border(row: usize, color: &str, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::fg(color));
    print!("{}", "─".repeat(cols));
    print!("{}", Theme::reset());
    row + 1
}

/// Renders the full screen for one view model.
pub fn render_layout(vm: &UIViewModel, theme: &Theme, cols: usize, rows: usize) {
    let mut current_row = 2;

    current_row = render_header(current_row, &vm.header, theme, cols);
    current_row = render_border(current_row, &theme.colors.border, cols);
    if let Some(prompt) = &vm.prompt {
        current_row = render_prompt(current_row, prompt, theme, cols);
    }

    if let Some(empty) = &vm.empty_state {
        render_empty_state(current_row + 2, empty, theme, cols);
    } else {
        render_list_rows(current_row, &vm.rows, theme, cols);
    }

    let footer_row = rows;
    let border_row = footer_row.saturating_sub(1);
    let status_row = border_row.saturating_sub(1);

    render_status(status_row, vm.status.as_ref(), theme, cols);
    render_border(border_row, &theme.colors.border, cols);
    render_footer(footer_row, &vm.footer, theme, cols);
}


