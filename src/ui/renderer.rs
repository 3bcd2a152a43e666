//! Top-level rendering coordinator.
//!
//! Computes the view model from `AppState` and hands it to the layout
//! component. Output goes to stdout; Zellij captures it as the pane content.

use crate::app::AppState;
use crate::ui::components;

/// Renders the plugin UI for a `rows` × `cols` pane.
pub fn render(state: &AppState, rows: usize, cols: usize) {
    let viewmodel = state.compute_viewmodel(rows, cols);
    components::render_layout(&viewmodel, &state.theme, cols, rows);
}

/// Renders a fatal configuration error in place of the form.
pub fn render_fatal(message: &str, rows: usize, cols: usize) {
    use crate::ui::helpers::{position_cursor, print_centered};
    use crate::ui::theme::Theme;

    let theme = Theme::default();
    let top = (rows / 2).saturating_sub(1).max(1);

    position_cursor(top, 1);
    print!("{}{}", Theme::bold(), Theme::fg(&theme.colors.error_fg));
    print_centered("dsanotes cannot start", cols);
    print!("{}", Theme::reset());

    position_cursor(top + 1, 1);
    print!("{}", Theme::fg(&theme.colors.text_normal));
    print_centered(message, cols);
    print!("{}", Theme::reset());
}
