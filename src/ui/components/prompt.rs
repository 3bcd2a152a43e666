//! Prompt box renderer.
//!
//! One boxed input line shared by title/algorithm/code editing, the upload
//! path prompt and search.
//!
//! ```text
//! [margin] ┌─────────────────┐ [margin]
//! [margin] │ Title: Intro    │ [margin]
//! [margin] └─────────────────┘ [margin]
//! ```

use crate::ui::helpers::{display_width, fit_tail, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::PromptInfo;

/// Horizontal margin on each side of the box.
const PROMPT_BOX_MARGIN: usize = 5;

/// Renders the 3-line prompt box. Returns the next free row.
///
/// Long input scrolls: only its tail is shown, so the end being typed stays
/// in view.
pub fn render_prompt(row: usize, prompt: &PromptInfo, theme: &Theme, cols: usize) -> usize {
    let box_width = cols.saturating_sub(PROMPT_BOX_MARGIN * 2);
    let inner_width = box_width.saturating_sub(2);

    position_cursor(row, 1);
    print!("{}", " ".repeat(PROMPT_BOX_MARGIN));
    print!("{}", Theme::fg(&theme.colors.prompt_border));
    print!("┌{}┐", "─".repeat(inner_width));
    print!("{}", Theme::reset());

    let label = format!(" {}: ", prompt.label);
    let text = fit_tail(&prompt.text, inner_width.saturating_sub(display_width(&label) + 1));
    let used = display_width(&label) + display_width(&text);

    position_cursor(row + 1, 1);
    print!("{}", " ".repeat(PROMPT_BOX_MARGIN));
    print!("{}", Theme::fg(&theme.colors.prompt_border));
    print!("│");
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.text_normal));
    print!("{label}");
    print!("{}", Theme::reset());
    print!("{}", Theme::fg(&theme.colors.text_normal));
    print!("{text}");
    print!("{}", " ".repeat(inner_width.saturating_sub(used)));
    print!("{}", Theme::fg(&theme.colors.prompt_border));
    print!("│");
    print!("{}", Theme::reset());

    position_cursor(row + 2, 1);
    print!("{}", " ".repeat(PROMPT_BOX_MARGIN));
    print!("{}", Theme::fg(&theme.colors.prompt_border));
    print!("└{}┘", "─".repeat(inner_width));
    print!("{}", Theme::reset());

    row + 3
}
