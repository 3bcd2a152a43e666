//! Theme management and ANSI escape sequence generation.
//!
//! Themes are TOML palettes. Four Catppuccin variants are compiled in; a
//! custom file can be supplied through the `theme_file` configuration key.
//!
//! # Built-in Themes
//!
//! - `catppuccin-mocha`: Dark theme with warm tones (default)
//! - `catppuccin-latte`: Light theme with soft pastels
//! - `catppuccin-frappe`: Cool dark theme
//! - `catppuccin-macchiato`: Warm dark theme
//!
//! # TOML Format
//!
//! ```toml
//! name = "my-theme"
//!
//! [colors]
//! header_fg = "#cdd6f4"
//! selection_fg = "#1e1e2e"
//! selection_bg = "#f5c2e7"
//! text_normal = "#cdd6f4"
//! text_dim = "#6c7086"
//! border = "#45475a"
//! prompt_border = "#f5c2e7"
//! match_highlight_fg = "#1e1e2e"
//! match_highlight_bg = "#f9e2af"
//! empty_state_fg = "#89b4fa"
//! progress_fg = "#a6e3a1"
//! error_fg = "#f38ba8"
//! drop_target_fg = "#fab387"
//! ```

use crate::domain::{NotesError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the theme used when none is configured.
pub const DEFAULT_THEME: &str = "catppuccin-mocha";

/// Color scheme configuration for UI rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Theme {
    /// Human-readable theme name.
    pub name: String,
    /// Color palette for all UI elements.
    pub colors: ThemeColors,
}

/// Color definitions for all UI elements, as hex strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemeColors {
    /// Header text color.
    pub header_fg: String,
    /// Optional header background color.
    #[serde(default)]
    pub header_bg: Option<String>,

    /// Selected row foreground color.
    pub selection_fg: String,
    /// Selected row background color.
    pub selection_bg: String,

    /// Normal text color.
    pub text_normal: String,
    /// Dimmed text color (footer, detail rows).
    pub text_dim: String,

    /// Border and separator line color.
    pub border: String,

    /// Frame of the edit/search prompt.
    pub prompt_border: String,
    /// Fuzzy match highlight foreground.
    pub match_highlight_fg: String,
    /// Fuzzy match highlight background.
    pub match_highlight_bg: String,

    /// Empty state message color.
    pub empty_state_fg: String,

    /// Upload progress indicator.
    pub progress_fg: String,
    /// Failed upload or export messages.
    pub error_fg: String,
    /// Section picked up for moving.
    pub drop_target_fg: String,
}

impl Theme {
    /// Loads a built-in theme by name, or `None` if the name is unknown.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let toml_str = match name {
            "catppuccin-mocha" => include_str!("../../themes/catppuccin-mocha.toml"),
            "catppuccin-latte" => include_str!("../../themes/catppuccin-latte.toml"),
            "catppuccin-frappe" => include_str!("../../themes/catppuccin-frappe.toml"),
            "catppuccin-macchiato" => include_str!("../../themes/catppuccin-macchiato.toml"),
            _ => return None,
        };

        toml::from_str(toml_str).ok()
    }

    /// Loads a theme from a TOML file.
    ///
    /// # Parameters
    ///
    /// * `path` - Sandbox path of the TOML file
    ///
    /// # Errors
    ///
    /// Returns [`NotesError::Theme`] if the file cannot be read or does not
    /// describe a complete palette.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use dsanotes::ui::Theme;
    ///
    /// let theme = Theme::from_file("/host/.config/dsanotes/theme.toml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| NotesError::Theme(format!("failed to read {}: {e}", path.as_ref().display())))?;

        toml::from_str(&contents).map_err(|e| NotesError::Theme(format!("failed to parse theme TOML: {e}")))
    }

    /// Resolves the configured theme: a custom file wins over a built-in
    /// name, and anything that fails to load falls back to the default.
    ///
    /// # Returns
    ///
    /// The first of these that loads: the file, the named theme,
    /// `catppuccin-mocha`. Rejections are logged at `warn`.
    #[must_use]
    pub fn resolve(name: Option<&str>, file: Option<&Path>) -> Self {
        if let Some(path) = file {
            match Self::from_file(path) {
                Ok(theme) => return theme,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "custom theme rejected, using built-in"),
            }
        }

        name.and_then(|n| {
            let theme = Self::from_name(n);
            if theme.is_none() {
                tracing::warn!(theme = n, "unknown theme name, using default");
            }
            theme
        })
        .unwrap_or_default()
    }

    /// Converts a hex color to RGB; malformed input yields white.
    fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
        let hex = hex.trim().trim_start_matches('#');

        if hex.len() != 6 || !hex.is_ascii() {
            return (255, 255, 255);
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(255);
        (channel(0..2), channel(2..4), channel(4..6))
    }

    /// 24-bit foreground color escape sequence.
    #[must_use]
    pub fn fg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[38;2;{r};{g};{b}m")
    }

    /// 24-bit background color escape sequence.
    #[must_use]
    pub fn bg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[48;2;{r};{g};{b}m")
    }

    #[must_use]
    pub const fn bold() -> &'static str {
        "\u{001b}[1m"
    }

    #[must_use]
    pub const fn dim() -> &'static str {
        "\u{001b}[2m"
    }

    /// Clears all styling.
    #[must_use]
    pub const fn reset() -> &'static str {
        "\u{001b}[0m"
    }
}

impl Default for Theme {
    /// Returns the Catppuccin Mocha theme.
    ///
    /// # Panics
    ///
    /// Panics if the compiled-in palette fails to parse.
    fn default() -> Self {
        Self::from_name(DEFAULT_THEME).expect("built-in catppuccin-mocha theme should always parse")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_themes_parse() {
        for name in ["catppuccin-mocha", "catppuccin-latte", "catppuccin-frappe", "catppuccin-macchiato"] {
            let theme = Theme::from_name(name).unwrap_or_else(|| panic!("{name} should parse"));
            assert_eq!(theme.name, name);
        }
        assert!(Theme::from_name("solarized").is_none());
    }

    #[test]
    fn hex_conversion() {
        assert_eq!(Theme::fg("#1e1e2e"), "\u{001b}[38;2;30;30;46m");
        assert_eq!(Theme::bg("f5c2e7"), "\u{001b}[48;2;245;194;231m");
        assert_eq!(Theme::fg("#zz0000"), "\u{001b}[38;2;255;0;0m");
        assert_eq!(Theme::fg("#abc"), "\u{001b}[38;2;255;255;255m");
    }

    #[test]
    fn custom_theme_file_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut custom: String = include_str!("../../themes/catppuccin-frappe.toml").to_string();
        custom = custom.replacen("catppuccin-frappe", "mine", 1);
        file.write_all(custom.as_bytes()).unwrap();

        let theme = Theme::resolve(Some("catppuccin-latte"), Some(file.path()));
        assert_eq!(theme.name, "mine");
    }

    #[test]
    fn broken_theme_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"name = \"half\"\n[colors]\nheader_fg = \"#ffffff\"\n").unwrap();

        assert!(matches!(Theme::from_file(file.path()), Err(NotesError::Theme(_))));
        assert_eq!(Theme::resolve(Some("catppuccin-latte"), Some(file.path())).name, "catppuccin-latte");
        assert_eq!(Theme::resolve(Some("nope"), None).name, DEFAULT_THEME);
        assert_eq!(Theme::resolve(None, None).name, DEFAULT_THEME);
    }
}


