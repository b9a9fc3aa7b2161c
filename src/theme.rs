//! Theme data model: built-in palettes and resolution from config.

use ratatui::style::Color;

use crate::diff::registry::ChangeType;

// ── Runtime theme colors ─────────────────────────────────────────────────────

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Tree panel
    pub tree_fg: Color,
    pub tree_selected_bg: Color,
    pub tree_selected_fg: Color,
    pub tree_dir_fg: Color,
    pub tree_guide_fg: Color,
    /// Background of the row holding the active file.
    pub tree_active_bg: Color,

    // File pane
    pub pane_fg: Color,
    pub pane_label_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders & chrome
    pub border_fg: Color,
    pub border_focused_fg: Color,

    // Change markers
    pub added_fg: Color,
    pub updated_fg: Color,
    pub renamed_fg: Color,
    pub deleted_fg: Color,
    pub commented_fg: Color,

    // Semantic
    pub error_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

impl ThemeColors {
    /// Color for a change-type marker.
    pub fn change_fg(&self, change_type: ChangeType) -> Color {
        match change_type {
            ChangeType::Added => self.added_fg,
            ChangeType::Updated => self.updated_fg,
            ChangeType::Renamed => self.renamed_fg,
            ChangeType::Deleted => self.deleted_fg,
        }
    }
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Dark theme using Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(205, 214, 244),          // #cdd6f4 (text)
        tree_selected_bg: Color::Rgb(69, 71, 90),    // #45475a (surface1)
        tree_selected_fg: Color::Rgb(205, 214, 244), // #cdd6f4
        tree_dir_fg: Color::Rgb(137, 180, 250),      // #89b4fa (blue)
        tree_guide_fg: Color::Rgb(88, 91, 112),      // #585b70 (surface2)
        tree_active_bg: Color::Rgb(49, 50, 68),      // #313244 (surface0)

        pane_fg: Color::Rgb(205, 214, 244),
        pane_label_fg: Color::Rgb(166, 173, 200), // #a6adc8 (subtext0)

        status_bg: Color::Rgb(30, 30, 46), // #1e1e2e (base)
        status_fg: Color::Rgb(205, 214, 244),

        border_fg: Color::Rgb(88, 91, 112),
        border_focused_fg: Color::Rgb(137, 180, 250),

        added_fg: Color::Rgb(166, 227, 161),   // #a6e3a1 (green)
        updated_fg: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
        renamed_fg: Color::Rgb(116, 199, 236), // #74c7ec (sapphire)
        deleted_fg: Color::Rgb(243, 139, 168), // #f38ba8 (red)
        commented_fg: Color::Rgb(250, 179, 135), // #fab387 (peach)

        error_fg: Color::Rgb(243, 139, 168),
        accent_fg: Color::Rgb(203, 166, 247), // #cba6f7 (mauve)
        dim_fg: Color::Rgb(108, 112, 134),    // #6c7086 (overlay0)
    }
}

/// Light theme using Catppuccin Latte palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(76, 79, 105),             // #4c4f69 (text)
        tree_selected_bg: Color::Rgb(204, 208, 218),  // #ccd0da (surface1)
        tree_selected_fg: Color::Rgb(76, 79, 105),
        tree_dir_fg: Color::Rgb(30, 102, 245),        // #1e66f5 (blue)
        tree_guide_fg: Color::Rgb(172, 176, 190),     // #acb0be (surface2)
        tree_active_bg: Color::Rgb(230, 233, 239),    // #e6e9ef (mantle)

        pane_fg: Color::Rgb(76, 79, 105),
        pane_label_fg: Color::Rgb(108, 111, 133), // #6c6f85 (subtext0)

        status_bg: Color::Rgb(239, 241, 245), // #eff1f5 (base)
        status_fg: Color::Rgb(76, 79, 105),

        border_fg: Color::Rgb(172, 176, 190),
        border_focused_fg: Color::Rgb(30, 102, 245),

        added_fg: Color::Rgb(64, 160, 43),    // #40a02b (green)
        updated_fg: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
        renamed_fg: Color::Rgb(32, 159, 181), // #209fb5 (sapphire)
        deleted_fg: Color::Rgb(210, 15, 57),  // #d20f39 (red)
        commented_fg: Color::Rgb(254, 100, 11), // #fe640b (peach)

        error_fg: Color::Rgb(210, 15, 57),
        accent_fg: Color::Rgb(136, 57, 239), // #8839ef (mauve)
        dim_fg: Color::Rgb(156, 160, 176),   // #9ca0b0 (overlay0)
    }
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the palette for a scheme name. Unknown names get the dark theme.
pub fn resolve_theme(scheme: &str) -> ThemeColors {
    match scheme {
        "light" => light_theme(),
        _ => dark_theme(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
