use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::diff::registry::FileRecord;
use crate::diff::session::{DisplayMode, Session};
use crate::diff::tree::FlatItem;
use crate::theme::ThemeColors;

/// Tree widget that renders the changed-file tree with box-drawing characters.
pub struct TreeWidget<'a> {
    items: &'a [FlatItem],
    session: &'a Session,
    theme: &'a ThemeColors,
    selected: usize,
    scroll_offset: usize,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(items: &'a [FlatItem], session: &'a Session, theme: &'a ThemeColors) -> Self {
        Self {
            items,
            session,
            theme,
            selected: 0,
            scroll_offset: 0,
            use_icons: false,
            block: None,
        }
    }

    pub fn selection(mut self, selected: usize, scroll_offset: usize) -> Self {
        self.selected = selected;
        self.scroll_offset = scroll_offset;
        self
    }

    pub fn use_icons(mut self, use_icons: bool) -> Self {
        self.use_icons = use_icons;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    /// Build the prefix string for tree indentation using box-drawing characters.
    ///
    /// Top-level rows sit at depth 0 and still get a connector, since the
    /// common-prefix root is not a row of its own.
    pub(crate) fn build_prefix(item: &FlatItem, items: &[FlatItem], item_index: usize) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(item.depth + 1);

        for d in 0..item.depth {
            // Walk back to the ancestor at depth d.
            let mut ancestor_is_last = false;
            for j in (0..item_index).rev() {
                if items[j].depth == d {
                    ancestor_is_last = items[j].is_last_sibling;
                    break;
                }
                if items[j].depth < d {
                    break;
                }
            }
            parts.push(if ancestor_is_last { "   " } else { "│  " });
        }

        parts.push(if item.is_last_sibling { "└──" } else { "├──" });
        parts.join("")
    }

    /// Get the folder/file indicator.
    fn item_indicator(&self, item: &FlatItem) -> &'static str {
        match (item.is_folder(), self.use_icons) {
            (true, true) if item.is_expanded => "\u{f07c} ",
            (true, true) => "\u{f07b} ",
            (true, false) if item.is_expanded => "▾ ",
            (true, false) => "▸ ",
            (false, true) => Self::file_icon_by_ext(&item.name),
            (false, false) => " ",
        }
    }

    /// Get a Nerd Font icon for a file based on its extension.
    fn file_icon_by_ext(name: &str) -> &'static str {
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "rs" => "\u{e7a8} ",
            "py" => "\u{e606} ",
            "js" | "jsx" => "\u{e74e} ",
            "ts" | "tsx" => "\u{e628} ",
            "json" => "\u{e60b} ",
            "toml" | "yaml" | "yml" | "ini" | "cfg" => "\u{e615} ",
            "md" | "markdown" | "rst" | "txt" => "\u{e609} ",
            "sh" | "bash" | "zsh" | "fish" => "\u{f489} ",
            "go" => "\u{e626} ",
            "lock" => "\u{f023} ",
            _ => "\u{f15b} ",
        }
    }

    fn record_for(&self, item: &FlatItem) -> Option<&'a FileRecord> {
        let session: &'a Session = self.session;
        item.file_path()
            .and_then(|path| session.registry().by_path(path))
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let items = self.items;
        let visible_height = inner_area.height as usize;

        if visible_height == 0 || inner_area.width == 0 {
            return;
        }
        if items.is_empty() {
            let msg = if self.session.filter().is_empty() {
                "No changed files"
            } else {
                "No matches"
            };
            let line = Line::from(Span::styled(msg, Style::default().fg(self.theme.dim_fg)));
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
            return;
        }

        let show_guides = self.session.display_mode() == DisplayMode::Tree;
        let visible_items = items
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(visible_height);

        for (i, (idx, item)) in visible_items.enumerate() {
            let y = inner_area.y + i as u16;

            let prefix = if show_guides {
                Self::build_prefix(item, items, idx)
            } else {
                String::new()
            };
            let record = self.record_for(item);
            let is_selected = idx == self.selected;
            let is_active =
                record.is_some_and(|r| self.session.active_hash() == Some(r.hash.as_str()));

            let base = if is_selected {
                Style::default()
                    .bg(self.theme.tree_selected_bg)
                    .fg(self.theme.tree_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else if is_active {
                Style::default()
                    .bg(self.theme.tree_active_bg)
                    .fg(self.theme.tree_fg)
            } else {
                Style::default().fg(self.theme.tree_fg)
            };
            let name_style = if item.is_folder() && !is_selected {
                base.fg(self.theme.tree_dir_fg).add_modifier(Modifier::BOLD)
            } else {
                base
            };

            let mut spans = vec![
                Span::styled(prefix, base.fg(self.theme.tree_guide_fg)),
                Span::styled(self.item_indicator(item), base),
                Span::styled(item.name.clone(), name_style),
            ];
            if let Some(record) = record {
                spans.push(Span::styled(" ", base));
                spans.push(Span::styled(
                    record.change_type.marker(),
                    base.fg(self.theme.change_fg(record.change_type)),
                ));
                if record.is_commented {
                    spans.push(Span::styled(" ●", base.fg(self.theme.commented_fg)));
                }
            }

            let line = Line::from(spans);
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::registry::{ChangeType, FileUpdate};
    use crate::diff::session::Settings;
    use crate::diff::sort::SortMode;
    use crate::theme;

    fn session() -> Session {
        let mut session = Session::new(Settings {
            sort_mode: SortMode::NameAsc,
            ..Settings::default()
        });
        session.update_file(
            FileUpdate::new("src/lib.rs")
                .hash("diff-0")
                .change_type(ChangeType::Added),
        );
        session.update_file(
            FileUpdate::new("src/util/fmt.rs")
                .hash("diff-1")
                .commented(true),
        );
        session.update_file(FileUpdate::new("README.md").hash("diff-2"));
        session.finalize().unwrap();
        session
    }

    fn render_lines(widget: TreeWidget<'_>, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn renders_guides_and_markers() {
        let session = session();
        let items = session.visible_items();
        let theme = theme::dark_theme();
        let lines = render_lines(TreeWidget::new(&items, &session, &theme), 40, 5);

        assert_eq!(lines[0], "├──▾ src");
        assert_eq!(lines[1], "│  ├──▾ util");
        assert_eq!(lines[2], "│  │  └── fmt.rs M ●");
        assert_eq!(lines[3], "│  └── lib.rs A");
        assert_eq!(lines[4], "└── README.md M");
    }

    #[test]
    fn plain_mode_has_no_guides() {
        let mut session = session();
        session.set_display_mode(DisplayMode::Plain);
        let items = session.visible_items();
        let theme = theme::dark_theme();
        let lines = render_lines(TreeWidget::new(&items, &session, &theme), 40, 3);
        assert_eq!(lines[0], " src/util/fmt.rs M ●");
        assert_eq!(lines[1], " src/lib.rs A");
        assert_eq!(lines[2], " README.md M");
    }

    #[test]
    fn selected_row_is_highlighted() {
        let session = session();
        let items = session.visible_items();
        let theme = theme::dark_theme();
        let widget = TreeWidget::new(&items, &session, &theme).selection(1, 0);

        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        assert_eq!(buf.cell((5, 1)).unwrap().bg, theme.tree_selected_bg);
        assert_ne!(buf.cell((5, 0)).unwrap().bg, theme.tree_selected_bg);
    }

    #[test]
    fn active_file_row_is_marked() {
        let mut session = session();
        session.show_file("diff-2");
        let items = session.visible_items();
        let theme = theme::dark_theme();
        let widget = TreeWidget::new(&items, &session, &theme).selection(0, 0);

        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        assert_eq!(buf.cell((5, 4)).unwrap().bg, theme.tree_active_bg);
    }

    #[test]
    fn scroll_offset_skips_rows() {
        let session = session();
        let items = session.visible_items();
        let theme = theme::dark_theme();
        let lines = render_lines(
            TreeWidget::new(&items, &session, &theme).selection(4, 3),
            40,
            2,
        );
        assert_eq!(lines[0], "│  └── lib.rs A");
        assert_eq!(lines[1], "└── README.md M");
    }

    #[test]
    fn empty_tree_shows_placeholder() {
        let session = Session::new(Settings::default());
        let theme = theme::dark_theme();
        let lines = render_lines(TreeWidget::new(&[], &session, &theme), 30, 2);
        assert_eq!(lines[0], "No changed files");
    }

    #[test]
    fn icons_by_extension() {
        assert_eq!(TreeWidget::file_icon_by_ext("main.rs"), "\u{e7a8} ");
        assert_eq!(TreeWidget::file_icon_by_ext("Makefile"), "\u{f15b} ");
    }
}
