use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::diff::registry::{FileRecord, Totals};
use crate::theme::ThemeColors;

/// Details of the active file, plus change-set totals.
pub struct FilePaneWidget<'a> {
    record: Option<&'a FileRecord>,
    totals: Totals,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> FilePaneWidget<'a> {
    pub fn new(record: Option<&'a FileRecord>, totals: Totals, theme: &'a ThemeColors) -> Self {
        Self {
            record,
            totals,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    fn field(&self, label: &'static str, value: String, value_style: Style) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("{:<10}", label),
                Style::default().fg(self.theme.pane_label_fg),
            ),
            Span::styled(value, value_style),
        ])
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let plain = Style::default().fg(self.theme.pane_fg);
        let mut lines = Vec::new();

        match self.record {
            Some(record) => {
                lines.push(Line::from(Span::styled(
                    record.path.clone(),
                    plain.add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
                lines.push(self.field(
                    "Change",
                    record.change_type.label().to_string(),
                    Style::default().fg(self.theme.change_fg(record.change_type)),
                ));
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{:<10}", "Lines"),
                        Style::default().fg(self.theme.pane_label_fg),
                    ),
                    Span::styled(
                        format!("+{}", record.additions),
                        Style::default().fg(self.theme.added_fg),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        format!("-{}", record.deletions),
                        Style::default().fg(self.theme.deleted_fg),
                    ),
                ]));
                if !record.dir.is_empty() {
                    lines.push(self.field("Folder", record.dir.clone(), plain));
                }
                if !record.ext.is_empty() {
                    lines.push(self.field("Type", record.ext.clone(), plain));
                }
                lines.push(self.field("Anchor", record.hash.clone(), plain));
                if record.is_commented {
                    lines.push(self.field(
                        "Comments",
                        "yes".to_string(),
                        Style::default().fg(self.theme.commented_fg),
                    ));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "No file selected",
                Style::default().fg(self.theme.dim_fg),
            ))),
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "{} file(s) changed, +{} -{}",
                self.totals.files, self.totals.additions, self.totals.deletions
            ),
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }
}

impl<'a> Widget for FilePaneWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        for (i, line) in self
            .build_lines()
            .iter()
            .take(inner.height as usize)
            .enumerate()
        {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::registry::ChangeType;
    use crate::theme;

    fn rendered(widget: FilePaneWidget<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn shows_record_details() {
        let record = FileRecord {
            hash: "diff-3".into(),
            change_type: ChangeType::Renamed,
            additions: 7,
            deletions: 2,
            is_commented: true,
            ..FileRecord::new("src/ui/view.rs")
        };
        let totals = Totals {
            files: 4,
            additions: 10,
            deletions: 3,
        };
        let theme = theme::dark_theme();
        let text = rendered(FilePaneWidget::new(Some(&record), totals, &theme), 50, 12);

        assert!(text.contains("src/ui/view.rs"));
        assert!(text.contains("renamed"));
        assert!(text.contains("+7 -2"));
        assert!(text.contains("src/ui"));
        assert!(text.contains("diff-3"));
        assert!(text.contains("Comments"));
        assert!(text.contains("4 file(s) changed, +10 -3"));
    }

    #[test]
    fn placeholder_without_record() {
        let theme = theme::dark_theme();
        let text = rendered(
            FilePaneWidget::new(None, Totals::default(), &theme),
            40,
            4,
        );
        assert!(text.contains("No file selected"));
        assert!(text.contains("0 file(s) changed"));
    }

    #[test]
    fn zero_area_does_not_panic() {
        let theme = theme::dark_theme();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        FilePaneWidget::new(None, Totals::default(), &theme).render(area, &mut buf);
    }
}
