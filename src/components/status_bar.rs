use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " /:filter  s:sort  p:view  ?:help  q:quit ";

/// Status bar widget: input source, view summary, key hints, or a transient message.
pub struct StatusBarWidget<'a> {
    source: &'a str,
    summary: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    filter_prompt: Option<&'a str>,
    watcher_status: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(source: &'a str, summary: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            source,
            summary,
            theme,
            status_message: None,
            is_error: false,
            filter_prompt: None,
            watcher_status: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    /// Show the filter query being typed instead of the source label.
    pub fn filter_prompt(mut self, query: &'a str) -> Self {
        self.filter_prompt = Some(query);
        self
    }

    pub fn watcher_status(mut self, status: &'a str) -> Self {
        self.watcher_status = Some(status);
        self
    }
}

fn width_of(s: &str) -> usize {
    s.chars().count()
}

/// Keep the last `budget` characters, marking the cut with "...".
fn truncate_left(s: &str, budget: usize) -> String {
    let len = width_of(s);
    if len <= budget {
        return s.to_string();
    }
    if budget <= 3 {
        return s.chars().take(budget).collect();
    }
    let tail: String = s.chars().skip(len - (budget - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        let bar_style = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);
        buf.set_style(area, bar_style);

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_bg)
            } else {
                bar_style.fg(self.theme.accent_fg)
            };

            let display: String = msg.chars().take(width).collect();
            let display = format!("{:<width$}", display, width = width);
            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let hints_len = width_of(KEY_HINTS);
        let remaining = width.saturating_sub(hints_len);

        let (left, left_style) = match self.filter_prompt {
            Some(query) => (
                format!("/{}", query),
                bar_style.fg(self.theme.accent_fg).add_modifier(Modifier::BOLD),
            ),
            None => (self.source.to_string(), bar_style),
        };

        let mut right = self.summary.to_string();
        if let Some(watcher) = self.watcher_status {
            right.push_str("  ");
            right.push_str(watcher);
        }
        let right = if width_of(&right) > remaining {
            right.chars().take(remaining).collect()
        } else {
            right
        };

        let left_budget = remaining
            .saturating_sub(width_of(&right))
            .saturating_sub(1);
        let left = truncate_left(&left, left_budget);

        let gap = remaining
            .saturating_sub(width_of(&left))
            .saturating_sub(width_of(&right));

        let hints_style = bar_style
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::DIM);

        let mut spans = vec![
            Span::styled(left, left_style),
            Span::styled(" ".repeat(gap), bar_style),
            Span::styled(right, bar_style.fg(self.theme.pane_label_fg)),
        ];
        if width > hints_len {
            spans.push(Span::styled(KEY_HINTS, hints_style));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
