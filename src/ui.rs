use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::file_pane::FilePaneWidget;
use crate::components::help::HelpOverlay;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let (main_area, status_area) = (outer[0], outer[1]);

    if app.session.tree_visible() {
        let panel_width = app.panel_width.min(main_area.width);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(panel_width), Constraint::Min(0)])
            .split(main_area);
        render_tree(app, frame, columns[0]);
        render_file_pane(app, frame, columns[1]);
    } else {
        render_file_pane(app, frame, main_area);
    }

    render_status_bar(app, frame, status_area);

    if app.mode == AppMode::Help {
        frame.render_widget(HelpOverlay::new(&app.theme), area);
    }
}

fn tree_title(app: &App) -> String {
    let root = &app.session.root().name;
    if root.is_empty() {
        " Changes ".to_string()
    } else {
        format!(" {} ", root)
    }
}

fn render_tree(app: &mut App, frame: &mut Frame, area: Rect) {
    // Keep the selection visible inside the bordered panel.
    let visible_height = area.height.saturating_sub(2) as usize;
    app.update_scroll(visible_height);

    let block = Block::default()
        .title(tree_title(app))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focused_fg));

    let tree_widget = TreeWidget::new(&app.flat_items, &app.session, &app.theme)
        .selection(app.selected_index, app.scroll_offset)
        .use_icons(app.use_icons)
        .block(block);
    frame.render_widget(tree_widget, area);
}

fn render_file_pane(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" File ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_fg));

    let pane = FilePaneWidget::new(
        app.session.active_record(),
        app.session.totals(),
        &app.theme,
    )
    .block(block);
    frame.render_widget(pane, area);
}

/// One-line summary of the view: sort order, display mode and totals.
fn view_summary(app: &App) -> String {
    let totals = app.session.totals();
    format!(
        "Sort: {} | {} | {} files +{} -{}",
        app.session.settings().sort_mode.label(),
        app.session.display_mode().label(),
        totals.files,
        totals.additions,
        totals.deletions
    )
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let source = app.source.label();
    let summary = view_summary(app);
    let watcher = if app.watcher_active && app.source.path().is_some() {
        Some("[watching]")
    } else {
        None
    };

    let mut bar = StatusBarWidget::new(&source, &summary, &app.theme);
    if let Some(status) = watcher {
        bar = bar.watcher_status(status);
    }
    if app.mode == AppMode::Filter {
        bar = bar.filter_prompt(app.session.filter());
    }
    if let Some((msg, _)) = &app.status_message {
        bar = bar.status_message(msg, msg.starts_with('⚠'));
    }
    frame.render_widget(bar, area);
}
