use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, AppMode};

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Filter => handle_filter_mode(app, key),
        AppMode::Help => handle_help_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => app.collapse_selected(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('p') => app.toggle_display_mode(),
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Esc if !app.session.filter().is_empty() => app.cancel_filter(),
        KeyCode::Char('r') => app.handle_input_changed(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

fn handle_filter_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_filter(),
        KeyCode::Enter => app.confirm_filter(),
        KeyCode::Backspace => app.filter_delete_char(),
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Char(c) => app.filter_input_char(c),
        _ => {}
    }
}

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => app.toggle_help(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::diff::session::{Session, Settings};
    use crate::diff::sort::SortMode;
    use crate::extract::{self, InputSource};

    fn app() -> App {
        let mut session = Session::new(Settings {
            sort_mode: SortMode::NameAsc,
            ..Settings::default()
        });
        let changes = "M\tsrc/a.rs\nM\tsrc/b.rs\nA\tdocs/guide.md\n";
        session
            .ingest(extract::extract(changes, None).unwrap())
            .unwrap();
        App::new(session, InputSource::Stdin, None, &AppConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let mut a = app();
        press(&mut a, KeyCode::Char('q'));
        assert!(a.should_quit);

        let mut b = app();
        handle_key_event(
            &mut b,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(b.should_quit);
    }

    #[test]
    fn vim_keys_move_selection() {
        let mut a = app();
        press(&mut a, KeyCode::Char('j'));
        assert_eq!(a.selected_index, 1);
        press(&mut a, KeyCode::Char('G'));
        assert_eq!(a.selected_index, a.flat_items.len() - 1);
        press(&mut a, KeyCode::Char('g'));
        assert_eq!(a.selected_index, 0);
    }

    #[test]
    fn slash_enters_filter_and_typing_filters() {
        let mut a = app();
        press(&mut a, KeyCode::Char('/'));
        assert_eq!(a.mode, AppMode::Filter);
        // 'q' is text in filter mode, not quit.
        press(&mut a, KeyCode::Char('q'));
        assert!(!a.should_quit);
        press(&mut a, KeyCode::Backspace);
        press(&mut a, KeyCode::Char('g'));
        press(&mut a, KeyCode::Char('u'));
        assert_eq!(a.session.filter(), "gu");
        press(&mut a, KeyCode::Enter);
        assert_eq!(a.mode, AppMode::Normal);
        press(&mut a, KeyCode::Esc);
        assert_eq!(a.session.filter(), "");
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let mut a = app();
        press(&mut a, KeyCode::Char('?'));
        assert_eq!(a.mode, AppMode::Help);
        press(&mut a, KeyCode::Char('j'));
        assert_eq!(a.selected_index, 0);
        press(&mut a, KeyCode::Esc);
        assert_eq!(a.mode, AppMode::Normal);
    }

    #[test]
    fn s_and_p_change_view() {
        let mut a = app();
        press(&mut a, KeyCode::Char('s'));
        assert_eq!(a.session.settings().sort_mode, SortMode::NameDesc);
        press(&mut a, KeyCode::Char('p'));
        assert!(a.flat_items.iter().all(|i| !i.is_folder()));
    }

    #[test]
    fn h_collapses_folder() {
        let mut a = app();
        a.select_first();
        let before = a.flat_items.len();
        press(&mut a, KeyCode::Char('h'));
        assert!(a.flat_items.len() < before);
        press(&mut a, KeyCode::Char('l'));
        assert_eq!(a.flat_items.len(), before);
    }
}
