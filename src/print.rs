//! Plain-text rendering of the change tree, for piping and non-interactive use.

use std::io::Write;

use crate::components::tree::TreeWidget;
use crate::diff::session::{DisplayMode, Session};
use crate::error::Result;

/// Render the session's visible rows as text, one row per line, followed
/// by a totals line.
pub fn render_text(session: &Session) -> String {
    let items = session.visible_items();
    let mut out = String::new();

    let root = &session.root().name;
    if session.display_mode() == DisplayMode::Tree && !root.is_empty() {
        out.push_str(root);
        out.push_str("/\n");
    }

    for (idx, item) in items.iter().enumerate() {
        if session.display_mode() == DisplayMode::Tree {
            out.push_str(&TreeWidget::build_prefix(item, &items, idx));
            out.push(' ');
        }
        out.push_str(&item.name);

        match item.file_path().and_then(|p| session.registry().by_path(p)) {
            Some(record) => {
                out.push(' ');
                out.push_str(record.change_type.marker());
                if record.additions > 0 || record.deletions > 0 {
                    out.push_str(&format!(" +{} -{}", record.additions, record.deletions));
                }
                if record.is_commented {
                    out.push_str(" *");
                }
            }
            None if item.is_folder() => out.push('/'),
            None => {}
        }
        out.push('\n');
    }

    let totals = session.totals();
    out.push_str(&format!(
        "{} file(s) changed, +{} -{}\n",
        totals.files, totals.additions, totals.deletions
    ));
    out
}

/// Write the text rendering to `writer`.
pub fn write_tree<W: Write>(session: &Session, writer: &mut W) -> Result<()> {
    writer.write_all(render_text(session).as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::registry::{ChangeType, FileUpdate};
    use crate::diff::session::Settings;
    use crate::diff::sort::SortMode;

    fn session() -> Session {
        let mut session = Session::new(Settings {
            sort_mode: SortMode::NameAsc,
            ..Settings::default()
        });
        session.update_file(
            FileUpdate::new("crates/core/src/lib.rs")
                .hash("h1")
                .stats(12, 3),
        );
        session.update_file(
            FileUpdate::new("crates/core/src/parse/mod.rs")
                .hash("h2")
                .change_type(ChangeType::Added)
                .commented(true),
        );
        session.update_file(
            FileUpdate::new("crates/core/Cargo.toml")
                .hash("h3")
                .change_type(ChangeType::Deleted),
        );
        session.finalize().unwrap();
        session
    }

    #[test]
    fn tree_text_has_root_prefix_and_guides() {
        let text = render_text(&session());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "crates/core/",
                "├── src/",
                "│  ├── parse/",
                "│  │  └── mod.rs A *",
                "│  └── lib.rs M +12 -3",
                "└── Cargo.toml D",
                "3 file(s) changed, +12 -3",
            ]
        );
    }

    #[test]
    fn plain_text_lists_full_paths() {
        let mut session = session();
        session.set_display_mode(DisplayMode::Plain);
        let text = render_text(&session);
        assert!(text.starts_with("crates/core/Cargo.toml D\n"));
        assert!(text.contains("crates/core/src/parse/mod.rs A *\n"));
        assert!(!text.contains("├──"));
    }

    #[test]
    fn empty_session_prints_totals_only() {
        let session = Session::new(Settings::default());
        assert_eq!(render_text(&session), "0 file(s) changed, +0 -0\n");
    }

    #[test]
    fn write_tree_writes_everything() {
        let session = session();
        let mut buf = Vec::new();
        write_tree(&session, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), render_text(&session));
    }
}
