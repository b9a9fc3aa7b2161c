mod app;
mod components;
mod config;
mod diff;
mod error;
mod event;
mod extract;
mod handler;
mod logging;
mod print;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::app::App;
use crate::config::{AppConfig, TreeConfig, WatcherConfig};
use crate::diff::session::Session;
use crate::diff::watcher::InputWatcher;
use crate::event::{Event, EventHandler};
use crate::extract::{InputFormat, InputSource};
use crate::tui::{install_panic_hook, Tui};

/// Browse a change list as a collapsible directory tree.
#[derive(Parser, Debug)]
#[command(name = "dtree", version, about)]
struct Cli {
    /// Change list to read: JSON, unified diff, numstat or name-status (`-` for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Force the input dialect instead of probing
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sort order: name_asc, name_desc, ext_asc, ext_desc
    #[arg(long)]
    sort: Option<String>,

    /// File to show first, by anchor hash or path
    #[arg(long)]
    select: Option<String>,

    /// Mark a file as commented (repeatable)
    #[arg(long, value_name = "PATH")]
    commented: Vec<String>,

    /// Print the tree as text and exit
    #[arg(long)]
    print: bool,

    /// Do not reload when the input file changes
    #[arg(long)]
    no_watcher: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Config layer built from flags; only flags that were given are set.
    fn config_overrides(&self) -> AppConfig {
        AppConfig {
            tree: TreeConfig {
                sort_by: self.sort.clone(),
                ..TreeConfig::default()
            },
            watcher: WatcherConfig {
                enabled: self.no_watcher.then_some(false),
                ..WatcherConfig::default()
            },
            ..AppConfig::default()
        }
    }
}

/// Read, extract and ingest the change list, then apply `--commented` and
/// `--select`.
fn load_session(cli: &Cli, source: &InputSource, config: &AppConfig) -> error::Result<Session> {
    let input = source.read()?;
    let extraction = extract::extract(&input, cli.format)?;

    let mut session = Session::new(config.settings());
    let count = session.ingest(extraction)?;
    info!(files = count, source = %source.label(), "loaded change list");

    for path in &cli.commented {
        if !session.mark_commented_path(path) {
            warn!(path = %path, "--commented path is not in the change list");
        }
    }

    match cli.select.as_deref() {
        Some(wanted) if session.registry().by_hash(wanted).is_some() => {
            session.show_file(wanted);
        }
        Some(wanted) => {
            session.show_path(wanted);
        }
        None => {
            session.show_file("");
        }
    }
    Ok(session)
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();

    let overrides = cli.config_overrides();
    let config = AppConfig::load(cli.config.as_deref(), Some(&overrides));
    let log_file = logging::init_logging(&config, cli.log_file.clone())?;
    if let Some(path) = &log_file {
        info!(path = %path.display(), "logging initialised");
    }

    let source = InputSource::from_arg(&cli.input);
    if let Some(path) = source.path() {
        if !path.exists() {
            return Err(error::AppError::InvalidPath(format!(
                "{} does not exist",
                path.display()
            )));
        }
    }

    let session = load_session(&cli, &source, &config)?;

    if cli.print || source.path().is_none() {
        return print::write_tree(&session, &mut std::io::stdout().lock());
    }

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut app =
        App::new(session, source, cli.format, &config).with_commented(cli.commented.clone());
    let mut events = EventHandler::new(Duration::from_millis(16));
    let event_tx = events.sender();

    let watcher = match app.source.path() {
        Some(path) if app.watcher_active => {
            match InputWatcher::new(
                path,
                Duration::from_millis(config.debounce_ms()),
                event_tx.clone(),
            ) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    warn!(error = %e, "input watcher unavailable");
                    app.watcher_active = false;
                    app.set_status_message(format!("⚠ Watcher unavailable: {}", e));
                    None
                }
            }
        }
        _ => None,
    };

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::InputChanged => app.handle_input_changed(),
        }

        // Sync watcher pause/resume state
        if let Some(ref watcher) = watcher {
            if app.watcher_active && !watcher.is_active() {
                watcher.resume();
            } else if !app.watcher_active && watcher.is_active() {
                watcher.pause();
            }
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    Ok(())
}
