use std::sync::{Arc, mpsc};

use app::{App, CrosstermEvent};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use cli::BytelensCli;
use color_eyre::eyre::{Context, eyre};
use engine::MemoryEngine;
use indication::IndicationRegistry;
use panic_handler::initialize_panic_handler;
use ratatui::crossterm::{
    self,
    event::{DisableMouseCapture, EnableMouseCapture, MouseEventKind},
};
use settings::Settings;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_appender::non_blocking::WorkerGuard;
use view::{DataView, QueryOptions};

use crate::display::{Encoding, Radix};

mod app;
mod cli;
pub mod display;
pub mod engine;
pub mod errors;
pub mod indication;
mod notifications;
pub mod overlay;
mod panic_handler;
mod settings;
pub mod view;
pub mod viewport;
pub mod windowing;

/// Wrapper runner so any fatal errors get properly logged.
pub fn run() -> color_eyre::Result<()> {
    let cli = BytelensCli::parse();
    initialize_panic_handler()?;

    let config_dir = config_dir(&cli)?;
    let settings = Settings::load(config_dir.join(settings::CONFIG_FILE_NAME).as_std_path(), false)?;
    let _log_guard = initialize_logging(settings.get_log_level(), &config_dir)?;

    let result = run_inner(cli, settings);
    if let Err(e) = &result {
        error!("Fatal error: {e}");
    }
    result
}

fn run_inner(cli: BytelensCli, settings: Settings) -> color_eyre::Result<()> {
    let registry = Arc::new(IndicationRegistry::viewport_default()?);
    let engine = MemoryEngine::from_path(&cli.file)?;

    let mut config = settings.view_config();
    if let Some(radix) = cli.radix {
        config.radix = Radix::from_value(radix)?;
    }
    let mut view = DataView::new(engine, registry, config)?;

    let encoding = match &cli.encoding {
        Some(name) => name
            .parse::<Encoding>()
            .map_err(|_| display::DisplayError::UnsupportedEncoding(name.to_owned()))?,
        None => settings.search.encoding,
    };
    let options = QueryOptions {
        encoding,
        case_insensitive: settings.search.case_insensitive,
        limit: settings.search.limit,
    };
    if let Some(pattern) = &cli.search {
        match &cli.replace {
            Some(replacement) => {
                let count =
                    view.replace_text(pattern, replacement, encoding, options.case_insensitive)?;
                info!("Replaced {count} occurrences of {pattern:?}");
            }
            None => {
                view.search_text(pattern, options)?;
            }
        }
    }
    if let Some(offset) = &cli.offset {
        view.seek_input(offset)
            .wrap_err_with(|| format!("Can't seek to {offset}"))?;
    } else if let Some(first) = view.search_results().current() {
        view.seek(first)?;
    }

    if cli.dump {
        print!("{}", app::dump(&view));
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<app::Event>();
    let crossterm_tx = tx.clone();
    std::thread::spawn(move || -> color_eyre::Result<()> {
        loop {
            use crossterm::event::Event;
            use crossterm::event::KeyEventKind;
            match crossterm::event::read()? {
                Event::Resize(_, _) => crossterm_tx.send(CrosstermEvent::Resize.into())?,
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    crossterm_tx.send(CrosstermEvent::KeyPress(key).into())?;
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        crossterm_tx.send(CrosstermEvent::MouseScroll { up: true }.into())?
                    }
                    MouseEventKind::ScrollDown => {
                        crossterm_tx.send(CrosstermEvent::MouseScroll { up: false }.into())?
                    }
                    _ => (),
                },
                _ => (),
            };
        }
    });

    let terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = App::new(rx, view, options).run(terminal);

    ratatui::restore();
    crossterm::execute!(std::io::stdout(), DisableMouseCapture)?;
    result
}

/// Directory holding the config and log files: `--config-path`, or next to the executable.
fn config_dir(cli: &BytelensCli) -> color_eyre::Result<Utf8PathBuf> {
    if let Some(path) = &cli.config_path {
        fs_err::create_dir_all(path)?;
        return Ok(path.to_owned());
    }
    let exe = std::env::current_exe()?;
    let exe = Utf8PathBuf::from_path_buf(exe)
        .map_err(|p| eyre!("Executable path isn't UTF-8: {}", p.display()))?;
    exe.parent()
        .map(Utf8Path::to_owned)
        .ok_or_else(|| eyre!("Executable has no parent directory"))
}

pub fn initialize_logging(
    max_level: LevelFilter,
    log_dir: &Utf8Path,
) -> color_eyre::Result<WorkerGuard> {
    use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{
        fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt,
    };
    let log_name = log_dir.join(concat!(env!("CARGO_PKG_NAME"), ".log"));
    let file_appender = BasicRollingFileAppender::new(
        log_name.as_std_path(),
        RollingConditionBasic::new().max_size(1024 * 1024 * 5),
        2,
    )
    .wrap_err("Failed to open log file")?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let time_fmt = ChronoLocal::new("%Y-%m-%d %H:%M:%S%.6f".to_owned());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_file(false)
        .with_ansi(false)
        .with_target(true)
        .with_timer(time_fmt)
        .with_line_number(true)
        .with_filter(max_level);

    tracing_subscriber::registry().with(fmt_layer).init();
    Ok(guard)
}
