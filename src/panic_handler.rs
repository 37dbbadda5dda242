use color_eyre::Result;
use ratatui::crossterm::event::DisableMouseCapture;

/// Installs color-eyre's report hooks, plus a panic hook that gives the terminal back
/// before anything gets printed.
pub fn initialize_panic_handler() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "bytelens crashed. Please file an issue at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .display_location_section(true)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        _ = ratatui::crossterm::execute!(std::io::stdout(), DisableMouseCapture);

        let report = panic_hook.panic_report(panic_info).to_string();
        tracing::error!("Panicked: {}", strip_ansi_escapes::strip_str(&report));

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{Metadata, handle_dump, print_msg};
            eprintln!("{report}");
            let meta = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
                .authors(env!("CARGO_PKG_AUTHORS"))
                .support(format!("Issues: {}", env!("CARGO_PKG_REPOSITORY")));
            let dump = handle_dump(&meta, panic_info);
            _ = print_msg(dump, &meta);
        }

        #[cfg(debug_assertions)]
        better_panic::Settings::auto()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .create_panic_handler()(panic_info);

        std::process::exit(libc::EXIT_FAILURE);
    }));
    Ok(())
}
