use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use gallerat::event_source::KeyboardEventSource;
use gallerat::panic_handler;
use gallerat::settings;
use gallerat::{App, run_app_with_event_source};

/// Browse the pictures of a directory one at a time
#[derive(Parser, Debug)]
#[command(name = "gallerat", version, about)]
struct Cli {
    /// Directory to browse
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Pictures to keep loaded on each side of the current one
    #[arg(long)]
    steps: Option<usize>,

    /// Longest edge of loaded pictures, in pixels
    #[arg(long)]
    max_edge: Option<u32>,

    /// Number of background decoding threads
    #[arg(long)]
    workers: Option<usize>,

    /// Settings file (default: <config dir>/gallerat/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the debug log
    #[arg(long, default_value = "gallerat.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?,
    )?;

    info!("Starting gallerat");

    match &cli.config {
        Some(path) => settings::load_settings_from(path),
        None => settings::load_settings(),
    }
    let mut config = settings::current();
    if let Some(steps) = cli.steps {
        config.lookahead_steps = steps;
    }
    if let Some(max_edge) = cli.max_edge {
        config.max_edge = max_edge;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    settings::override_settings(config);
    let config = settings::current();

    // Fail on an unreadable directory before touching the terminal
    let mut app = App::open(&cli.dir, &config)?;

    panic_handler::initialize_panic_handler();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app_with_event_source(
        &mut terminal,
        &mut app,
        &mut KeyboardEventSource,
        Duration::from_millis(settings::get_tick_ms()),
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {:?}", err);
        println!("{err:?}");
    }

    // Dropping the app stops the load workers
    drop(app);
    info!("Shutting down gallerat");
    Ok(())
}
