use std::{
    fs::File,
    io::stdout,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{LevelFilter, WriteLogger};

use komaread::config::load_config;
use komaread::content_store::DirectoryStore;
use komaread::event_source::KeyboardEventSource;
use komaread::panic_handler::initialize_panic_handler;
use komaread::paths::{resolve_log_path, resolve_store_path};
use komaread::storage::{JsonFileStore, shared};
use komaread::{App, run_app_with_event_source};

/// Terminal reader for numbered comic libraries, read right to left.
#[derive(Parser, Debug)]
#[command(name = "komaread", version, about)]
struct Args {
    /// Library directory holding the 001, 002, ... book folders
    #[arg(default_value = ".")]
    library_dir: PathBuf,

    /// Open this book (e.g. 002) straight away
    #[arg(long, value_name = "ID")]
    book: Option<String>,

    /// Page image extension, overriding the config file
    #[arg(long, value_name = "EXT")]
    page_ext: Option<String>,

    /// Keep bookmarks and settings in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) -> Result<PathBuf> {
    let log_path = resolve_log_path()?;
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(
        level,
        simplelog::Config::default(),
        File::create(&log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?,
    )?;
    Ok(log_path)
}

fn open_store(library_dir: &Path, ephemeral: bool) -> JsonFileStore {
    if ephemeral {
        return JsonFileStore::ephemeral();
    }
    match resolve_store_path(library_dir) {
        Ok(path) => JsonFileStore::load_or_ephemeral(Some(&path)),
        Err(e) => {
            warn!("No persistent store available, running ephemeral: {e:#}");
            JsonFileStore::ephemeral()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_path = init_logging(args.debug)?;
    initialize_panic_handler();

    info!("Starting komaread, logging to {}", log_path.display());

    let library_dir = args
        .library_dir
        .canonicalize()
        .with_context(|| format!("Library directory {} not found", args.library_dir.display()))?;

    let mut config = load_config();
    if let Some(ext) = args.page_ext {
        config.page_extension = ext.trim_start_matches('.').to_string();
    }

    let store = shared(open_store(&library_dir, args.ephemeral));
    let content = DirectoryStore::new(&library_dir);
    let mut app = App::new(
        config,
        Box::new(content),
        library_dir.display().to_string(),
        store,
    );

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    // Lay the screen out once so the first book opens with a real viewport.
    terminal.draw(|f| app.draw(f))?;

    if let Some(book_id) = args.book.as_deref() {
        if let Err(e) = app.open_book(book_id) {
            error!("{e:#}");
        }
    }

    let res = run_app_with_event_source(&mut terminal, &mut app, &mut KeyboardEventSource);
    drop(app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down komaread");
    Ok(())
}
