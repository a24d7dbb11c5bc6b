use std::{
    io::{self, stdin, Stdout},
    path::PathBuf,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use nuggettype::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    corpus::Corpus,
    logging,
    runtime::{AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

/// type the quote, beat the clock
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A tiny typing speed game. Type the sentence shown, the timer starts on your first keystroke and stops when the sentence matches exactly."
)]
pub struct Cli {
    /// custom sentence to type instead of a random quote
    #[clap(short = 'p', long)]
    sentence: Option<String>,

    /// file to draw sentences from (.json corpus or one sentence per line)
    #[clap(short = 'c', long)]
    corpus: Option<PathBuf>,

    /// how often the timer refreshes while typing, in milliseconds
    #[clap(long)]
    tick_rate_ms: Option<u64>,

    /// store the effective settings in the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn resolve_config(&self, store: &impl ConfigStore) -> Config {
        store
            .load()
            .with_overrides(self.tick_rate_ms, self.corpus.clone())
    }

    fn load_corpus(&self, config: &Config) -> Result<Corpus> {
        if let Some(ref sentence) = self.sentence {
            if sentence.trim().is_empty() {
                bail!("custom sentence is empty");
            }
            return Ok(Corpus::single(sentence.clone()));
        }

        match config.corpus_file {
            Some(ref path) => Corpus::from_path(path),
            None => Ok(Corpus::builtin()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("logging disabled: {e:#}");
        }
    }

    let store = FileConfigStore::new();
    let config = cli.resolve_config(&store);
    if cli.save_config {
        store
            .save(&config)
            .with_context(|| format!("saving config to {}", store.path().display()))?;
        info!("saved config to {}", store.path().display());
    }

    let corpus = cli.load_corpus(&config)?;
    info!(
        "starting with corpus {:?} ({} sentences), tick {}ms",
        corpus.name,
        corpus.sentences.len(),
        config.tick_rate_ms
    );
    let mut app = App::new(corpus)?;

    enable_raw_mode().context("enabling raw mode")?;
    let mut terminal = restore_on_error(open_terminal(), disable_raw_mode)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_interval()),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn open_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Undo terminal setup before handing a failed result back.
fn restore_on_error<T>(result: Result<T>, restore: impl FnOnce() -> io::Result<()>) -> Result<T> {
    if result.is_err() {
        if let Err(e) = restore() {
            warn!("failed to restore terminal: {e}");
        }
    }
    result
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<()> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while let Some(event) = runner.step(app.session.is_ticking()) {
        match event {
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.handle_key(key, Instant::now()) == Control::Quit {
                    break;
                }
            }
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    if !app.session.has_finished() {
        warn!("quit during phase {}", app.session.phase);
    }

    Ok(())
}
