pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use taptime::{
    app_dirs::AppDirs,
    clock::MonotonicClock,
    config::{Config, ConfigStore, EngineConfig, FileConfigStore, Preset},
    export,
    runtime::{CrosstermEventSource, FixedTicker, Runner, TapEvent, TapEventSource, Ticker},
    session::Session,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_TICK_RATE_MS: u64 = 33;

/// measure how long you press and how long you wait between presses
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Press and release the left mouse button (or hold Space on terminals that report key releases) to record taps. Durations, gaps and their statistics are shown live and can be exported as CSV or JSON."
)]
pub struct Cli {
    /// parameter preset to start from
    #[clap(long, value_enum)]
    preset: Option<Preset>,

    /// presses shorter than this many milliseconds are ignored
    #[clap(long)]
    min_press_ms: Option<u64>,

    /// background fade step per frame (1-100)
    #[clap(long)]
    background_step: Option<u8>,

    /// share of the terminal height reserved for the control strip (0.0-0.9)
    #[clap(long)]
    reserved_ui_fraction: Option<f64>,

    /// number of recent taps drawn in the plot
    #[clap(long)]
    window_size: Option<usize>,

    /// enable or disable the event log panel (true/false)
    #[clap(long)]
    log_panel: Option<bool>,

    /// directory taps.csv / taps.json are written to (default: current directory)
    #[clap(short = 'o', long)]
    export_dir: Option<PathBuf>,

    /// diagnostics log file (default: ~/.local/state/taptime/taptime.log)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// frame interval in milliseconds
    #[clap(long, default_value_t = DEFAULT_TICK_RATE_MS)]
    tick_ms: u64,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Settings given on the command line, layered over the config file
    fn to_overrides(&self) -> Config {
        Config {
            preset: self.preset,
            min_press_ms: self.min_press_ms,
            background_step: self.background_step,
            reserved_ui_fraction: self.reserved_ui_fraction,
            window_size: self.window_size,
            log_panel: self.log_panel,
            export_dir: self.export_dir.clone(),
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub export_dir: PathBuf,
    /// last command result, shown in the control strip
    pub status: Option<String>,
}

impl App {
    pub fn new(engine: EngineConfig, export_dir: PathBuf) -> Self {
        Self {
            session: Session::new(engine),
            export_dir,
            status: None,
        }
    }

    /// Apply one event. Returns false when the app should quit.
    pub fn on_event(&mut self, event: TapEvent) -> bool {
        match event {
            TapEvent::Tick => self.session.tick(),
            TapEvent::Resize(width, height) => self.session.resize(width, height),
            TapEvent::PressStart { at_ms, row } => {
                self.session.press_start(at_ms, row);
            }
            TapEvent::PressEnd { at_ms } => {
                self.session.press_end(at_ms);
            }
            TapEvent::Key(key) => return self.on_key(key),
            TapEvent::Closed => {
                tracing::warn!("terminal input closed");
                return false;
            }
        }
        true
    }

    fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Char('c') => {
                let result = export::export_csv(&self.export_dir, self.session.history());
                self.report_export(result);
            }
            KeyCode::Char('j') => {
                let result = export::export_json(
                    &self.export_dir,
                    self.session.history(),
                    self.session.extrema(),
                );
                self.report_export(result);
            }
            KeyCode::Char('l') => {
                self.session.toggle_log();
            }
            _ => {}
        }
        true
    }

    fn report_export(&mut self, result: Result<PathBuf, export::ExportError>) {
        let status = match result {
            Ok(path) => format!("saved {}", path.display()),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                format!("export failed: {e}")
            }
        };
        self.session.note(status.clone());
        self.status = Some(status);
    }
}

/// Owns the terminal modes switched on at startup and switches them off on drop
struct TerminalGuard<W: Write> {
    out: W,
    keyboard_presses: bool,
}

impl TerminalGuard<io::Stdout> {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut guard = Self {
            out: io::stdout(),
            keyboard_presses: false,
        };
        execute!(guard.out, EnterAlternateScreen, EnableMouseCapture)?;
        if matches!(supports_keyboard_enhancement(), Ok(true)) {
            guard.keyboard_presses = true;
            execute!(
                guard.out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.keyboard_presses {
            let _ = execute!(self.out, PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(
            self.out,
            DisableMouseCapture,
            LeaveAlternateScreen,
            cursor::Show
        );
    }
}

fn init_tracing(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taptime=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing(&cli.log_file.clone().unwrap_or_else(AppDirs::log_path));

    let store = FileConfigStore::new();
    let config = store.load().overlay(cli.to_overrides());
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "saved config");
    }
    let engine = config.engine();
    let export_dir = config
        .export_dir
        .clone()
        .unwrap_or_else(AppDirs::default_export_dir);
    tracing::info!(?engine, export_dir = %export_dir.display(), "starting");

    // restored on every exit below, including `?` returns
    let guard = TerminalGuard::enter()?;
    let keyboard_presses = guard.keyboard_presses;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(engine, export_dir);
    let size = terminal.size()?;
    app.session.resize(size.width, size.height);

    let runner = Runner::new(
        CrosstermEventSource::new(MonotonicClock::new(), keyboard_presses),
        FixedTicker::new(Duration::from_millis(cli.tick_ms.max(1))),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    drop(guard);
    result
}

fn start_tui<B: Backend, E: TapEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        if !app.on_event(runner.step()) {
            break;
        }
        terminal.draw(|f| ui(app, f))?;
    }

    tracing::info!(taps = app.session.history().len(), "session ended");
    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
