//! clinote - a block-structured note editor for the terminal.
//!
//! # Usage
//!
//! ```bash
//! clinote init ~/notes
//! clinote edit clients/jane/2026-10-17.md
//! clinote --notes-dir ~/notes fmt intake.md --check
//! clinote --log-file /tmp/clinote.log edit intake.md
//! ```

mod app;
mod saver;
mod ui;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clinote_config::{Config, EditorConfig, IdStrategy};
use clinote_engine::{
    IoError, RandomIds, SequentialIds, parse_markdown, read_note, serialize, validate_notes_dir,
    write_note,
};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use relative_path::RelativePathBuf;
use std::{
    cell::RefCell,
    fs::File,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
    rc::Rc,
    time::{Duration, Instant},
};

use app::App;
use saver::DebouncedSaver;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How long the event loop sleeps when no save is pending
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Block-structured clinical note editor
#[derive(Parser, Debug)]
#[command(name = "clinote", version, about, long_about = None)]
struct Cli {
    /// Notes directory (defaults to notes_path from the config file)
    #[arg(long, global = true, value_name = "DIR")]
    notes_dir: Option<PathBuf>,

    /// Write logs to a file; RUST_LOG picks the level
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Point the config file at a notes directory
    Init {
        #[arg(value_name = "NOTES_DIR")]
        notes_dir: PathBuf,
    },
    /// Edit a note in the terminal
    Edit {
        /// Note path, relative to the notes directory
        #[arg(value_name = "NOTE")]
        note: PathBuf,
    },
    /// Rewrite a note in canonical form
    Fmt {
        /// Note path, relative to the notes directory
        #[arg(value_name = "NOTE")]
        note: PathBuf,

        /// Report whether the note is canonical without writing it
        #[arg(long)]
        check: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let editor_config = config
        .as_ref()
        .map(|c| c.editor.clone())
        .unwrap_or_default();

    match &cli.command {
        Command::Init { notes_dir } => {
            let config = init_config(notes_dir, config)?;
            config.save().with_context(|| {
                format!("Failed to write {}", Config::config_path().display())
            })?;
            println!(
                "Notes directory set to {} in {}",
                config.notes_path.display(),
                Config::config_path().display()
            );
            Ok(())
        }
        Command::Edit { note } => {
            let (notes_root, note) = resolve_note(cli.notes_dir.clone(), config, note)?;
            edit(&notes_root, note, &editor_config)
        }
        Command::Fmt { note, check } => {
            let (notes_root, note) = resolve_note(cli.notes_dir.clone(), config, note)?;
            let canonical = format_note(&notes_root, &note, *check)?;
            if *check && !canonical {
                process::exit(1);
            }
            Ok(())
        }
    }
}

/// Route logs to `--log-file` when given. The editor owns the terminal, so
/// without a file it logs nothing; other commands log to stderr.
fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    );

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if matches!(cli.command, Command::Edit { .. }) => return Ok(()),
        None => {}
    }

    builder.init();
    log::debug!("Logging initialised");
    Ok(())
}

/// Config pointing at `notes_dir`, keeping the editor settings of any
/// existing config
fn init_config(notes_dir: &Path, existing: Option<Config>) -> Result<Config> {
    validate_notes_dir(notes_dir)
        .with_context(|| format!("Cannot use '{}' as the notes directory", notes_dir.display()))?;
    let notes_path = notes_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve '{}'", notes_dir.display()))?;

    let mut config = Config::new(notes_path);
    if let Some(existing) = existing {
        config.editor = existing.editor;
    }
    Ok(config)
}

/// Work out the notes root and the note's path within it.
///
/// `--notes-dir` wins over the config file; with neither, the note path is
/// taken relative to the current directory. An absolute note path is split
/// into its directory and file name.
fn resolve_note(
    notes_dir: Option<PathBuf>,
    config: Option<Config>,
    note: &Path,
) -> Result<(PathBuf, RelativePathBuf)> {
    let (notes_root, from_config) = match (notes_dir, config) {
        (Some(dir), _) => (dir, false),
        (None, Some(config)) => (config.notes_path, true),
        (None, None) => (PathBuf::from("."), false),
    };

    let (notes_root, relative) = if note.is_absolute() {
        let Some(parent) = note.parent() else {
            bail!("Note path '{}' has no parent directory", note.display());
        };
        let Some(file_name) = note.file_name() else {
            bail!("Note path '{}' has no file name", note.display());
        };
        (
            parent.to_path_buf(),
            RelativePathBuf::from_path(file_name)
                .with_context(|| format!("Invalid note path '{}'", note.display()))?,
        )
    } else {
        (
            notes_root,
            RelativePathBuf::from_path(note)
                .with_context(|| format!("Invalid note path '{}'", note.display()))?,
        )
    };

    if let Err(e) = validate_notes_dir(&notes_root) {
        let source = if from_config {
            format!(" from config file '{}'", Config::config_path().display())
        } else {
            String::new()
        };
        bail!(
            "Notes path '{}'{} is invalid: {e}",
            notes_root.display(),
            source
        );
    }

    Ok((notes_root, relative))
}

/// Canonicalise one note. Returns whether it was already canonical.
fn format_note(notes_root: &Path, note: &RelativePathBuf, check: bool) -> Result<bool> {
    let text = read_note(note, notes_root)?;
    let canonical = serialize(&parse_markdown(&text, &mut SequentialIds::new()));

    if canonical == text {
        println!("{note} is already canonical");
        return Ok(true);
    }
    if check {
        println!("{note} is not in canonical form");
    } else {
        write_note(note, notes_root, &canonical)?;
        log::info!("Rewrote {note} ({} -> {} bytes)", text.len(), canonical.len());
        println!("Formatted {note}");
    }
    Ok(false)
}

fn edit(notes_root: &Path, note: RelativePathBuf, editor_config: &EditorConfig) -> Result<()> {
    // A note that does not exist yet starts empty and is created on first save
    let text = match read_note(&note, notes_root) {
        Ok(text) => text,
        Err(IoError::NotFound(_)) => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to open {note}")),
    };
    log::info!("Editing {note} in {}", notes_root.display());

    let saver = Rc::new(RefCell::new(DebouncedSaver::new(
        notes_root.to_path_buf(),
        note.clone(),
        Duration::from_millis(editor_config.autosave_debounce_ms),
    )));
    let mut app = match editor_config.id_strategy {
        IdStrategy::Random => App::new(&text, RandomIds, Rc::clone(&saver)),
        IdStrategy::Sequential => App::new(&text, SequentialIds::new(), Rc::clone(&saver)),
    };

    let mut terminal = setup_terminal()?;
    let session = run_app(&mut terminal, &mut app, &saver, note.as_str());
    let restore = restore_terminal(&mut terminal);
    finish_session(&saver, &note, session, restore)
}

/// Raw mode plus the alternate screen. Undoes whatever succeeded if a later
/// step fails.
fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = stdout();
    let terminal = execute!(stdout, EnterAlternateScreen)
        .and_then(|()| Terminal::new(CrosstermBackend::new(stdout)));
    match terminal {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            // The setup error is the one to report
            let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            Err(e).context("Failed to set up the terminal")
        }
    }
}

/// Runs every restore step even when an earlier one fails
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    raw.and(screen)
        .and(cursor)
        .context("Failed to restore the terminal")
}

/// Flush pending text, then report the first failure. The flush happens
/// whatever the session and restore results were.
fn finish_session(
    saver: &RefCell<DebouncedSaver>,
    note: &RelativePathBuf,
    session: Result<()>,
    restore: Result<()>,
) -> Result<()> {
    let saved = saver
        .borrow_mut()
        .flush()
        .map(|_| ())
        .with_context(|| format!("Failed to save {note}"));
    saved.and(session).and(restore)
}

fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    saver: &Rc<RefCell<DebouncedSaver>>,
    note_name: &str,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app, note_name))?;
        if app.should_quit() {
            return Ok(());
        }

        let timeout = saver
            .borrow()
            .time_until_due(Instant::now())
            .unwrap_or(IDLE_POLL);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key_event(key);
        }
        app.tick(Instant::now());
    }
}
