//! # shelfmark
//!
//! Command-line front end for the shelfmark reading engine.
//!
//! ## Usage
//!
//! Sync reading notes for every tagged book:
//! ```sh
//! shelfmark --vault ~/Notes sync
//! ```
//!
//! Highlight columns 4..20 of line 12:
//! ```sh
//! shelfmark highlight Books/Dune.md -l 12 --from 4 --to 20 --note "fear"
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

mod cli;

use clap::Parser as ClapParser;
use cli::{Cli, Command, OutputFormat, SpanArgs};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use serde::Serialize;
use shelfmark::parser::Position;
use shelfmark::tracker::status_text;
use shelfmark::{
    BufferEditor, Config, DocumentStore, FrontMatter, FsVault, ProgressTracker, Spotlight, SyncOutcome,
    TerminalUi, Toolbox, Ui,
};
use tracing_subscriber::EnvFilter;

/// Terminal prompts, with the idea prompt answered up front when `--note` is given.
struct CliUi {
    terminal: TerminalUi,
    note: Option<String>,
}

impl Ui for CliUi {
    fn confirm(&self, prompt: &str) -> bool {
        self.terminal.confirm(prompt)
    }

    fn input(&self, prompt: &str, placeholder: &str) -> Option<String> {
        match &self.note {
            Some(note) => Some(note.clone()),
            None => self.terminal.input(prompt, placeholder),
        }
    }

    fn notice(&self, message: &str) {
        self.terminal.notice(message);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    path: &'a str,
    tracked: bool,
    reading_time: u64,
    reading_time_format: String,
    reading_progress: f64,
    reading_date: Option<&'a str>,
    completion_date: Option<&'a str>,
    outlinks: Option<u64>,
    highlights: Option<u64>,
    thinks: Option<u64>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let vault = FsVault::new(&args.vault);
    let terminal = TerminalUi {
        assume: args.yes.then_some(true),
    };

    match args.command {
        Command::Sync { path } => run_sync(config, &vault, &terminal, path.as_deref()),
        Command::Spotlight => run_spotlight(&config, &vault),
        Command::Highlight { path, span, note } => {
            let ui = CliUi { terminal, note };
            run_highlight(config, &vault, &ui, &path, span)
        }
        Command::Card { path, span } => run_card(config, &vault, &path, span),
        Command::Status { path, output } => run_status(&config, &vault, &terminal, &path, &output),
        Command::Config { save } => {
            print!("{}", config.to_toml()?);
            if save {
                let path = config.save()?;
                eprintln!("Saved to {}", path.display());
            }
            Ok(())
        }
    }
}

fn editor_for(vault: &FsVault, path: &str, span: SpanArgs) -> Result<BufferEditor> {
    let line = span
        .line
        .checked_sub(1)
        .ok_or_else(|| eyre!("line numbers start at 1"))?;
    if span.from > span.to {
        return Err(eyre!("--from ({}) is after --to ({})", span.from, span.to));
    }
    let text = vault.read(path)?;
    let line_text = text
        .split('\n')
        .nth(line)
        .ok_or_else(|| eyre!("{} has no line {}", path, span.line))?;
    for col in [span.from, span.to] {
        if !line_text.is_char_boundary(col) {
            return Err(eyre!(
                "column {} on line {} is past the line end or inside a character",
                col,
                span.line
            ));
        }
    }
    Ok(BufferEditor::new(text).with_selection(
        Position { line, ch: span.from },
        Position { line, ch: span.to },
    ))
}

fn run_sync(config: Config, vault: &FsVault, ui: &dyn Ui, path: Option<&str>) -> Result<()> {
    let toolbox = Toolbox::system(config);
    match path {
        Some(path) => match toolbox.synchronizer().sync(vault, ui, path)? {
            SyncOutcome::Skipped => {
                let config = toolbox.config();
                eprintln!(
                    "{} is not a book: expected a '{}' document directly inside {}/",
                    path, config.notes.book_tag, config.tracking.folder
                );
            }
            outcome => print_outcome(path, &outcome),
        },
        None => {
            let outcomes = toolbox.sync_all(vault, ui)?;
            for (path, outcome) in &outcomes {
                print_outcome(path, outcome);
            }
            println!("{} book(s) synced", outcomes.len());
        }
    }
    Ok(())
}

fn print_outcome(path: &str, outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Created(dest) => println!("{} -> {} (created)", path, dest),
        SyncOutcome::Updated(dest) => println!("{} -> {} (updated)", path, dest),
        SyncOutcome::Unchanged => println!("{} (unchanged)", path),
        SyncOutcome::Skipped => {}
    }
}

fn run_spotlight(config: &Config, vault: &FsVault) -> Result<()> {
    let spotlight = Spotlight::new(config);
    if spotlight.refresh(vault, &mut rand::thread_rng())? {
        println!("{} refreshed", spotlight.home());
    } else {
        println!("{} unchanged", spotlight.home());
    }
    Ok(())
}

fn run_highlight(config: Config, vault: &FsVault, ui: &dyn Ui, path: &str, span: SpanArgs) -> Result<()> {
    let toolbox = Toolbox::system(config);
    let mut editor = editor_for(vault, path, span)?;
    let markup = toolbox.highlight(&mut editor, ui, &mut rand::thread_rng())?;
    vault.write(path, &editor.into_text())?;
    println!("{}", markup);
    Ok(())
}

fn run_card(config: Config, vault: &FsVault, path: &str, span: SpanArgs) -> Result<()> {
    let toolbox = Toolbox::system(config);
    let mut editor = editor_for(vault, path, span)?;
    let card = toolbox.create_card(&mut editor, vault)?;
    vault.write(path, &editor.into_text())?;
    println!("{}", card);
    Ok(())
}

fn run_status(config: &Config, vault: &FsVault, ui: &dyn Ui, path: &str, output: &OutputFormat) -> Result<()> {
    let mut tracker = ProgressTracker::system(config);
    tracker.open(vault, ui, path)?;
    let tracked = tracker.session().is_some();
    let fm: FrontMatter = vault.frontmatter(path)?;

    match output {
        OutputFormat::Plain => {
            println!("{}", status_text(fm.reading_time(), fm.reading_progress()));
            if let Some(date) = &fm.reading_date {
                println!("started:  {}", date);
            }
            if let Some(date) = &fm.completion_date {
                println!("finished: {}", date);
            }
            if !tracked {
                eprintln!("note: {} is outside {}/ and is not tracked", path, config.tracking.folder);
            }
        }
        OutputFormat::Json => {
            let report = StatusReport {
                path,
                tracked,
                reading_time: fm.reading_time(),
                reading_time_format: shelfmark::tracker::format_duration(fm.reading_time()),
                reading_progress: fm.reading_progress(),
                reading_date: fm.reading_date.as_deref(),
                completion_date: fm.completion_date.as_deref(),
                outlinks: fm.outlinks,
                highlights: fm.highlights,
                thinks: fm.thinks,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
