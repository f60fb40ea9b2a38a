use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shelfmark")]
#[command(version)]
#[command(about = "Reading progress tracking and highlight sync for markdown vaults")]
#[command(
    long_about = "shelfmark - Track reading progress and sync highlights in a markdown vault.\n\n\
    Books are markdown documents in the configured book folder. Highlights written as\n\
    ==text%%^id^%%== are mirrored into reading-notes documents, and random quotes from\n\
    those notes can be spotlighted on a home document.\n\n\
    Examples:\n  \
    shelfmark sync                                # Sync every tagged book\n  \
    shelfmark sync Books/Dune.md                  # Sync one book\n  \
    shelfmark spotlight                           # Refresh quotes on the home document\n  \
    shelfmark highlight Books/Dune.md -l 12 --from 4 --to 20\n  \
    shelfmark status Books/Dune.md -o json        # Reading time and progress"
)]
pub struct Cli {
    /// Vault root directory
    ///
    /// All document paths are relative to this directory and use '/' as separator.
    #[arg(long = "vault", value_name = "DIR", default_value = ".", global = true)]
    pub vault: PathBuf,

    /// Config file to use instead of the default location
    ///
    /// Default: ~/.config/shelfmark/config.toml (platform config dir elsewhere).
    /// A missing or malformed file given here is an error.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync reading notes for one book, or for every tagged book
    ///
    /// Writes <notes folder>/<book file name> only when its content changed.
    Sync {
        /// Book to sync (vault-relative). Omit to sync all books.
        path: Option<String>,
    },

    /// Refresh the quote region of the home document
    ///
    /// The home document must contain a %%quote|N%% ... %%quote-end%% region.
    Spotlight,

    /// Highlight a span on one line and attach a block id
    ///
    /// Columns are byte offsets into the line. The block containing the end of the
    /// span receives a ^id marker if it has none yet.
    Highlight {
        /// Document to edit (vault-relative)
        path: String,

        #[command(flatten)]
        span: SpanArgs,

        /// Idea to attach; prompts when omitted
        #[arg(short = 'n', long = "note", value_name = "TEXT")]
        note: Option<String>,
    },

    /// Replace a span with a link to a card note, creating the card
    Card {
        /// Document to edit (vault-relative)
        path: String,

        #[command(flatten)]
        span: SpanArgs,
    },

    /// Show reading time and progress of a book
    ///
    /// Opening a book this way behaves like opening it in the editor: it may ask
    /// to record the reading or completion date.
    Status {
        /// Book to inspect (vault-relative)
        path: String,

        /// Output format
        #[arg(short = 'o', long = "output", default_value = "plain")]
        output: OutputFormat,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the default config location
        #[arg(long = "save")]
        save: bool,
    },
}

/// A span on a single line.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct SpanArgs {
    /// Line number (1-based)
    #[arg(short = 'l', long = "line", value_name = "LINE")]
    pub line: usize,

    /// Start column (0-based byte offset)
    #[arg(long = "from", value_name = "COL")]
    pub from: usize,

    /// End column (0-based byte offset, exclusive)
    #[arg(long = "to", value_name = "COL")]
    pub to: usize,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// JSON output
    Json,
}
