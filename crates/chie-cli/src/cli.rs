use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use chie_core::VERSION;

/// Chie - an encrypted personal journal with tasks and events
#[derive(Parser)]
#[command(name = "chie")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the database file
    #[arg(long, global = true, env = "CHIE_DB")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new vault: set a password and generate a recovery phrase.
    /// On a vault that has no recovery phrase yet, unlock it and add one.
    Init(InitArgs),

    /// Manage journal entries
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Manage calendar events
    #[command(subcommand)]
    Event(EventCommand),

    /// Export all records to a JSON backup
    Export(ExportArgs),

    /// Unlock with the recovery phrase and verify the data is readable
    Recover(RecoverArgs),

    /// Show vault and storage status
    Status(StatusArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Also write the recovery key to this file
    #[arg(long, value_name = "PATH")]
    pub recovery_file: Option<String>,

    /// Directory holding legacy plaintext data to import
    #[arg(long, value_name = "DIR")]
    pub legacy_dir: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum JournalCommand {
    /// Write a new journal entry
    Add(JournalAddArgs),

    /// List journal entries, newest first
    List(ListArgs),

    /// Show a journal entry
    Show {
        /// Entry ID (full UUID or prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a journal entry
    Edit(JournalEditArgs),

    /// Delete a journal entry
    Delete(DeleteArgs),
}

/// Arguments for `journal add`
#[derive(Args)]
pub struct JournalAddArgs {
    /// Entry title
    #[arg(long)]
    pub title: Option<String>,

    /// Entry body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// Set custom date/time (ISO-8601 or YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Mood scores as pleasure,arousal,dominance (each -1 to 1)
    #[arg(long, value_name = "P,A,D", allow_hyphen_values = true)]
    pub sentiment: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for `journal edit`
#[derive(Args)]
pub struct JournalEditArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New body (opens the editor when neither --title nor --body is given)
    #[arg(long)]
    pub body: Option<String>,

    /// New mood scores as pleasure,arousal,dominance; empty clears them
    #[arg(long, value_name = "P,A,D", allow_hyphen_values = true)]
    pub sentiment: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task
    Add {
        /// Task text
        #[arg(value_name = "TEXT")]
        text: String,

        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// List tasks, oldest first
    List {
        /// Only show tasks that are not completed
        #[arg(long)]
        pending: bool,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Mark a task completed
    Done {
        /// Task ID (full UUID or prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Mark as not completed instead
        #[arg(long)]
        undo: bool,

        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// Delete a task
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
pub enum EventCommand {
    /// Add a calendar event
    Add {
        /// Event title
        #[arg(value_name = "TITLE")]
        title: String,

        /// When the event happens (ISO-8601 or YYYY-MM-DD)
        #[arg(long, value_name = "DATETIME")]
        at: String,

        /// Event description
        #[arg(long, default_value = "")]
        description: String,

        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// List events, soonest first
    List {
        /// Only show events that have not happened yet
        #[arg(long)]
        upcoming: bool,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Delete an event
    Delete(DeleteArgs),
}

/// Shared arguments for list commands
#[derive(Args)]
pub struct ListArgs {
    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Shared arguments for delete commands
#[derive(Args)]
pub struct DeleteArgs {
    /// Record ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `export` command
#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: Chie_Backup_YYYY-MM-DD.json in the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Seal the backup with an age passphrase
    #[arg(long)]
    pub seal: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `recover` command
#[derive(Args)]
pub struct RecoverArgs {
    /// Write a backup after a successful recovery unlock
    #[arg(long, value_name = "PATH")]
    pub export: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `status` command
#[derive(Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_command() {
        let cli = Cli::try_parse_from(["chie", "task", "done", "0190abcd", "--undo"]).unwrap();
        match cli.command {
            Commands::Task(TaskCommand::Done { id, undo, .. }) => {
                assert_eq!(id, "0190abcd");
                assert!(undo);
            }
            _ => panic!("expected task done"),
        }
    }

    #[test]
    fn test_event_requires_time() {
        assert!(Cli::try_parse_from(["chie", "event", "add", "Dentist"]).is_err());
    }
}
