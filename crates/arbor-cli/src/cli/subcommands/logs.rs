use clap::Subcommand;

/// Usage log administration.
#[derive(Clone, Debug, Subcommand)]
pub enum LogsCommands {
    /// List entries, newest first (`--limit` caps the count).
    List,
    /// Delete every entry.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}
