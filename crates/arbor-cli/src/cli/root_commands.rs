use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::cli::subcommands::LogsCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// List imported topics.
    Topics,
    /// Show the nodes of a topic in import order.
    Nodes(NodesArgs),
    /// Replace a topic with the contents of a CSV (or JSON) file.
    Import(ImportArgs),
    /// Delete every node of a topic.
    Delete(DeleteArgs),
    /// Walk a topic, interactively or with scripted choices.
    Walk(WalkArgs),
    /// Search node questions and topic names.
    Search(SearchArgs),
    /// Usage log.
    Logs {
        #[command(subcommand)]
        action: LogsCommands,
    },
    /// Dump JSON schema for a registered type.
    Schema(SchemaArgs),
}

/// Arguments for `arb nodes`.
#[derive(Clone, Debug, Args)]
pub struct NodesArgs {
    #[arg(value_parser = parse_topic)]
    pub topic: String,
}

/// Arguments for `arb import`.
#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// Topic to replace.
    #[arg(value_parser = parse_topic)]
    pub topic: String,
    /// Input file.
    pub file: PathBuf,
    /// Column separator, `,` or `;` (auto-detected when omitted).
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Read the file as an extraction-service JSON payload instead of CSV.
    #[arg(long)]
    pub json: bool,
    /// Validate and report without touching the store.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `arb delete`.
#[derive(Clone, Debug, Args)]
pub struct DeleteArgs {
    #[arg(value_parser = parse_topic)]
    pub topic: String,
}

/// Arguments for `arb walk`.
#[derive(Clone, Debug, Args)]
pub struct WalkArgs {
    #[arg(value_parser = parse_topic)]
    pub topic: String,
    /// Option label to follow; repeat for each step. Omit for an interactive prompt.
    #[arg(long)]
    pub choose: Vec<String>,
}

/// Arguments for `arb search`.
#[derive(Clone, Debug, Args)]
pub struct SearchArgs {
    pub query: String,
}

/// Arguments for `arb schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub type_name: SchemaType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    Node,
    UsageEntry,
    SessionState,
}

/// Topic names are stored trimmed.
fn parse_topic(value: &str) -> Result<String, String> {
    let topic = value.trim();
    if topic.is_empty() {
        return Err("topic must not be blank".to_string());
    }
    Ok(topic.to_string())
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "," => Ok(b','),
        ";" => Ok(b';'),
        other => Err(format!("expected ',' or ';', got '{other}'")),
    }
}
