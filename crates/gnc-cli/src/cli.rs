use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gnc",
    about = "Graph Normalized Cache -- inspect and exercise cache snapshots",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the records in a snapshot, or show one record
    Inspect(InspectArgs),
    /// Report references to records that are not in the snapshot
    Check(CheckArgs),
    /// Read a query from a snapshot
    Read(ReadArgs),
    /// Write a query response into a snapshot
    Write(WriteArgs),
    /// Write a mutation response and apply mutation directives
    Mutate(MutateArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// Snapshot file (JSON)
    pub snapshot: PathBuf,
    /// Show only this record
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Snapshot file (JSON)
    pub snapshot: PathBuf,
}

/// Options shared by every command that runs a document.
#[derive(Args, Clone)]
pub struct OperationArgs {
    /// Document file (JSON-serialized document model)
    #[arg(long)]
    pub document: PathBuf,
    /// Operation to run when the document holds several
    #[arg(long)]
    pub operation: Option<String>,
    /// Variables file (JSON object)
    #[arg(long)]
    pub variables: Option<PathBuf>,
    /// Cache configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReadArgs {
    /// Snapshot file (JSON)
    pub snapshot: PathBuf,
    #[command(flatten)]
    pub op: OperationArgs,
}

#[derive(Args)]
pub struct WriteArgs {
    /// Snapshot file (JSON); created if missing
    pub snapshot: PathBuf,
    #[command(flatten)]
    pub op: OperationArgs,
    /// Response data file (JSON object)
    #[arg(long)]
    pub response: PathBuf,
    /// Write the updated snapshot here instead of over the input
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct MutateArgs {
    #[command(flatten)]
    pub write: WriteArgs,
    /// Mutation directives file (JSON array)
    #[arg(long)]
    pub directives: Option<PathBuf>,
}
