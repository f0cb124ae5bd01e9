use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "notedrop",
    about = "Store note attachments in an object store, a local tree or an asset manager",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log pipeline decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Attach files to a note
    Attach(AttachArgs),
    /// Upload every local embed in a note
    UploadAll(NoteArgs),
    /// Download every remote image embed in a note into the local tree
    DownloadAll(NoteArgs),
    /// Print a fresh naming seed
    NewSeed,
}

#[derive(Args)]
pub struct NoteArgs {
    /// Markdown note to edit in place
    #[arg(short, long)]
    pub note: PathBuf,
}

#[derive(Args)]
pub struct AttachArgs {
    #[command(flatten)]
    pub target: NoteArgs,

    /// Files to attach
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat the files as dragged onto the note
    #[arg(long)]
    pub dropped: bool,
}
