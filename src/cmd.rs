use std::path::PathBuf;

use clap::{command, Parser, Subcommand};
use mingit::Oid;

#[derive(Parser)]
#[command(about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository
    Init {
        /// Root path
        root_path: Option<PathBuf>,
    },

    /// Print the contents of a stored object
    CatFile {
        /// Pretty-print the object's content
        #[arg(short = 'p')]
        pretty: bool,

        object: Oid,
    },

    /// Compute the blob id of a file
    HashObject {
        /// Also write the blob into the object store
        #[arg(short = 'w')]
        write: bool,

        file: PathBuf,
    },

    /// List the entries of a tree object
    LsTree {
        /// Only print entry names
        #[arg(long)]
        name_only: bool,

        tree: Oid,
    },

    /// Snapshot the working directory as a tree
    WriteTree {},

    /// Create a commit object for a tree
    CommitTree {
        tree: Oid,

        /// Parent commit
        #[arg(short = 'p')]
        parent: Option<Oid>,

        /// Commit message
        #[arg(short = 'm')]
        message: String,
    },
}
