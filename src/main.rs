use std::{
    env,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Context};
use clap::Parser;
use cmd::Commands;
use mingit::Repository;

mod cmd;

fn current_dir() -> Result<PathBuf, anyhow::Error> {
    env::current_dir().with_context(|| "Can't get current working directory")
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = cmd::Cli::parse();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Init { root_path } => {
            let root = match root_path {
                Some(root) => root,
                None => current_dir()?,
            };
            Repository::open(root.clone())
                .init()
                .with_context(|| format!("Could not initialize {}", root.display()))?;
            writeln!(stdout, "Initialized git directory")?;
        }
        Commands::CatFile { pretty, object } => {
            if !pretty {
                bail!("cat-file only supports -p");
            }
            let object = Repository::open(current_dir()?).cat_file(&object)?;
            stdout.write_all(&object.pretty()?)?;
        }
        Commands::HashObject { write, file } => {
            let oid = Repository::open(current_dir()?)
                .hash_object(&file, write)
                .with_context(|| format!("could not open {} for reading", file.display()))?;
            writeln!(stdout, "{oid}")?;
        }
        Commands::LsTree { name_only, tree } => {
            let tree = Repository::open(current_dir()?).ls_tree(&tree)?;
            for entry in tree.entries() {
                if !name_only {
                    write!(
                        stdout,
                        "{:0>6} {} {}\t",
                        entry.mode(),
                        entry.mode().kind(),
                        entry.oid()
                    )?;
                }
                stdout.write_all(entry.name())?;
                writeln!(stdout)?;
            }
        }
        Commands::WriteTree {} => match Repository::open(current_dir()?).write_tree()? {
            Some(oid) => writeln!(stdout, "{oid}")?,
            None => bail!("nothing to snapshot: working directory has no files"),
        },
        Commands::CommitTree {
            tree,
            parent,
            message,
        } => {
            let oid = Repository::open(current_dir()?).commit_tree(tree, parent, &message)?;
            writeln!(stdout, "{oid}")?;
        }
    }

    Ok(())
}
