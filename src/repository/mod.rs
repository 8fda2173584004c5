use std::{env, fs, path::Path, path::PathBuf};

use chrono::{DateTime, FixedOffset, Local};
use db::Db;
use email_address::EmailAddress;
use object::{
    blob::Blob,
    commit::{Author, Commit},
    tree::Tree,
    DbObject, ObjectKind,
};
use tracing::{debug, warn};
use tree_builder::{BuildOptions, TreeBuilder};
use workspace::Workspace;

use crate::error::Result;
use crate::oid::Oid;

pub mod db;
pub mod object;
pub mod tree_builder;
pub mod workspace;

pub const GIT_DIR: &str = ".git";

const DEFAULT_NAME: &str = "mingit";
const DEFAULT_EMAIL: &str = "mingit@localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub author: ConfigUser,
    pub committer: ConfigUser,
}

fn env_var(key: &str) -> Option<String> {
    env::var_os(key)
        .map(|var| var.to_string_lossy().to_string())
        .filter(|var| !var.is_empty())
}

impl ConfigUser {
    fn from_env(name_key: &str, email_key: &str, fallback: Option<&ConfigUser>) -> Self {
        let name = env_var(name_key)
            .or_else(|| fallback.map(|user| user.name.clone()))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let email = env_var(email_key)
            .or_else(|| fallback.map(|user| user.email.clone()))
            .unwrap_or_else(|| DEFAULT_EMAIL.to_string());

        if !EmailAddress::is_valid(&email) {
            warn!(%email, "{email_key} does not look like an email address");
        }

        Self { name, email }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let author = ConfigUser::from_env("GIT_AUTHOR_NAME", "GIT_AUTHOR_EMAIL", None);
        let committer =
            ConfigUser::from_env("GIT_COMMITTER_NAME", "GIT_COMMITTER_EMAIL", Some(&author));

        Self { author, committer }
    }
}

/// Source of commit timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// A working directory and the object store under its `.git`. All paths
/// derive from the root handed to [`Repository::open`].
pub struct Repository {
    root: PathBuf,
    workspace: Workspace,
    db: Db,
    config: Config,
    clock: Box<dyn Clock>,
}

impl Repository {
    pub fn open(path: PathBuf) -> Self {
        Self::with_config(path, Config::from_env(), Box::new(SystemClock))
    }

    pub fn with_config(path: PathBuf, config: Config, clock: Box<dyn Clock>) -> Self {
        let git_path = path.join(GIT_DIR);

        Self {
            workspace: Workspace::new(path.clone()),
            db: Db::new(git_path.join("objects")),
            root: path,
            config,
            clock,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_path(&self) -> PathBuf {
        self.root.join(GIT_DIR)
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn init(&self) -> Result<()> {
        let git_path = self.git_path();
        fs::create_dir_all(&git_path)?;
        self.db.init()?;
        fs::create_dir_all(git_path.join("refs"))?;
        fs::write(git_path.join("HEAD"), "ref: refs/heads/main\n")?;
        debug!(path = %git_path.display(), "initialized repository");
        Ok(())
    }

    /// Blob id of a file's contents, optionally storing the blob.
    pub fn hash_object(&self, path: &Path, write: bool) -> Result<Oid> {
        let data = self.workspace.read_file(path)?;
        if write {
            self.db.store_object(Blob::new(data))
        } else {
            Ok(self.db.hash(ObjectKind::Blob, &data))
        }
    }

    pub fn cat_file(&self, oid: &Oid) -> Result<DbObject> {
        self.db.load(oid)
    }

    pub fn ls_tree(&self, oid: &Oid) -> Result<Tree> {
        self.db.load(oid)?.to_tree()
    }

    pub fn write_tree(&self) -> Result<Option<Oid>> {
        self.write_tree_with(&BuildOptions::default())
    }

    pub fn write_tree_with(&self, options: &BuildOptions) -> Result<Option<Oid>> {
        TreeBuilder::new(&self.workspace, &self.db, options).build()
    }

    /// Stores a commit of `tree`. The tree and parent ids are taken on
    /// trust: neither is checked against the store.
    pub fn commit_tree(&self, tree: Oid, parent: Option<Oid>, message: &str) -> Result<Oid> {
        let now = self.clock.now();
        let author = Author::new(
            self.config.author.name.clone(),
            self.config.author.email.clone(),
            now,
        );
        let committer = Author::new(
            self.config.committer.name.clone(),
            self.config.committer.email.clone(),
            now,
        );

        let commit = Commit::new(tree, parent, author, committer, message.to_owned());
        self.db.store_object(commit)
    }
}
