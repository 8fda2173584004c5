use std::{ffi::OsString, path::Path};

use bstr::ByteVec;
use tracing::debug;

use crate::error::{Error, Result};
use crate::oid::Oid;

use super::db::Db;
use super::object::blob::Blob;
use super::object::tree::{Mode, Tree};
use super::workspace::{EntryKind, Workspace};
use super::GIT_DIR;

/// Order of entries inside each written tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// Git's canonical order, so equal directories always hash the same.
    #[default]
    Canonical,
    /// Whatever order the filesystem lists entries in.
    Listing,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub ignore: Vec<OsString>,
    pub order: EntryOrder,
    /// Record files with an execute bit as `100755`. Off by default, so
    /// every file is written as `100644` whatever its permissions.
    pub executable_mode: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            ignore: vec![OsString::from(GIT_DIR)],
            order: EntryOrder::default(),
            executable_mode: false,
        }
    }
}

/// Snapshots a directory into blob and tree objects.
pub struct TreeBuilder<'a> {
    workspace: &'a Workspace,
    db: &'a Db,
    options: &'a BuildOptions,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(workspace: &'a Workspace, db: &'a Db, options: &'a BuildOptions) -> Self {
        Self {
            workspace,
            db,
            options,
        }
    }

    /// Writes the whole workspace. `None` means there was nothing to
    /// snapshot: no tree object is written for an empty root.
    pub fn build(&self) -> Result<Option<Oid>> {
        self.build_dir(&self.workspace.root)
    }

    fn build_dir(&self, dir: &Path) -> Result<Option<Oid>> {
        let mut tree = Tree::new();

        for entry in self.workspace.list_dir(dir, &self.options.ignore)? {
            let mode = match entry.kind {
                EntryKind::File { executable } if executable && self.options.executable_mode => {
                    Mode::Executable
                }
                EntryKind::File { .. } => Mode::Regular,
                EntryKind::Directory => Mode::Directory,
                EntryKind::Other => {
                    debug!(path = %entry.path.display(), "skipping non-regular file");
                    continue;
                }
            };

            let oid = if mode == Mode::Directory {
                match self.build_dir(&entry.path)? {
                    Some(oid) => oid,
                    None => {
                        debug!(path = %entry.path.display(), "omitting empty directory");
                        continue;
                    }
                }
            } else {
                let data = self.workspace.read_entry(&entry)?;
                self.db.store_object(Blob::new(data))?
            };

            let name = Vec::<u8>::from_os_string(entry.name).map_err(|name| {
                Error::invalid(format!("file name {name:?} is not representable as bytes"))
            })?;
            tree.add_entry(mode, name, oid)?;
        }

        if tree.is_empty() {
            return Ok(None);
        }

        if self.options.order == EntryOrder::Canonical {
            tree.sort_canonical();
        }

        self.db.store_object(tree).map(Some)
    }
}
