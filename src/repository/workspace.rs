use std::{
    ffi::OsString,
    fs::{self, Metadata},
    io,
    path::{Path, PathBuf},
};

use walkdir::{DirEntry, WalkDir};

use crate::error::Result;

/// What a directory listing entry turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File { executable: bool },
    Directory,
    /// Symlinks and special files; never followed or read.
    Other,
}

/// `path` is `dir` joined with the entry name, so it already carries the
/// workspace root.
#[derive(Debug, Clone)]
pub struct WorkspaceEntry {
    pub name: OsString,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Read-only view of the working directory.
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(path: PathBuf) -> Self {
        Self { root: path }
    }

    /// Direct children of `dir`, in the order the filesystem returns them,
    /// minus anything whose name is in `ignore`.
    pub fn list_dir(&self, dir: &Path, ignore: &[OsString]) -> Result<Vec<WorkspaceEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .follow_root_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !ignore.iter().any(|name| name == e.file_name()))
        {
            let entry = entry?;
            let kind = entry_kind(&entry)?;
            entries.push(WorkspaceEntry {
                name: entry.file_name().to_owned(),
                path: entry.into_path(),
                kind,
            });
        }
        Ok(entries)
    }

    /// Reads a file given relative to the workspace root.
    pub fn read_file(&self, path: &Path) -> std::result::Result<Vec<u8>, io::Error> {
        fs::read(self.root.join(path))
    }

    pub fn read_entry(&self, entry: &WorkspaceEntry) -> std::result::Result<Vec<u8>, io::Error> {
        fs::read(&entry.path)
    }
}

fn entry_kind(entry: &DirEntry) -> Result<EntryKind> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return Ok(EntryKind::Directory);
    }
    if !file_type.is_file() {
        return Ok(EntryKind::Other);
    }
    let metadata = entry.metadata()?;
    Ok(EntryKind::File {
        executable: is_executable(&metadata),
    })
}

#[cfg(unix)]
fn is_executable(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &Metadata) -> bool {
    false
}
