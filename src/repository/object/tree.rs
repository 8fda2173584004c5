use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::Display;

use bstr::{BStr, BString, ByteSlice};

use crate::error::{Error, Result};
use crate::oid::{Oid, OID_SIZE};

use super::ObjectKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Regular,
    Executable,
    Symlink,
    Gitlink,
    Directory,
    /// Any other octal mode found in a stored tree, kept as read.
    Other(u32),
}

impl Mode {
    fn bits(&self) -> u32 {
        match self {
            Mode::Regular => 0o100644,
            Mode::Executable => 0o100755,
            Mode::Symlink => 0o120000,
            Mode::Gitlink => 0o160000,
            Mode::Directory => 0o040000,
            Mode::Other(bits) => *bits,
        }
    }

    /// Kind of the object an entry with this mode points at.
    pub fn kind(&self) -> ObjectKind {
        match self.bits() & 0o170000 {
            0o040000 => ObjectKind::Tree,
            0o160000 => ObjectKind::Commit,
            _ => ObjectKind::Blob,
        }
    }

    fn parse(raw: &[u8]) -> Result<Self> {
        let malformed = || Error::corrupt(format!("malformed tree entry mode {:?}", raw.as_bstr()));
        if raw.is_empty() || !raw.iter().all(|b| (b'0'..=b'7').contains(b)) {
            return Err(malformed());
        }
        let text = raw.to_str().map_err(|_| malformed())?;
        let bits = u32::from_str_radix(text, 8).map_err(|_| malformed())?;

        Ok(match bits {
            0o100644 => Mode::Regular,
            0o100755 => Mode::Executable,
            0o120000 => Mode::Symlink,
            0o160000 => Mode::Gitlink,
            0o040000 => Mode::Directory,
            other => Mode::Other(other),
        })
    }
}

/// Octal without leading zeros, as written into tree payloads.
impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{:o}", self.bits()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    mode: Mode,
    name: BString,
    oid: Oid,
}

impl TreeEntry {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn name(&self) -> &BStr {
        self.name.as_bstr()
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.mode.to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(&self.name);
        out.push(0);
        out.extend_from_slice(self.oid.as_bytes());
    }
}

fn validate_name(name: &[u8]) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid("tree entry name is empty"));
    }
    if name == b"." || name == b".." {
        return Err(Error::invalid(format!(
            "tree entry name {:?} is reserved",
            name.as_bstr()
        )));
    }
    if name.contains(&b'/') || name.contains(&0) {
        return Err(Error::invalid(format!(
            "tree entry name {:?} contains a path separator or NUL",
            name.as_bstr()
        )));
    }
    Ok(())
}

/// Git's tree order: bytewise by name, with directories compared as if
/// their name ended in `/`.
fn canonical_cmp(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    let key = |entry: &TreeEntry| {
        let mut key = entry.name.to_vec();
        if entry.mode == Mode::Directory {
            key.push(b'/');
        }
        key
    };
    key(a).cmp(&key(b))
}

/// Entries in insertion order. No ordering is imposed unless
/// [`Tree::sort_canonical`] is called.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: Vec<TreeEntry>,
    names: HashSet<BString>,
}

// Entry order is part of the encoding, so equality is order-sensitive.
impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Tree {}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, rejecting names git could not check out and names
    /// already present in this tree.
    pub fn add_entry(&mut self, mode: Mode, name: impl Into<BString>, oid: Oid) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;

        if !self.names.insert(name.clone()) {
            return Err(Error::invalid(format!("Duplicate tree entry: {name}")));
        }
        self.entries.push(TreeEntry { mode, name, oid });

        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sort_canonical(&mut self) {
        self.entries.sort_by(canonical_cmp);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut serialized = Vec::new();
        for entry in &self.entries {
            entry.serialize(&mut serialized);
        }
        serialized
    }

    /// Decodes a tree payload. Records with an empty name are dropped;
    /// everything else is kept as stored, including modes this crate never
    /// writes and repeated names.
    pub fn from_bytes(mut data: &[u8]) -> Result<Self> {
        let mut tree = Tree::new();

        while !data.is_empty() {
            let space = data
                .find_byte(b' ')
                .ok_or_else(|| Error::corrupt("tree entry is missing its mode"))?;
            let mode = Mode::parse(&data[..space])?;
            data = &data[space + 1..];

            let nul = data
                .find_byte(0)
                .ok_or_else(|| Error::corrupt("tree entry name is not terminated"))?;
            let name = &data[..nul];
            data = &data[nul + 1..];

            if data.len() < OID_SIZE {
                return Err(Error::corrupt(format!(
                    "tree entry {:?} has a truncated object id",
                    name.as_bstr()
                )));
            }
            let (raw_oid, rest) = data.split_at(OID_SIZE);
            data = rest;

            if name.is_empty() {
                continue;
            }

            let name = BString::from(name);
            tree.names.insert(name.clone());
            tree.entries.push(TreeEntry {
                mode,
                name,
                oid: Oid::from_bytes(raw_oid)?,
            });
        }

        Ok(tree)
    }
}
