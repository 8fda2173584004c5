use std::fmt::Display;
use std::str::FromStr;

use blob::Blob;
use bstr::ByteSlice;
use commit::Commit;
use tree::Tree;

use crate::error::{Error, Result};
use crate::oid::Oid;

pub mod blob;
pub mod commit;
pub mod tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            other => Err(Error::corrupt(format!("unknown object type {other:?}"))),
        }
    }
}

/// An object in its encoded form: `<kind> <len>\0<payload>` and the id
/// derived from those bytes.
#[derive(Debug, Clone)]
pub struct DbObject {
    kind: ObjectKind,
    content: Vec<u8>,
    header_len: usize,
    oid: Oid,
}

impl DbObject {
    pub fn new(kind: ObjectKind, payload: &[u8]) -> Self {
        let mut content: Vec<u8> = Vec::with_capacity(payload.len() + 32);
        content.extend_from_slice(kind.as_str().as_bytes());
        content.push(b' ');
        content.extend_from_slice(payload.len().to_string().as_bytes());
        content.push(0);
        let header_len = content.len();
        content.extend_from_slice(payload);

        let oid = Oid::new(&content);

        Self {
            kind,
            content,
            header_len,
            oid,
        }
    }

    /// Parses decompressed object bytes. The id is taken from the caller
    /// and is not re-verified against the content.
    pub fn parse(oid: Oid, content: Vec<u8>) -> Result<Self> {
        let nul = content
            .find_byte(0)
            .ok_or_else(|| Error::corrupt(format!("{oid}: missing header terminator")))?;
        let header = content[..nul]
            .to_str()
            .map_err(|_| Error::corrupt(format!("{oid}: header is not valid UTF-8")))?;
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| Error::corrupt(format!("{oid}: malformed header {header:?}")))?;

        let kind: ObjectKind = kind.parse()?;
        let size: usize = size
            .parse()
            .map_err(|_| Error::corrupt(format!("{oid}: bad object size {size:?}")))?;

        let header_len = nul + 1;
        let actual = content.len() - header_len;
        if actual != size {
            return Err(Error::corrupt(format!(
                "{oid}: header says {size} bytes, found {actual}"
            )));
        }

        Ok(Self {
            kind,
            content,
            header_len,
            oid,
        })
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Header and payload, exactly as hashed and stored.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn data(&self) -> &[u8] {
        &self.content[self.header_len..]
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn to_tree(&self) -> Result<Tree> {
        match self.kind {
            ObjectKind::Tree => Tree::from_bytes(self.data()),
            other => Err(Error::invalid(format!(
                "{} is a {other}, not a tree",
                self.oid
            ))),
        }
    }

    /// Human-readable payload: blobs and commits verbatim, trees one entry
    /// per line.
    pub fn pretty(&self) -> Result<Vec<u8>> {
        match self.kind {
            ObjectKind::Blob | ObjectKind::Commit => Ok(self.data().to_vec()),
            ObjectKind::Tree => {
                let mut out = Vec::new();
                for entry in self.to_tree()?.entries() {
                    out.extend_from_slice(
                        format!(
                            "{:0>6} {} {}\t",
                            entry.mode(),
                            entry.mode().kind(),
                            entry.oid()
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(entry.name());
                    out.push(b'\n');
                }
                Ok(out)
            }
        }
    }
}

impl From<Object> for DbObject {
    fn from(value: Object) -> Self {
        DbObject::new(value.kind(), &value.to_bytes())
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Commit(Commit),
    Tree(Tree),
    Blob(Blob),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tree(_) => ObjectKind::Tree,
            Object::Commit(_) => ObjectKind::Commit,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Object::Blob(blob) => blob.as_bytes().to_owned(),
            Object::Tree(tree) => tree.to_bytes(),
            Object::Commit(commit) => commit.to_bytes(),
        }
    }
}

impl From<Commit> for Object {
    fn from(value: Commit) -> Self {
        Self::Commit(value)
    }
}

impl From<Tree> for Object {
    fn from(value: Tree) -> Self {
        Self::Tree(value)
    }
}

impl From<Blob> for Object {
    fn from(value: Blob) -> Self {
        Self::Blob(value)
    }
}
