use std::fmt::Display;

use crate::oid::Oid;

use chrono::{DateTime, FixedOffset, TimeZone};

/// Identity plus timestamp, as written on `author` and `committer` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    name: String,
    email: String,
    a_time: DateTime<FixedOffset>,
}

impl Author {
    pub fn new<Tz: TimeZone>(name: String, email: String, atime: DateTime<Tz>) -> Self {
        Self {
            a_time: atime.fixed_offset(),
            name,
            email,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unix_timestamp = self.a_time.timestamp();
        let utc_offset = self.a_time.format("%z");

        write!(
            f,
            "{} <{}> {} {}",
            self.name, self.email, unix_timestamp, utc_offset
        )
    }
}

/// Commit metadata. `tree` and `parent` are written as given; nothing here
/// checks that they name stored objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    tree: Oid,
    parent: Option<Oid>,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(
        tree_oid: Oid,
        parent: Option<Oid>,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Self {
            tree: tree_oid,
            parent,
            author,
            committer,
            message,
        }
    }

    pub fn tree(&self) -> &Oid {
        &self.tree
    }

    pub fn parent(&self) -> Option<&Oid> {
        self.parent.as_ref()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "tree {}\n{}author {}\ncommitter {}\n\n{}",
            self.tree,
            match self.parent {
                Some(parent) => format!("parent {}\n", parent),
                None => String::new(),
            },
            self.author,
            self.committer,
            self.message
        )
        .into()
    }
}
