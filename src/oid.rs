use sha1::{Digest, Sha1};
use std::fmt::{Debug, Display};
use std::str::FromStr;

use crate::error::Error;

pub const OID_SIZE: usize = 20;
pub const OID_HEX_SIZE: usize = OID_SIZE * 2;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid {
    hash: [u8; OID_SIZE],
}

impl Oid {
    /// Hashes `data` as-is. Callers pass the full `<kind> <len>\0<payload>`
    /// encoding; the id of an object is the digest of exactly those bytes.
    pub fn new(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        let hash = hasher.finalize();
        Self { hash: hash.into() }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let hash: [u8; OID_SIZE] = bytes.try_into().map_err(|_| {
            Error::invalid(format!(
                "object id must be {OID_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { hash })
    }

    pub fn as_bytes(&self) -> &[u8; OID_SIZE] {
        &self.hash
    }

    /// Fan-out directory and file name of this object inside the objects dir.
    pub fn split_path(&self) -> (String, String) {
        let mut hex = self.to_string();
        let rest = hex.split_off(2);
        (hex, rest)
    }
}

impl Debug for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oid({})", base16ct::lower::encode_string(&self.hash))
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", base16ct::lower::encode_string(&self.hash))
    }
}

impl From<Oid> for String {
    fn from(value: Oid) -> Self {
        value.to_string()
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OID_HEX_SIZE {
            return Err(Error::invalid(format!(
                "object id must be {OID_HEX_SIZE} hex characters: {s:?}"
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|e| Error::invalid(format!("malformed object id {s:?}: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl TryFrom<String> for Oid {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
