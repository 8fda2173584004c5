use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use flate2::{write::ZlibEncoder, Compression, Decompress, FlushDecompress, Status};
use rand::distributions::{Alphanumeric, DistString};
use tracing::debug;

use crate::error::{Error, Result};
use crate::oid::Oid;

use super::object::{DbObject, Object, ObjectKind};

/// Loose object store: every object lives zlib-compressed at
/// `<root>/<first two hex chars>/<remaining 38>`. The files are the only
/// state; an object exists exactly when its file does.
pub struct Db {
    root: PathBuf,
}

impl Db {
    pub fn new(objects_path: PathBuf) -> Self {
        Self { root: objects_path }
    }

    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn object_path(&self, oid: &Oid) -> PathBuf {
        let (group, rest) = oid.split_path();
        self.root.join(group).join(rest)
    }

    pub fn contains(&self, oid: &Oid) -> bool {
        self.object_path(oid).is_file()
    }

    /// Id the payload would be stored under, without touching disk.
    pub fn hash(&self, kind: ObjectKind, payload: &[u8]) -> Oid {
        *DbObject::new(kind, payload).oid()
    }

    pub fn store(&self, kind: ObjectKind, payload: &[u8]) -> Result<Oid> {
        self.write_object(&DbObject::new(kind, payload))
    }

    pub fn store_object(&self, object: impl Into<Object>) -> Result<Oid> {
        self.write_object(&DbObject::from(object.into()))
    }

    fn write_object(&self, object: &DbObject) -> Result<Oid> {
        let oid = *object.oid();
        let (group, rest) = oid.split_path();
        let group_path = self.root.join(group);
        let object_path = group_path.join(rest);

        if object_path.exists() {
            debug!(%oid, "object already stored");
            return Ok(oid);
        }

        fs::create_dir_all(&group_path)?;

        let temp_path = group_path.join(generate_temp_name());
        let file = File::create_new(&temp_path)?;

        let mut encoder = ZlibEncoder::new(file, Compression::default());
        let written = encoder
            .write_all(object.content())
            .and_then(|_| encoder.finish())
            .and_then(|file| file.sync_all());

        if let Err(e) = written.and_then(|_| fs::rename(&temp_path, &object_path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!(
            %oid,
            kind = %object.kind(),
            size = object.data().len(),
            "stored object"
        );

        Ok(oid)
    }

    /// Decompressed `<kind> <len>\0<payload>` bytes of a stored object. A
    /// stream that does not inflate, or stops before its end marker, is
    /// reported as corrupt.
    pub fn read(&self, oid: &Oid) -> Result<Vec<u8>> {
        let compressed = match fs::read(self.object_path(oid)) {
            Ok(compressed) => compressed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound { oid: *oid })
            }
            Err(e) => return Err(e.into()),
        };

        inflate(&compressed)
            .map_err(|reason| Error::corrupt(format!("{oid}: failed to decompress: {reason}")))
    }

    pub fn load(&self, oid: &Oid) -> Result<DbObject> {
        DbObject::parse(*oid, self.read(oid)?)
    }
}

fn inflate(compressed: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut inflater = Decompress::new(true);
    let mut content = Vec::with_capacity(compressed.len() * 2 + 64);

    loop {
        if content.len() == content.capacity() {
            content.reserve(content.capacity());
        }

        let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
        let consumed = in_before as usize;
        let status = inflater
            .decompress_vec(&compressed[consumed..], &mut content, FlushDecompress::Finish)
            .map_err(|e| e.to_string())?;

        if status == Status::StreamEnd {
            return Ok(content);
        }

        let input_done = inflater.total_in() as usize == compressed.len();
        let stalled = inflater.total_in() == in_before && inflater.total_out() == out_before;
        if content.len() < content.capacity() && (input_done || stalled) {
            return Err("stream ended before its end marker".to_string());
        }
    }
}

fn generate_temp_name() -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 6);
    format!("tmp_obj_{suffix}")
}
