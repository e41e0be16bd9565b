use super::range_of;
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, KvCursor};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// On-disk snapshot layout: `[crc32 (LE)][bincode(Snapshot)]`.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

const CHECKSUM_LEN: usize = 4;

/// File-backed key-value store for development and light production.
///
/// The whole key space is held in memory and rewritten to disk after every
/// committed write (temp file + rename). An exclusive lock on `<path>.lock`
/// is held for the lifetime of the store, so two processes cannot share a
/// data file.
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    lock_file: File,
    lock_path: PathBuf,
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl FileBackedKVStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if another handle holds the lock
    /// - `CorruptionError` if the snapshot fails its checksum or cannot be decoded
    /// - `IOError` on filesystem failures
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let lock_path = sibling(&path, ".lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_error)?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| KVStoreError::Unavailable {
                message: format!("{} is locked by another handle", path.display()),
            })?;

        let data = Self::load_from_file(&path)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[ledger] opened {} ({} keys)", path.display(), data.len());

        Ok(Self {
            data,
            path,
            lock_file,
            lock_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(io_error(e)),
        };

        if bytes.len() < CHECKSUM_LEN {
            return Err(KVStoreError::CorruptionError {
                message: format!("{} is truncated ({} bytes)", path.display(), bytes.len()),
            });
        }

        let (header, payload) = bytes.split_at(CHECKSUM_LEN);
        let expected = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let actual = crc32fast::hash(payload);
        if expected != actual {
            return Err(KVStoreError::CorruptionError {
                message: format!(
                    "{} checksum mismatch: expected {:08x}, got {:08x}",
                    path.display(),
                    expected,
                    actual
                ),
            });
        }

        let snapshot: Snapshot =
            bincode::deserialize(payload).map_err(|e| KVStoreError::CorruptionError {
                message: e.to_string(),
            })?;
        Ok(snapshot.entries.into_iter().collect())
    }

    fn save_to_file(&self, data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        let snapshot = Snapshot {
            entries: data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        let payload = bincode::serialize(&snapshot).map_err(|e| KVStoreError::IOError {
            message: e.to_string(),
        })?;

        let temp_path = sibling(&self.path, ".tmp");
        let mut file = File::create(&temp_path).map_err(io_error)?;
        file.write_all(&crc32fast::hash(&payload).to_le_bytes())
            .map_err(io_error)?;
        file.write_all(&payload).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;

        std::fs::rename(&temp_path, &self.path).map_err(io_error)
    }
}

impl Drop for FileBackedKVStore {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
        let _ = std::fs::remove_file(&self.lock_path);
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Stage on a copy; memory only changes once the snapshot is on disk.
        let mut next = self.data.clone();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    next.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    next.remove(&key);
                }
            }
        }
        self.save_to_file(&next)?;
        self.data = next;
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<KvCursor<'_>, KVStoreError> {
        Ok(Box::new(
            range_of(&self.data, start, end).map(|(k, v)| Ok((k.clone(), v.clone()))),
        ))
    }
}
