//! Storage Gateway
//!
//! The durable record file behind each node. Records are JSON objects, one
//! per line; appends are cheap and never rewrite existing lines, so the
//! same key may appear several times. Readers resolve duplicates by file
//! order: the last line for a key wins.
//!
//! `write_all` replaces the whole file through a temp-file rename, so a
//! crash mid-rewrite leaves either the old or the new file, never a
//! half-written one. The node layers a write-through cache on top; every
//! mutation here hits the disk first.

use crate::protocol::{Key, NodeId, Records, VersionedItem};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Failure of a storage operation. Fatal for the operation that triggered
/// it, not for the node.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record file read failed: {reason}")]
    Read { reason: String },

    #[error("record file write failed: {reason}")]
    Write { reason: String },
}

impl StorageError {
    fn read(err: impl std::fmt::Display) -> Self {
        Self::Read {
            reason: err.to_string(),
        }
    }

    fn write(err: impl std::fmt::Display) -> Self {
        Self::Write {
            reason: err.to_string(),
        }
    }
}

/// One line of the record file.
#[derive(Debug, Serialize, Deserialize)]
struct RecordLine {
    key: Key,
    value: String,
    version: u64,
}

/// File-backed record storage for a single node.
///
/// The file is owned exclusively by its node; there is no cross-process
/// sharing and no locking.
pub struct FileStorage {
    path: PathBuf,
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the record file for `node_id` under
    /// `dir`. The file itself is only created on first write.
    pub fn open(dir: impl AsRef<Path>, node_id: NodeId) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(StorageError::write)?;

        Ok(Self {
            path: dir.join(format!("node-{}.jsonl", node_id)),
            dir,
        })
    }

    /// Path of the backing file, mainly for diagnostics and tests.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the record file to empty.
    pub fn clear(&self) -> Result<(), StorageError> {
        File::create(&self.path).map_err(StorageError::write)?;
        Ok(())
    }

    /// Parse the entire file. The result is the authoritative record set:
    /// for duplicated keys the record appended last is returned.
    pub fn read_all(&self) -> Result<Records, StorageError> {
        let mut records = Records::new();

        let file = match File::open(&self.path) {
            Ok(file) => file,
            // A node that never wrote anything has no file yet.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(err) => return Err(StorageError::read(err)),
        };

        for line in BufReader::new(file).lines() {
            let line = line.map_err(StorageError::read)?;
            if line.trim().is_empty() {
                continue;
            }
            let record: RecordLine = serde_json::from_str(&line).map_err(StorageError::read)?;
            records.insert(
                record.key,
                VersionedItem::new(record.value, record.version),
            );
        }

        Ok(records)
    }

    /// Durably add one record. An existing record for the same key is
    /// shadowed, not removed.
    pub fn append(&self, key: Key, item: &VersionedItem) -> Result<(), StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StorageError::write)?;

        let mut writer = BufWriter::new(file);
        write_record(&mut writer, key, item)?;
        writer.flush().map_err(StorageError::write)
    }

    /// Batch append.
    pub fn append_all(&self, records: &Records) -> Result<(), StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StorageError::write)?;

        let mut writer = BufWriter::new(file);
        for (key, item) in records {
            write_record(&mut writer, *key, item)?;
        }
        writer.flush().map_err(StorageError::write)
    }

    /// Atomically replace the file with exactly these records.
    pub fn write_all(&self, records: &Records) -> Result<(), StorageError> {
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(StorageError::write)?;

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            for (key, item) in records {
                write_record(&mut writer, *key, item)?;
            }
            writer.flush().map_err(StorageError::write)?;
        }

        temp.persist(&self.path).map_err(StorageError::write)?;
        Ok(())
    }
}

fn write_record<W: Write>(writer: &mut W, key: Key, item: &VersionedItem) -> Result<(), StorageError> {
    let line = serde_json::to_string(&RecordLine {
        key,
        value: item.value.clone(),
        version: item.version,
    })
    .map_err(StorageError::write)?;
    writeln!(writer, "{}", line).map_err(StorageError::write)
}

#[cfg(test)]
mod tests;
