//! List Dict
//!
//! Builds, commits and serves an append-only list of opaque payloads.

use std::path::Path;

use tracing::warn;

use crate::codec::{payload_len, slot_len, Trailer};
use crate::config::Config;
use crate::error::Result;
use crate::index::OffsetIndex;
use crate::storage::{DictFile, DictState, DictType, HEADER_SIZE};
use crate::DictError;

use super::ListIter;

/// Append-only list of byte payloads in a single memory-mapped file
///
/// ## Modes:
/// - **Writable**: `add()` appends framed payloads and records their offsets
///   in an owned index; `commit()` writes the index and freezes the file.
/// - **Read-only**: header, index and payloads are read in place from the
///   mapping; `get()` is pure offset arithmetic.
///
/// Single writer: a handle is not meant to be shared across threads while
/// building. Any number of read-only handles may map the same committed file.
pub struct ListDict {
    file: DictFile,
    index: OffsetIndex,
}

impl ListDict {
    /// Open or create a list with the given config
    ///
    /// - Fresh writable file: empty index with `initial_index_capacity` slots
    /// - Committed file, writable: index copied out, appends continue after
    ///   the last entry
    /// - Committed file, read-only: index viewed in place
    pub fn open(config: Config) -> Result<Self> {
        let (file, index) = DictFile::open(&config, DictType::List)?;
        let index = match index {
            Some(bytes) => OffsetIndex::from_bytes(bytes)?,
            None => OffsetIndex::with_capacity(config.initial_index_capacity),
        };
        Ok(Self { file, index })
    }

    /// Create a new list at `path`, discarding any existing file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(
            Config::builder()
                .path(path.as_ref())
                .truncate(true)
                .build(),
        )
    }

    /// Open a committed list for serving
    pub fn open_readonly(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Config::builder().path(path.as_ref()).readonly(true).build())
    }

    /// Append a payload, returning its index
    ///
    /// On error nothing is recorded and the data cursor is left where it was,
    /// so the caller may skip the payload and keep adding.
    pub fn add(&mut self, payload: &[u8]) -> Result<u64> {
        self.file.ensure_writable()?;
        let trailer = Trailer::new(payload.len())?;

        // The whole slot fits before any byte of it is written
        self.file.reserve(slot_len(payload.len()) as u64)?;

        let offset = self.file.append(payload)?;
        let recorded = self
            .file
            .append(trailer.as_bytes())
            .and_then(|_| self.index.push(offset));
        if recorded.is_err() {
            self.file.rollback(offset);
        }
        recorded
    }

    /// Payload of entry `idx`, borrowed from the mapping
    ///
    /// The slot runs from this entry's offset to the next entry's (or the end
    /// of the data region for the last one); its trailing length says how
    /// much of it is payload.
    pub fn get(&self, idx: u64) -> Result<&[u8]> {
        let size = self.index.len();
        if idx >= size {
            return Err(DictError::OutOfRange { index: idx, size });
        }

        let start = self.index.offset(idx);
        let end = if idx + 1 < size {
            self.index.offset(idx + 1)
        } else {
            self.file.data_end()
        };

        let data = self.file.data();
        if start < HEADER_SIZE || start > end || end > data.len() as u64 {
            return Err(DictError::Corruption(format!(
                "entry {} spans {}..{} outside the data region",
                idx, start, end
            )));
        }

        let slot = &data[start as usize..end as usize];
        let len = payload_len(slot).map_err(|e| {
            warn!(path = %self.file.path().display(), idx, start, end, "{}", e);
            e
        })?;
        Ok(&slot[..len])
    }

    /// Number of entries
    pub fn len(&self) -> u64 {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Freeze the list
    ///
    /// Compacts the index (capacity = size), writes the final header, appends
    /// padding and index after the data, and shrinks the file to fit.
    pub fn commit(&mut self) -> Result<()> {
        self.file.ensure_writable()?;
        self.index.compact()?;
        self.file.commit(self.index.as_bytes())
    }

    /// Iterate over all payloads in append order
    pub fn iter(&self) -> ListIter<'_> {
        ListIter::new(self)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Offset slots allocated; equals `len()` once committed
    pub fn index_capacity(&self) -> u64 {
        self.index.capacity()
    }

    /// Leading entries whose offsets are stored in 4 bytes
    pub fn offset_32bits_num(&self) -> u64 {
        self.index.narrow_count()
    }

    pub fn state(&self) -> DictState {
        self.file.state()
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
