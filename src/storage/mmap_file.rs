//! Memory-mapped backing file
//!
//! Growable append target for building, read-only shared mapping for serving.

use std::fs::{File, OpenOptions};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::{Mmap, MmapMut};
use tracing::trace;

use crate::error::Result;
use crate::DictError;

/// Smallest writable mapping created for a file
const MIN_MAP_SIZE: u64 = 4096;

/// Options for opening an [`MmapFile`]
#[derive(Debug, Clone)]
pub struct MmapFileOptions {
    pub path: PathBuf,
    pub readonly: bool,
    /// Initial writable mapping size
    pub reserved_space_bytes: u64,
    /// Discard existing contents (writable only)
    pub truncate: bool,
}

enum Region {
    Writable(MmapMut),
    ReadOnly(Arc<Mmap>),
    /// Empty read-only file, or a writable file between unmap and remap
    Unmapped,
}

/// Append-only region over a memory-mapped file
///
/// `write_offset` is the logical end of the file; in writable mode the file
/// and mapping extend past it as reserved space until `shrink_to_fit`.
pub struct MmapFile {
    path: PathBuf,
    file: File,
    region: Region,
    readonly: bool,
    write_offset: u64,
}

impl MmapFile {
    /// Open or create the file described by `opts`
    ///
    /// Read-only: maps the file as-is, write offset = file length.
    /// Writable: creates the file if missing, extends it to the reserved
    /// size and maps it; write offset = previous file length.
    pub fn open(opts: &MmapFileOptions) -> Result<Self> {
        if opts.path.as_os_str().is_empty() {
            return Err(DictError::InvalidArgument("empty dict path".to_string()));
        }

        if opts.readonly {
            let file = File::open(&opts.path)?;
            let len = file.metadata()?.len();
            let region = if len == 0 {
                Region::Unmapped
            } else {
                // SAFETY: committed dict files are never modified while served;
                // the read-only mapping is shared immutably.
                Region::ReadOnly(Arc::new(unsafe { Mmap::map(&file)? }))
            };
            return Ok(Self {
                path: opts.path.clone(),
                file,
                region,
                readonly: true,
                write_offset: len,
            });
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(opts.truncate)
            .open(&opts.path)?;

        let len = file.metadata()?.len();
        let map_len = len.max(opts.reserved_space_bytes).max(MIN_MAP_SIZE);
        if map_len > len {
            file.set_len(map_len)?;
        }

        // SAFETY: the handle owns the file exclusively while building.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        trace!(path = %opts.path.display(), len, map_len, "mapped writable dict file");

        Ok(Self {
            path: opts.path.clone(),
            file,
            region: Region::Writable(mmap),
            readonly: false,
            write_offset: len,
        })
    }

    /// Append `bytes` at the write offset, growing the mapping if needed.
    /// Returns the offset the bytes were written at.
    pub fn add(&mut self, bytes: &[u8]) -> Result<u64> {
        let offset = self.write_offset;
        let end = offset + bytes.len() as u64;
        self.ensure_capacity(end)?;

        let map = self.writable_map()?;
        map[offset as usize..end as usize].copy_from_slice(bytes);
        self.write_offset = end;
        Ok(offset)
    }

    /// Grow the mapping so `additional` more bytes can be appended without
    /// remapping
    pub fn reserve(&mut self, additional: u64) -> Result<()> {
        let needed = self.write_offset.checked_add(additional).ok_or_else(|| {
            DictError::InvalidArgument(format!(
                "cannot reserve {} bytes past offset {}",
                additional, self.write_offset
            ))
        })?;
        self.ensure_capacity(needed)
    }

    /// Overwrite bytes already inside the written region
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let end = offset + bytes.len() as u64;
        if end > self.write_offset {
            return Err(DictError::InvalidArgument(format!(
                "write at {}..{} past write offset {}",
                offset, end, self.write_offset
            )));
        }
        let map = self.writable_map()?;
        map[offset as usize..end as usize].copy_from_slice(bytes);
        Ok(())
    }

    /// Whole mapped region, including reserved space past the write offset
    pub fn raw_data(&self) -> &[u8] {
        match &self.region {
            Region::Writable(map) => &map[..],
            Region::ReadOnly(map) => &map[..],
            Region::Unmapped => &[],
        }
    }

    /// Logical end of the file
    pub fn write_offset(&self) -> u64 {
        self.write_offset
    }

    /// Move the logical end; later appends overwrite whatever follows
    pub fn reset_write_offset(&mut self, offset: u64) {
        self.write_offset = offset;
    }

    /// Truncate the file to the write offset and remap it at exactly that size
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if let Region::Writable(map) = &self.region {
            map.flush()?;
        } else {
            return Err(DictError::ReadOnly);
        }

        self.region = Region::Unmapped;
        self.file.set_len(self.write_offset)?;
        self.file.sync_all()?;

        if self.write_offset > 0 {
            // SAFETY: see `open`.
            self.region = Region::Writable(unsafe { MmapMut::map_mut(&self.file)? });
        }
        trace!(path = %self.path.display(), len = self.write_offset, "shrunk dict file");
        Ok(())
    }

    /// Zero-copy view of `len` bytes at `start` of a read-only mapping
    pub fn share(&self, start: u64, len: u64) -> Option<MappedSlice> {
        match &self.region {
            Region::ReadOnly(map) => {
                let end = start.checked_add(len)?;
                if end > map.len() as u64 {
                    return None;
                }
                Some(MappedSlice {
                    map: Arc::clone(map),
                    start: start as usize,
                    len: len as usize,
                })
            }
            _ => None,
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn writable_map(&mut self) -> Result<&mut MmapMut> {
        match &mut self.region {
            Region::Writable(map) => Ok(map),
            _ => Err(DictError::ReadOnly),
        }
    }

    /// Grow the file and mapping (doubling) until `needed` bytes fit
    fn ensure_capacity(&mut self, needed: u64) -> Result<()> {
        let current = match &self.region {
            Region::Writable(map) => map.len() as u64,
            Region::Unmapped if !self.readonly => 0,
            _ => return Err(DictError::ReadOnly),
        };
        if needed <= current {
            return Ok(());
        }

        let mut new_len = current.max(MIN_MAP_SIZE);
        while new_len < needed {
            new_len = new_len.saturating_mul(2);
        }

        // Drop the old mapping before resizing the file underneath it
        self.region = Region::Unmapped;
        self.file.set_len(new_len)?;
        // SAFETY: see `open`.
        self.region = Region::Writable(unsafe { MmapMut::map_mut(&self.file)? });
        trace!(path = %self.path.display(), from = current, to = new_len, "grew dict mapping");
        Ok(())
    }
}

/// Shared, immutable view into a read-only mapping
#[derive(Clone)]
pub struct MappedSlice {
    map: Arc<Mmap>,
    start: usize,
    len: usize,
}

impl Deref for MappedSlice {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.map[self.start..self.start + self.len]
    }
}

impl std::fmt::Debug for MappedSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedSlice")
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}

/// Index bytes: an owned, growable copy while building, or a view
/// straight into the mapping when serving
#[derive(Debug, Clone)]
pub enum IndexBytes {
    Owned(Vec<u8>),
    Mapped(MappedSlice),
}

impl IndexBytes {
    /// Mutable access to the owned buffer; mapped views are immutable
    pub fn owned_mut(&mut self) -> Result<&mut Vec<u8>> {
        match self {
            IndexBytes::Owned(buf) => Ok(buf),
            IndexBytes::Mapped(_) => Err(DictError::ReadOnly),
        }
    }
}

impl Deref for IndexBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            IndexBytes::Owned(buf) => buf.as_slice(),
            IndexBytes::Mapped(view) => &view[..],
        }
    }
}
