//! Dict file lifecycle
//!
//! Shared by the list and keyed dicts: open/create the backing file, load a
//! committed index, append data, and freeze the file on commit.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::codec::align_up_u64;
use crate::config::Config;
use crate::error::Result;
use crate::DictError;

use super::header::{DictType, FileHeader};
use super::mmap_file::{IndexBytes, MmapFile, MmapFileOptions};
use super::{read_u64, HEADER_SIZE, INDEX_META_SIZE};

/// Where a dict handle is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictState {
    /// Accepting appends
    Building,
    /// Frozen by `commit()`; no further appends
    Committed,
    /// Opened against a committed file for serving
    ReadOnly,
}

/// A dict file plus its header and lifecycle state
pub struct DictFile {
    file: MmapFile,
    header: FileHeader,
    state: DictState,
    /// Bytes appended since open and not yet committed
    dirty: bool,
}

impl DictFile {
    /// Open or create the file named by `config`
    ///
    /// A fresh writable file gets an empty header and its data cursor placed
    /// right after the header; the header bytes are written on commit.
    /// Anything else must already hold a committed dict of `dict_type`,
    /// whose index bytes are returned.
    pub fn open(config: &Config, dict_type: DictType) -> Result<(Self, Option<IndexBytes>)> {
        if !config.readonly && !config.truncate {
            check_existing(&config.path, dict_type)?;
        }

        let file = MmapFile::open(&MmapFileOptions {
            path: config.path.clone(),
            readonly: config.readonly,
            reserved_space_bytes: config.reserved_space_bytes,
            truncate: config.truncate,
        })?;

        let state = if config.readonly {
            DictState::ReadOnly
        } else {
            DictState::Building
        };
        let mut dict = Self {
            file,
            header: FileHeader::new(dict_type),
            state,
            dirty: false,
        };

        if state == DictState::Building && dict.file.write_offset() == 0 {
            dict.file.reset_write_offset(HEADER_SIZE);
            debug!(path = %config.path.display(), %dict_type, "created dict file");
            return Ok((dict, None));
        }

        let index = dict.load_index(false)?;
        debug!(
            path = %config.path.display(),
            %dict_type,
            readonly = config.readonly,
            data_size = dict.header.data_size,
            index_size = dict.header.index_size,
            "loaded dict file"
        );
        Ok((dict, index))
    }

    /// Locate the committed header and index
    ///
    /// Read-only handles get a view into the mapping; writable handles get an
    /// owned copy they can grow. Either way the data cursor is rewound to the
    /// end of the data region. With `ignore_missing`, an empty file yields
    /// `None` instead of an error.
    pub fn load_index(&mut self, ignore_missing: bool) -> Result<Option<IndexBytes>> {
        let file_len = self.file.write_offset();
        if file_len == 0 && ignore_missing {
            return Ok(None);
        }
        if file_len < HEADER_SIZE {
            return Err(DictError::InvalidArgument(format!(
                "invalid dict file with too small length: {} bytes",
                file_len
            )));
        }

        let raw = self.file.raw_data();
        let header = FileHeader::decode(&raw[..HEADER_SIZE as usize])?;
        if header.dict_type != self.header.dict_type {
            return Err(DictError::InvalidArgument(format!(
                "dict file holds a {} dict, expected {}",
                header.dict_type, self.header.dict_type
            )));
        }

        let (start, end) = index_bounds(&header, file_len)?;
        let index = if self.file.is_readonly() {
            let view = self.file.share(start, end - start).ok_or_else(|| {
                DictError::Corruption("index region outside the mapping".to_string())
            })?;
            IndexBytes::Mapped(view)
        } else {
            IndexBytes::Owned(raw[start as usize..end as usize].to_vec())
        };

        // index_bounds has checked data_end
        self.file.reset_write_offset(HEADER_SIZE + header.data_size);
        self.header = header;
        Ok(Some(index))
    }

    /// Fail unless appends are allowed
    pub fn ensure_writable(&self) -> Result<()> {
        match self.state {
            DictState::Building => Ok(()),
            DictState::Committed => Err(DictError::Committed),
            DictState::ReadOnly => Err(DictError::ReadOnly),
        }
    }

    /// Append bytes to the data region, returning their file offset
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        self.ensure_writable()?;
        let offset = self.file.add(bytes)?;
        self.dirty = true;
        Ok(offset)
    }

    /// Make room for `additional` bytes of appends that must not fail halfway
    pub fn reserve(&mut self, additional: u64) -> Result<()> {
        self.ensure_writable()?;
        self.file.reserve(additional)
    }

    /// Discard everything appended from `offset` on
    ///
    /// Used to undo a partially written entry. Offsets outside the current
    /// data region are ignored.
    pub fn rollback(&mut self, offset: u64) {
        if self.state == DictState::Building
            && offset >= HEADER_SIZE
            && offset <= self.file.write_offset()
        {
            self.file.reset_write_offset(offset);
        }
    }

    /// Whether appends are pending a commit
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whole mapping; data offsets index straight into it
    pub fn data(&self) -> &[u8] {
        self.file.raw_data()
    }

    /// File offset one past the last data byte
    pub fn data_end(&self) -> u64 {
        match self.state {
            DictState::Building => self.file.write_offset(),
            DictState::Committed | DictState::ReadOnly => HEADER_SIZE + self.header.data_size,
        }
    }

    /// Freeze the file: write the final header, pad the data region to 8
    /// bytes, append `index`, and shrink the file to its exact length
    pub fn commit(&mut self, index: &[u8]) -> Result<()> {
        self.ensure_writable()?;

        let data_size = self.file.write_offset() - HEADER_SIZE;
        let data_pad_size = align_up_u64(data_size) - data_size;
        self.header.data_size = data_size;
        self.header.index_size = index.len() as u64;
        self.header.data_pad_size = data_pad_size as u16;
        self.file.write_at(0, &self.header.encode())?;

        if data_pad_size > 0 {
            self.file.add(&[0u8; 8][..data_pad_size as usize])?;
        }
        self.file.add(index)?;
        self.file.shrink_to_fit()?;
        self.state = DictState::Committed;
        self.dirty = false;

        info!(
            path = %self.file.path().display(),
            dict_type = %self.header.dict_type,
            data_size,
            index_size = index.len(),
            file_size = self.file.write_offset(),
            "committed dict"
        );
        Ok(())
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn state(&self) -> DictState {
        self.state
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for DictFile {
    fn drop(&mut self) {
        if self.state == DictState::Building && self.dirty {
            warn!(
                path = %self.file.path().display(),
                "dropping uncommitted dict; the file is unreadable until rebuilt and committed"
            );
        }
    }
}

/// Refuse to open an existing non-empty file for writing unless it starts
/// with a header for `dict_type`, so a rejected file is never extended
fn check_existing(path: &Path, dict_type: DictType) -> Result<()> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }
    if len < HEADER_SIZE {
        return Err(DictError::InvalidArgument(format!(
            "invalid dict file with too small length: {} bytes",
            len
        )));
    }

    let mut block = vec![0u8; HEADER_SIZE as usize];
    file.read_exact(&mut block)?;
    let header = FileHeader::decode(&block)?;
    if header.dict_type != dict_type {
        return Err(DictError::InvalidArgument(format!(
            "dict file holds a {} dict, expected {}",
            header.dict_type, dict_type
        )));
    }
    Ok(())
}

/// Validate and return the `[start, end)` file range of the index
fn index_bounds(header: &FileHeader, file_len: u64) -> Result<(u64, u64)> {
    let start = header.index_start();
    let end = start.and_then(|s| s.checked_add(header.index_size));
    match (start, end) {
        (Some(start), Some(end)) if end <= file_len && header.index_size >= INDEX_META_SIZE as u64 => {
            Ok((start, end))
        }
        _ => Err(DictError::Corruption(format!(
            "index region (data {} + pad {}, index {}) does not fit file of {} bytes",
            header.data_size, header.data_pad_size, header.index_size, file_len
        ))),
    }
}

// =============================================================================
// Inspection
// =============================================================================

/// Summary of a committed dict file, read without opening a store handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictInfo {
    pub dict_type: DictType,
    pub file_size: u64,
    pub data_size: u64,
    pub data_pad_size: u16,
    pub index_size: u64,
    /// Committed entry count (list entries or keyed puts)
    pub entries: u64,
}

impl DictInfo {
    pub fn read(path: &Path) -> Result<Self> {
        let file = MmapFile::open(&MmapFileOptions {
            path: path.to_path_buf(),
            readonly: true,
            reserved_space_bytes: 0,
            truncate: false,
        })?;

        let file_size = file.write_offset();
        let raw = file.raw_data();
        let header = FileHeader::decode(raw)?;
        let (start, _) = index_bounds(&header, file_size)?;

        Ok(Self {
            dict_type: header.dict_type,
            file_size,
            data_size: header.data_size,
            data_pad_size: header.data_pad_size,
            index_size: header.index_size,
            entries: read_u64(raw, start as usize),
        })
    }
}
