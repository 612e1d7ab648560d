//! File header
//!
//! Fixed 512-byte header at offset 0 of every dict file. Only the first
//! 21 bytes are live; the rest is reserved for later fields.

use std::fmt;

use crate::error::Result;
use crate::DictError;

use super::{read_u64, HEADER_SIZE, MAGIC};

const INDEX_SIZE_AT: usize = 0;
const DATA_SIZE_AT: usize = 8;
const DATA_PAD_SIZE_AT: usize = 16;
const MAGIC_AT: usize = 18;
const TYPE_AT: usize = 20;

/// Kind of store held in a dict file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DictType {
    /// Keyed dict (`KvDict`)
    Kv = 0,
    /// Sequential list (`ListDict`)
    List = 1,
    /// Multi-keyed dict; tag reserved, no store implements it
    MultiKv = 2,
}

impl DictType {
    pub fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(DictType::Kv),
            1 => Ok(DictType::List),
            2 => Ok(DictType::MultiKv),
            other => Err(DictError::InvalidArgument(format!(
                "unknown dict type tag {}",
                other
            ))),
        }
    }
}

impl fmt::Display for DictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DictType::Kv => "kv",
            DictType::List => "list",
            DictType::MultiKv => "multi-kv",
        };
        f.write_str(name)
    }
}

/// Decoded file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Byte length of the index region
    pub index_size: u64,
    /// Byte length of the data region (after the header, before padding)
    pub data_size: u64,
    /// Zero bytes between data and index so the index starts 8-byte aligned
    pub data_pad_size: u16,
    pub magic: u16,
    pub dict_type: DictType,
}

impl FileHeader {
    /// Empty header for a fresh file
    pub fn new(dict_type: DictType) -> Self {
        Self {
            index_size: 0,
            data_size: 0,
            data_pad_size: 0,
            magic: MAGIC,
            dict_type,
        }
    }

    /// Encode into a full header block, unused bytes zeroed
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut block = [0u8; HEADER_SIZE as usize];
        block[INDEX_SIZE_AT..INDEX_SIZE_AT + 8].copy_from_slice(&self.index_size.to_ne_bytes());
        block[DATA_SIZE_AT..DATA_SIZE_AT + 8].copy_from_slice(&self.data_size.to_ne_bytes());
        block[DATA_PAD_SIZE_AT..DATA_PAD_SIZE_AT + 2]
            .copy_from_slice(&self.data_pad_size.to_ne_bytes());
        block[MAGIC_AT..MAGIC_AT + 2].copy_from_slice(&self.magic.to_ne_bytes());
        block[TYPE_AT] = self.dict_type as u8;
        block
    }

    /// Decode from the first bytes of a file, rejecting short input and
    /// foreign magic
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if (bytes.len() as u64) < HEADER_SIZE {
            return Err(DictError::InvalidArgument(format!(
                "invalid dict file with too small length: {} bytes",
                bytes.len()
            )));
        }

        let magic = u16::from_ne_bytes([bytes[MAGIC_AT], bytes[MAGIC_AT + 1]]);
        if magic != MAGIC {
            return Err(DictError::InvalidArgument(format!(
                "invalid dict magic: expected {:#06x}, got {:#06x}",
                MAGIC, magic
            )));
        }

        Ok(Self {
            index_size: read_u64(bytes, INDEX_SIZE_AT),
            data_size: read_u64(bytes, DATA_SIZE_AT),
            data_pad_size: u16::from_ne_bytes([
                bytes[DATA_PAD_SIZE_AT],
                bytes[DATA_PAD_SIZE_AT + 1],
            ]),
            magic,
            dict_type: DictType::from_u8(bytes[TYPE_AT])?,
        })
    }

    /// File offset one past the last data byte
    pub fn data_end(&self) -> Option<u64> {
        HEADER_SIZE.checked_add(self.data_size)
    }

    /// File offset of the index region
    pub fn index_start(&self) -> Option<u64> {
        self.data_end()?.checked_add(self.data_pad_size as u64)
    }
}
