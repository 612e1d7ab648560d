//! Dual-width offset array
//!
//! Owned and growable while building, a view into the mapping once served.

use tracing::trace;

use crate::error::Result;
use crate::storage::{read_u32, read_u64, write_u32, write_u64, IndexBytes, INDEX_META_SIZE};
use crate::DictError;

const SIZE_AT: usize = 0;
const CAPACITY_AT: usize = 8;
const NARROW_COUNT_AT: usize = 16;

/// Slot count the array grows to from an empty or frozen capacity
const MIN_GROWTH_SLOTS: u64 = 16;

/// Narrow slots actually occupied, padded so the wide run is 8-byte aligned
#[inline]
fn padded_narrow(narrow: u64) -> u64 {
    narrow + (narrow & 1)
}

/// Byte position of the wide slot for entry `idx`
#[inline]
fn wide_position(narrow: u64, idx: u64) -> usize {
    INDEX_META_SIZE + (padded_narrow(narrow) * 4 + (idx - narrow) * 8) as usize
}

/// Minimal index length for `size` entries of which `narrow` use 4-byte slots
pub fn encoded_len(size: u64, narrow: u64) -> usize {
    INDEX_META_SIZE + (padded_narrow(narrow) * 4 + (size - narrow) * 8) as usize
}

/// Offset index over an owned buffer or a mapped view
#[derive(Debug)]
pub struct OffsetIndex {
    bytes: IndexBytes,
}

impl OffsetIndex {
    /// Empty owned index with room for `capacity` offsets
    pub fn with_capacity(capacity: u64) -> Self {
        let mut buf = vec![0u8; INDEX_META_SIZE + capacity as usize * 8];
        write_u64(&mut buf, CAPACITY_AT, capacity);
        Self {
            bytes: IndexBytes::Owned(buf),
        }
    }

    /// Wrap committed index bytes, validating the meta block
    ///
    /// An owned copy is reopened for appending: its capacity is reset to its
    /// size so the next push grows it.
    pub fn from_bytes(bytes: IndexBytes) -> Result<Self> {
        if bytes.len() < INDEX_META_SIZE {
            return Err(DictError::Corruption(format!(
                "index of {} bytes is smaller than its meta block",
                bytes.len()
            )));
        }

        let size = read_u64(&bytes, SIZE_AT);
        let capacity = read_u64(&bytes, CAPACITY_AT);
        let narrow = read_u64(&bytes, NARROW_COUNT_AT);
        let fits = |size: u64, narrow: u64| {
            narrow <= size
                && size
                    .checked_mul(8)
                    .and_then(|n| n.checked_add(INDEX_META_SIZE as u64 + 4))
                    .is_some_and(|_| encoded_len(size, narrow) <= bytes.len())
        };
        if size > capacity || !fits(size, narrow) {
            return Err(DictError::Corruption(format!(
                "inconsistent index meta: size {}, capacity {}, 32-bit offsets {}, {} bytes",
                size,
                capacity,
                narrow,
                bytes.len()
            )));
        }

        let mut index = Self { bytes };
        if let IndexBytes::Owned(buf) = &mut index.bytes {
            let reserved = INDEX_META_SIZE + size as usize * 8;
            if buf.len() < reserved {
                buf.resize(reserved, 0);
            }
            write_u64(buf, CAPACITY_AT, size);
        }
        Ok(index)
    }

    /// Number of recorded offsets
    pub fn len(&self) -> u64 {
        read_u64(&self.bytes, SIZE_AT)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offsets the array can hold before growing
    pub fn capacity(&self) -> u64 {
        read_u64(&self.bytes, CAPACITY_AT)
    }

    /// Leading entries stored in 4-byte slots
    pub fn narrow_count(&self) -> u64 {
        read_u64(&self.bytes, NARROW_COUNT_AT)
    }

    /// Offset recorded for entry `idx`. `idx` must be below `len()`.
    pub fn offset(&self, idx: u64) -> u64 {
        debug_assert!(idx < self.len());
        let narrow = self.narrow_count();
        if idx < narrow {
            read_u32(&self.bytes, INDEX_META_SIZE + idx as usize * 4) as u64
        } else {
            read_u64(&self.bytes, wide_position(narrow, idx))
        }
    }

    /// Record the offset of the next entry, returning its index
    ///
    /// Offsets that fit in 32 bits take a 4-byte slot only while every
    /// earlier entry did too; after the first wide offset all later entries
    /// are wide.
    pub fn push(&mut self, offset: u64) -> Result<u64> {
        let size = self.len();
        if size == self.capacity() {
            self.grow()?;
        }

        let narrow = self.narrow_count();
        let buf = self.bytes.owned_mut()?;
        if narrow == size && offset <= u32::MAX as u64 {
            write_u32(buf, INDEX_META_SIZE + size as usize * 4, offset as u32);
            write_u64(buf, NARROW_COUNT_AT, narrow + 1);
        } else {
            write_u64(buf, wide_position(narrow, size), offset);
        }
        write_u64(buf, SIZE_AT, size + 1);
        Ok(size)
    }

    /// Trim the buffer to its minimal length and freeze capacity at size
    pub fn compact(&mut self) -> Result<()> {
        let size = self.len();
        let len = encoded_len(size, self.narrow_count());
        let buf = self.bytes.owned_mut()?;
        buf.truncate(len);
        write_u64(buf, CAPACITY_AT, size);
        Ok(())
    }

    /// Raw index bytes, meta block included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Double the slot capacity
    fn grow(&mut self) -> Result<()> {
        let current = self.capacity();
        let new_capacity = current.saturating_mul(2).max(MIN_GROWTH_SLOTS);
        let new_len = (new_capacity as usize)
            .checked_mul(8)
            .and_then(|n| n.checked_add(INDEX_META_SIZE))
            .ok_or_else(|| {
                DictError::InvalidArgument(format!(
                    "offset index cannot grow past {} entries",
                    current
                ))
            })?;

        let buf = self.bytes.owned_mut()?;
        buf.resize(new_len, 0);
        write_u64(buf, CAPACITY_AT, new_capacity);
        trace!(from = current, to = new_capacity, "grew offset index");
        Ok(())
    }
}
