//! Bucket table
//!
//! Chain heads for the keyed dict, stored the same way as the list's offset
//! index: owned while building, mapped when serving.

use crate::error::Result;
use crate::storage::{read_u64, write_u64, IndexBytes, INDEX_META_SIZE};
use crate::DictError;

use super::KeyKind;

const SIZE_AT: usize = 0;
const BUCKET_COUNT_AT: usize = 8;
const KEY_KIND_AT: usize = 16;

/// Meta block plus one u64 chain head per bucket
#[derive(Debug)]
pub struct BucketTable {
    bytes: IndexBytes,
}

impl BucketTable {
    /// Empty owned table
    pub fn new(bucket_count: u64, kind: KeyKind) -> Result<Self> {
        let len = table_len(bucket_count).ok_or_else(|| {
            DictError::Config(format!("bucket count {} is too large", bucket_count))
        })?;
        if bucket_count == 0 {
            return Err(DictError::Config("bucket count must be positive".to_string()));
        }

        let mut buf = vec![0u8; len];
        write_u64(&mut buf, BUCKET_COUNT_AT, bucket_count);
        write_u64(&mut buf, KEY_KIND_AT, kind as u64);
        Ok(Self {
            bytes: IndexBytes::Owned(buf),
        })
    }

    /// Wrap committed table bytes, checking they were built for `kind`
    pub fn from_bytes(bytes: IndexBytes, kind: KeyKind) -> Result<Self> {
        if bytes.len() < INDEX_META_SIZE {
            return Err(DictError::Corruption(format!(
                "bucket table of {} bytes is smaller than its meta block",
                bytes.len()
            )));
        }

        let bucket_count = read_u64(&bytes, BUCKET_COUNT_AT);
        match table_len(bucket_count) {
            Some(len) if bucket_count > 0 && len <= bytes.len() => {}
            _ => {
                return Err(DictError::Corruption(format!(
                    "bucket count {} does not fit a table of {} bytes",
                    bucket_count,
                    bytes.len()
                )))
            }
        }

        let stored = KeyKind::from_u64(read_u64(&bytes, KEY_KIND_AT))?;
        if stored != kind {
            return Err(DictError::InvalidArgument(format!(
                "dict was built with {} keys, opened with {} keys",
                stored, kind
            )));
        }
        Ok(Self { bytes })
    }

    /// Number of puts recorded
    pub fn len(&self) -> u64 {
        read_u64(&self.bytes, SIZE_AT)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket_count(&self) -> u64 {
        read_u64(&self.bytes, BUCKET_COUNT_AT)
    }

    /// Bucket for a packed key
    pub fn bucket_for(&self, packed_key: &[u8]) -> u64 {
        crc32fast::hash(packed_key) as u64 % self.bucket_count()
    }

    /// Offset of the newest entry in `bucket`, 0 if empty
    pub fn head(&self, bucket: u64) -> u64 {
        read_u64(&self.bytes, head_position(bucket))
    }

    /// Make `offset` the new head of `bucket` and count the put
    pub fn push_head(&mut self, bucket: u64, offset: u64) -> Result<()> {
        let size = self.len();
        let buf = self.bytes.owned_mut()?;
        write_u64(buf, head_position(bucket), offset);
        write_u64(buf, SIZE_AT, size + 1);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[inline]
fn head_position(bucket: u64) -> usize {
    INDEX_META_SIZE + bucket as usize * 8
}

fn table_len(bucket_count: u64) -> Option<usize> {
    usize::try_from(bucket_count)
        .ok()?
        .checked_mul(8)?
        .checked_add(INDEX_META_SIZE)
}
