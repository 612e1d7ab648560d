//! Keyed Dict
//!
//! Builds, commits and serves a key → payload table in a single
//! memory-mapped file.

use std::marker::PhantomData;
use std::path::Path;

use bytes::{BufMut, BytesMut};

use crate::codec::{Pack, Unpack};
use crate::config::Config;
use crate::error::Result;
use crate::storage::{read_u64, DictFile, DictState, DictType, HEADER_SIZE};
use crate::DictError;

use super::{BucketTable, DictKey};

/// Size of the chain link in front of every entry
const NEXT_FIELD_SIZE: usize = 8;

/// Key → payload dict over a memory-mapped file
///
/// `put()` of a key that is already present shadows the earlier value;
/// `get()` returns the newest. Payloads are opaque bytes borrowed from the
/// mapping.
pub struct KvDict<K: ?Sized> {
    file: DictFile,
    buckets: BucketTable,
    _key: PhantomData<fn(&K)>,
}

impl<K: DictKey + ?Sized> KvDict<K> {
    /// Open or create a keyed dict with the given config
    ///
    /// A fresh file gets `config.bucket_count()` buckets; a committed file
    /// keeps the bucket count it was built with and must hold `K` keys.
    pub fn open(config: Config) -> Result<Self> {
        if config.max_load_factor.is_nan() || config.max_load_factor <= 0.0 {
            return Err(DictError::Config(format!(
                "max_load_factor must be positive, got {}",
                config.max_load_factor
            )));
        }

        let (file, index) = DictFile::open(&config, DictType::Kv)?;
        let buckets = match index {
            Some(bytes) => BucketTable::from_bytes(bytes, K::KIND)?,
            None => BucketTable::new(config.bucket_count(), K::KIND)?,
        };
        Ok(Self {
            file,
            buckets,
            _key: PhantomData,
        })
    }

    /// Create a new keyed dict at `path` sized for `max_elements` keys,
    /// discarding any existing file
    pub fn create(path: impl AsRef<Path>, max_elements: u64) -> Result<Self> {
        Self::open(
            Config::builder()
                .path(path.as_ref())
                .truncate(true)
                .max_elements(max_elements)
                .build(),
        )
    }

    /// Open a committed keyed dict for serving
    pub fn open_readonly(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Config::builder().path(path.as_ref()).readonly(true).build())
    }

    /// Store `value` under `key`
    pub fn put(&mut self, key: &K, value: &[u8]) -> Result<()> {
        self.file.ensure_writable()?;

        let key_len = key.packed_len(true);
        let mut entry = BytesMut::with_capacity(NEXT_FIELD_SIZE + key_len + value.packed_len(true));
        entry.put_slice(&[0u8; NEXT_FIELD_SIZE]);
        key.pack(&mut entry, true)?;

        let bucket = self.buckets.bucket_for(&entry[NEXT_FIELD_SIZE..]);
        let next = self.buckets.head(bucket);
        entry[..NEXT_FIELD_SIZE].copy_from_slice(&next.to_ne_bytes());
        value.pack(&mut entry, true)?;

        let offset = self.file.append(&entry)?;
        self.buckets.push_head(bucket, offset).map_err(|e| {
            self.file.rollback(offset);
            e
        })
    }

    /// Payload stored under `key`, or `None`
    pub fn get(&self, key: &K) -> Result<Option<&[u8]>> {
        let mut probe = BytesMut::with_capacity(key.packed_len(true));
        key.pack(&mut probe, true)?;

        let bucket = self.buckets.bucket_for(&probe);
        let data = self.file.data();
        let data_end = self.file.data_end();

        let mut offset = self.buckets.head(bucket);
        while offset != 0 {
            let past_data = offset
                .checked_add(NEXT_FIELD_SIZE as u64)
                .map_or(true, |end| end > data_end);
            if offset < HEADER_SIZE || past_data {
                return Err(DictError::Corruption(format!(
                    "bucket {} links to offset {} outside the data region",
                    bucket, offset
                )));
            }

            let entry = &data[offset as usize..data_end as usize];
            let next = read_u64(entry, 0);
            let body = &entry[NEXT_FIELD_SIZE..];

            if body.get(..probe.len()) == Some(&probe[..]) {
                let (value, _) = <&[u8]>::unpack(&body[probe.len()..], true)?;
                return Ok(Some(value));
            }

            if next >= offset {
                return Err(DictError::Corruption(format!(
                    "bucket {} chain does not move backwards at offset {}",
                    bucket, offset
                )));
            }
            offset = next;
        }
        Ok(None)
    }

    /// Whether `key` has a value
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Number of puts, shadowed ones included
    pub fn len(&self) -> u64 {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Freeze the dict: write the header, bucket table, and shrink to fit
    pub fn commit(&mut self) -> Result<()> {
        self.file.commit(self.buckets.as_bytes())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn bucket_count(&self) -> u64 {
        self.buckets.bucket_count()
    }

    pub fn state(&self) -> DictState {
        self.file.state()
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
