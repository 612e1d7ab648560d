//! KV Module
//!
//! Keyed dict: same header and commit discipline as the list, with a
//! chained hash table instead of an offset array.
//!
//! ## Data Region Entry (8-byte aligned)
//! ```text
//! ┌──────────┬──────────────────────┬──────────────────────────────┐
//! │ Next (8) │ Packed key (aligned) │ Packed value (LenHeader + …) │
//! └──────────┴──────────────────────┴──────────────────────────────┘
//! ```
//! `Next` is the file offset of the entry previously at the head of the same
//! bucket, 0 ending the chain. Chains only point backwards in the file.
//!
//! ## Index Region
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ Meta (64 bytes): Size u64 | BucketCount u64 | Kind  │
//! ├─────────────────────────────────────────────────────┤
//! │ BucketCount × u64 chain heads (0 = empty)           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Buckets are chosen by CRC32 of the packed key; the table is sized once
//! from `max_elements / max_load_factor` and never rehashed.

mod buckets;
mod dict;
mod key;

pub use buckets::BucketTable;
pub use dict::KvDict;
pub use key::{DictKey, KeyKind};
