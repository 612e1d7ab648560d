//! Storage Module
//!
//! Single-file, memory-mapped layout shared by every dict kind.
//!
//! ## Responsibilities
//! - Map the backing file (growable while building, shared read-only when serving)
//! - Encode/decode the fixed header
//! - Drive the build → commit → freeze lifecycle
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ Header (512 bytes, 21 live)                    │
//! │ ┌──────────┬─────────┬───────┬───────┬──────┐  │
//! │ │IndexSz(8)│DataSz(8)│Pad (2)│Magic 2│Type 1│  │
//! │ └──────────┴─────────┴───────┴───────┴──────┘  │
//! ├────────────────────────────────────────────────┤
//! │ Data Region (DataSz bytes)                     │
//! │   entries, layout owned by the dict kind       │
//! ├────────────────────────────────────────────────┤
//! │ Padding (Pad bytes, aligns index to 8)         │
//! ├────────────────────────────────────────────────┤
//! │ Index Region (IndexSz bytes)                   │
//! │   64-byte meta + kind-specific table           │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Integers are host-endian; readers and writers must share an architecture.

mod dict_file;
mod header;
mod mmap_file;

pub use dict_file::{DictFile, DictInfo, DictState};
pub use header::{DictType, FileHeader};
pub use mmap_file::{IndexBytes, MappedSlice, MmapFile, MmapFileOptions};

// =============================================================================
// Shared Constants
// =============================================================================

/// Magic value identifying a dict file
pub const MAGIC: u16 = 0xD1C7;

/// Fixed header size; data starts right after it
pub const HEADER_SIZE: u64 = 512;

/// Bytes reserved for the meta block at the start of every index region
pub const INDEX_META_SIZE: usize = 64;

// =============================================================================
// Fixed-width field access
// =============================================================================

/// Read a host-endian u64 at `at`. Callers bound-check `at + 8`.
#[inline]
pub(crate) fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_ne_bytes(raw)
}

/// Write a host-endian u64 at `at`. Callers bound-check `at + 8`.
#[inline]
pub(crate) fn write_u64(bytes: &mut [u8], at: usize, value: u64) {
    bytes[at..at + 8].copy_from_slice(&value.to_ne_bytes());
}

/// Read a host-endian u32 at `at`. Callers bound-check `at + 4`.
#[inline]
pub(crate) fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_ne_bytes(raw)
}

/// Write a host-endian u32 at `at`. Callers bound-check `at + 4`.
#[inline]
pub(crate) fn write_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_ne_bytes());
}
