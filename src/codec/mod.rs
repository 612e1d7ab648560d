//! Codec Module
//!
//! Byte-level encodings shared by the list and keyed dicts.
//!
//! ## Encodings
//! - **Pack**: fixed-width scalars copied verbatim, byte strings prefixed
//!   with a `LenHeader { capacity, size }`. Optionally padded to 8 bytes.
//! - **Frame**: list entries stored as payload + filler + trailing u32
//!   payload length, padded so every slot is a multiple of 8 bytes.
//!
//! ```text
//! Pack (byte string, aligned)          Frame (list entry)
//! ┌──────────┬──────┬───────┬──────┐   ┌─────────┬────────┬──────────┐
//! │capacity 4│size 4│ bytes │slack │   │ payload │ filler │ len (u32)│
//! └──────────┴──────┴───────┴──────┘   └─────────┴────────┴──────────┘
//! ```
//!
//! All integers are host-endian.

mod frame;
mod pack;

pub use frame::{payload_len, slot_len, Trailer, LENGTH_FIELD_SIZE};
pub use pack::{LenHeader, Pack, Unpack, LEN_HEADER_SIZE};

/// Slot alignment used by both encodings
pub const ALIGNMENT: usize = 8;

/// Round `len` up to the next multiple of [`ALIGNMENT`]
#[inline]
pub const fn align_up(len: usize) -> usize {
    (len + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// Same as [`align_up`] for file offsets and sizes
#[inline]
pub const fn align_up_u64(len: u64) -> u64 {
    (len + ALIGNMENT as u64 - 1) & !(ALIGNMENT as u64 - 1)
}
