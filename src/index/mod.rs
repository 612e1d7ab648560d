//! Index Module
//!
//! Offset index for the list dict: where each entry's slot starts.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Meta (64 bytes)                                         │
//! │   Size: u64 | Capacity: u64 | Offset32Count: u64 | 0…   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Narrow run: Offset32Count × u32, padded to an even count│
//! ├─────────────────────────────────────────────────────────┤
//! │ Wide run: (Size - Offset32Count) × u64                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Runs split by append order: entries use 4-byte slots until the first
//! offset above `u32::MAX`, and 8-byte slots from then on.

mod offsets;

pub use offsets::{encoded_len, OffsetIndex};
