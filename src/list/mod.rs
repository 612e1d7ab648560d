//! List Module
//!
//! Append-only sequential dict: entries addressed by their append position.
//!
//! ## Lifecycle
//! ```text
//!   open(writable) ──► Building ──add()*──► commit() ──► Committed
//!                                                            │
//!   open(readonly) ◄──────────── reopen for serving ─────────┘
//!        │
//!        ▼
//!     ReadOnly  (header, index and payloads viewed in the mapping)
//! ```
//!
//! ## Entry Framing
//! ```text
//! ┌──────────────┬──────────┬───────────────┐
//! │ payload      │ filler   │ payload_len u32│   slot length % 8 == 0
//! └──────────────┴──────────┴───────────────┘
//! ```

mod dict;
mod iterator;

pub use dict::ListDict;
pub use iterator::ListIter;
