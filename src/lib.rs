//! # AtlasDict
//!
//! An embeddable, append-only, immutable record store:
//! - Built once, then frozen into a single self-describing file
//! - Served read-only through a shared memory mapping, zero-copy
//! - Sequential list (`ListDict`) and keyed (`KvDict`) variants
//! - Compact offsets: 32-bit while they fit, 64-bit past 4 GiB
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │        ListDict          │      │        KvDict<K>         │
//! │  add / get(idx) / commit │      │  put / get(key) / commit │
//! └────────────┬─────────────┘      └────────────┬─────────────┘
//!              │                                 │
//!     ┌────────▼────────┐               ┌────────▼────────┐
//!     │   OffsetIndex   │               │   BucketTable   │
//!     │ (u32 run, u64)  │               │  (chain heads)  │
//!     └────────┬────────┘               └────────┬────────┘
//!              │      ┌──────────────────┐       │
//!              └─────►│      Codec       │◄──────┘
//!                     │  frame  │  pack  │
//!                     └────────┬─────────┘
//!                              │
//!                     ┌────────▼─────────┐
//!                     │     DictFile     │
//!                     │ header/lifecycle │
//!                     └────────┬─────────┘
//!                              │
//!                     ┌────────▼─────────┐
//!                     │     MmapFile     │
//!                     │ (memory mapped)  │
//!                     └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use atlasdict::ListDict;
//!
//! # fn main() -> atlasdict::Result<()> {
//! let mut list = ListDict::create("names.rdict")?;
//! list.add(b"a")?;
//! list.add(b"bb")?;
//! list.commit()?;
//!
//! let list = ListDict::open_readonly("names.rdict")?;
//! assert_eq!(list.get(1)?, b"bb");
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod storage;
pub mod index;
pub mod list;
pub mod kv;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DictError, Result};
pub use config::Config;
pub use kv::{DictKey, KeyKind, KvDict};
pub use list::ListDict;
pub use storage::{DictInfo, DictState, DictType};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of AtlasDict
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
