//! Key types for the keyed dict

use std::fmt;

use crate::codec::Pack;
use crate::error::Result;
use crate::DictError;

/// Key type recorded in a keyed dict's index so a file is always reopened
/// with the type it was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyKind {
    Bytes = 0,
    Str = 1,
    U32 = 2,
    U64 = 3,
    I32 = 4,
    I64 = 5,
}

impl KeyKind {
    pub fn from_u64(tag: u64) -> Result<Self> {
        match tag {
            0 => Ok(KeyKind::Bytes),
            1 => Ok(KeyKind::Str),
            2 => Ok(KeyKind::U32),
            3 => Ok(KeyKind::U64),
            4 => Ok(KeyKind::I32),
            5 => Ok(KeyKind::I64),
            other => Err(DictError::InvalidArgument(format!(
                "unsupported key kind {}",
                other
            ))),
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyKind::Bytes => "bytes",
            KeyKind::Str => "str",
            KeyKind::U32 => "u32",
            KeyKind::U64 => "u64",
            KeyKind::I32 => "i32",
            KeyKind::I64 => "i64",
        };
        f.write_str(name)
    }
}

/// Types usable as keys of a [`KvDict`](super::KvDict)
///
/// Keys are compared and hashed by their aligned packed form, so two keys
/// are equal exactly when they pack to the same bytes.
pub trait DictKey: Pack {
    const KIND: KeyKind;
}

impl DictKey for [u8] {
    const KIND: KeyKind = KeyKind::Bytes;
}

impl DictKey for str {
    const KIND: KeyKind = KeyKind::Str;
}

impl DictKey for u32 {
    const KIND: KeyKind = KeyKind::U32;
}

impl DictKey for u64 {
    const KIND: KeyKind = KeyKind::U64;
}

impl DictKey for i32 {
    const KIND: KeyKind = KeyKind::I32;
}

impl DictKey for i64 {
    const KIND: KeyKind = KeyKind::I64;
}
