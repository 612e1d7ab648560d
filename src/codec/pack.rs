//! Generic pack codec
//!
//! Packs scalars and length-prefixed byte strings into a byte buffer.
//! `unpack` reports the slot length it consumed so callers can walk a
//! sequence of packed values without separate length bookkeeping.

use std::mem::size_of;

use bytes::{BufMut, BytesMut};

use crate::error::Result;
use crate::DictError;

use super::align_up;

/// Size of the `LenHeader` prefix in front of packed byte strings
pub const LEN_HEADER_SIZE: usize = 8;

/// Prefix of a packed byte string
///
/// The payload occupies the first `size` bytes of a `capacity`-byte region;
/// the rest is slack left by alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LenHeader {
    pub capacity: u32,
    pub size: u32,
}

impl LenHeader {
    /// Append the header to `buf`
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.capacity.to_ne_bytes());
        buf.put_slice(&self.size.to_ne_bytes());
    }

    /// Read a header from the start of `data`
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < LEN_HEADER_SIZE {
            return Err(DictError::Corruption(format!(
                "packed value truncated: {} bytes left, need {} for header",
                data.len(),
                LEN_HEADER_SIZE
            )));
        }
        let capacity = u32::from_ne_bytes([data[0], data[1], data[2], data[3]]);
        let size = u32::from_ne_bytes([data[4], data[5], data[6], data[7]]);
        Ok(Self { capacity, size })
    }

    /// Header plus payload region
    pub fn slot_len(&self) -> usize {
        LEN_HEADER_SIZE + self.capacity as usize
    }
}

/// Values that can be appended to a pack buffer
pub trait Pack {
    /// Bytes the value occupies once packed
    fn packed_len(&self, align: bool) -> usize;

    /// Append the packed value to `buf`, returning the slot length written
    fn pack(&self, buf: &mut BytesMut, align: bool) -> Result<usize>;
}

/// Values that can be read back from packed bytes, borrowing where possible
pub trait Unpack<'a>: Sized {
    /// Decode the value at the start of `data`, returning it with the slot
    /// length consumed
    fn unpack(data: &'a [u8], align: bool) -> Result<(Self, usize)>;

    /// Slot length of the value at the start of `data`
    fn slot_len(data: &[u8], align: bool) -> Result<usize>;
}

fn scalar_slot_len(width: usize, align: bool) -> usize {
    if align {
        align_up(width)
    } else {
        width
    }
}

macro_rules! impl_scalar_pack {
    ($($t:ty),* $(,)?) => {$(
        impl Pack for $t {
            fn packed_len(&self, align: bool) -> usize {
                scalar_slot_len(size_of::<$t>(), align)
            }

            fn pack(&self, buf: &mut BytesMut, align: bool) -> Result<usize> {
                let slot = self.packed_len(align);
                let start = buf.len();
                buf.put_slice(&self.to_ne_bytes());
                buf.resize(start + slot, 0);
                Ok(slot)
            }
        }

        impl<'a> Unpack<'a> for $t {
            fn unpack(data: &'a [u8], align: bool) -> Result<(Self, usize)> {
                let raw = data
                    .get(..size_of::<$t>())
                    .and_then(|bytes| bytes.try_into().ok())
                    .ok_or_else(|| {
                        DictError::Corruption(format!(
                            "packed {} truncated: {} bytes left",
                            stringify!($t),
                            data.len()
                        ))
                    })?;
                Ok((<$t>::from_ne_bytes(raw), scalar_slot_len(size_of::<$t>(), align)))
            }

            fn slot_len(_data: &[u8], align: bool) -> Result<usize> {
                Ok(scalar_slot_len(size_of::<$t>(), align))
            }
        }
    )*};
}

impl_scalar_pack!(u32, u64, i32, i64);

impl Pack for [u8] {
    fn packed_len(&self, align: bool) -> usize {
        let raw = LEN_HEADER_SIZE + self.len();
        if align {
            align_up(raw)
        } else {
            raw
        }
    }

    fn pack(&self, buf: &mut BytesMut, align: bool) -> Result<usize> {
        let slot = self.packed_len(align);
        let size = u32::try_from(self.len()).map_err(|_| {
            DictError::InvalidArgument(format!("value of {} bytes is too large to pack", self.len()))
        })?;
        let capacity = u32::try_from(slot - LEN_HEADER_SIZE).map_err(|_| {
            DictError::InvalidArgument(format!("value of {} bytes is too large to pack", self.len()))
        })?;

        let start = buf.len();
        LenHeader { capacity, size }.encode(buf);
        buf.put_slice(self);
        buf.resize(start + slot, 0);
        Ok(slot)
    }
}

impl Pack for str {
    fn packed_len(&self, align: bool) -> usize {
        self.as_bytes().packed_len(align)
    }

    fn pack(&self, buf: &mut BytesMut, align: bool) -> Result<usize> {
        self.as_bytes().pack(buf, align)
    }
}

impl<'a> Unpack<'a> for &'a [u8] {
    fn unpack(data: &'a [u8], _align: bool) -> Result<(Self, usize)> {
        let header = LenHeader::decode(data)?;
        let slot = header.slot_len();
        if header.size > header.capacity || data.len() < slot {
            return Err(DictError::Corruption(format!(
                "packed value claims size {} in capacity {} with {} bytes available",
                header.size,
                header.capacity,
                data.len()
            )));
        }
        let end = LEN_HEADER_SIZE + header.size as usize;
        Ok((&data[LEN_HEADER_SIZE..end], slot))
    }

    fn slot_len(data: &[u8], _align: bool) -> Result<usize> {
        Ok(LenHeader::decode(data)?.slot_len())
    }
}

impl<'a> Unpack<'a> for &'a str {
    fn unpack(data: &'a [u8], align: bool) -> Result<(Self, usize)> {
        let (bytes, slot) = <&[u8]>::unpack(data, align)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|e| DictError::Corruption(format!("packed string is not UTF-8: {}", e)))?;
        Ok((s, slot))
    }

    fn slot_len(data: &[u8], align: bool) -> Result<usize> {
        <&[u8]>::slot_len(data, align)
    }
}
