//! Trailing-length framing for list entries
//!
//! A slot is the payload followed by filler and a u32 holding the payload
//! length in its last 4 bytes. The index only records where a slot starts;
//! its end is the next slot's start, and the trailer says how much of it is
//! payload.

use crate::error::Result;
use crate::DictError;

use super::{align_up, ALIGNMENT};

/// Size of the trailing payload length field
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Longest possible trailer: 7 bytes of filler plus the length field
const MAX_TRAILER_LEN: usize = ALIGNMENT - 1 + LENGTH_FIELD_SIZE;

/// Slot length for a payload of `payload_len` bytes
#[inline]
pub fn slot_len(payload_len: usize) -> usize {
    align_up(payload_len + LENGTH_FIELD_SIZE)
}

/// Filler and length field appended after a payload to complete its slot
#[derive(Debug, Clone, Copy)]
pub struct Trailer {
    bytes: [u8; MAX_TRAILER_LEN],
    len: usize,
}

impl Trailer {
    /// Build the trailer for a payload of `payload_len` bytes
    pub fn new(payload_len: usize) -> Result<Self> {
        let actual = u32::try_from(payload_len).map_err(|_| {
            DictError::InvalidArgument(format!(
                "payload of {} bytes exceeds the u32 length field",
                payload_len
            ))
        })?;

        let len = slot_len(payload_len) - payload_len;
        let mut bytes = [0u8; MAX_TRAILER_LEN];
        bytes[len - LENGTH_FIELD_SIZE..len].copy_from_slice(&actual.to_ne_bytes());
        Ok(Self { bytes, len })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Read the payload length from the last 4 bytes of `slot`
///
/// Fails with `Corruption` if the slot cannot hold the length field, or the
/// recorded length does not fit in front of it.
pub fn payload_len(slot: &[u8]) -> Result<usize> {
    if slot.len() < LENGTH_FIELD_SIZE {
        return Err(DictError::Corruption(format!(
            "slot of {} bytes is too short for a length field",
            slot.len()
        )));
    }

    let tail = &slot[slot.len() - LENGTH_FIELD_SIZE..];
    let actual = u32::from_ne_bytes([tail[0], tail[1], tail[2], tail[3]]) as usize;

    if actual > slot.len() - LENGTH_FIELD_SIZE {
        return Err(DictError::Corruption(format!(
            "length field {} exceeds slot of {} bytes",
            actual,
            slot.len()
        )));
    }
    Ok(actual)
}
