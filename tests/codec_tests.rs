//! Tests for the pack codec and list entry framing

use atlasdict::codec::{
    align_up, payload_len, slot_len, LenHeader, Pack, Trailer, Unpack, LEN_HEADER_SIZE,
};
use atlasdict::DictError;
use bytes::BytesMut;

// =============================================================================
// Alignment
// =============================================================================

#[test]
fn test_align_up() {
    assert_eq!(align_up(0), 0);
    assert_eq!(align_up(1), 8);
    assert_eq!(align_up(8), 8);
    assert_eq!(align_up(9), 16);
}

// =============================================================================
// Frame Tests
// =============================================================================

#[test]
fn test_slot_len() {
    assert_eq!(slot_len(0), 8);
    assert_eq!(slot_len(1), 8);
    assert_eq!(slot_len(4), 8);
    assert_eq!(slot_len(5), 16);
    assert_eq!(slot_len(12), 16);
    assert_eq!(slot_len(13), 24);
}

#[test]
fn test_trailer_completes_slot() {
    for len in 0..32usize {
        let trailer = Trailer::new(len).unwrap();
        let bytes = trailer.as_bytes();
        assert_eq!(len + bytes.len(), slot_len(len));
        assert_eq!(&bytes[bytes.len() - 4..], &(len as u32).to_ne_bytes());
        assert!(bytes[..bytes.len() - 4].iter().all(|b| *b == 0));
    }
}

#[test]
fn test_payload_len_from_slot() {
    let mut slot = b"abc".to_vec();
    slot.extend_from_slice(Trailer::new(3).unwrap().as_bytes());
    assert_eq!(slot.len(), 8);
    assert_eq!(payload_len(&slot).unwrap(), 3);

    // A longer region (e.g. the last entry before padding) still reads its tail
    let mut slot = b"abcdefgh".to_vec();
    slot.extend_from_slice(Trailer::new(8).unwrap().as_bytes());
    assert_eq!(payload_len(&slot).unwrap(), 8);
}

#[test]
fn test_payload_len_short_slot() {
    assert!(matches!(payload_len(&[1, 2, 3]), Err(DictError::Corruption(_))));
}

#[test]
fn test_payload_len_exceeds_slot() {
    let mut slot = vec![0u8; 4];
    slot.extend_from_slice(&5u32.to_ne_bytes());
    assert!(matches!(payload_len(&slot), Err(DictError::Corruption(_))));

    let mut slot = vec![0u8; 4];
    slot.extend_from_slice(&4u32.to_ne_bytes());
    assert_eq!(payload_len(&slot).unwrap(), 4);
}

// =============================================================================
// Pack Tests
// =============================================================================

#[test]
fn test_len_header() {
    let mut buf = BytesMut::new();
    LenHeader { capacity: 16, size: 11 }.encode(&mut buf);
    assert_eq!(buf.len(), LEN_HEADER_SIZE);

    let header = LenHeader::decode(&buf).unwrap();
    assert_eq!(header, LenHeader { capacity: 16, size: 11 });
    assert_eq!(header.slot_len(), LEN_HEADER_SIZE + 16);

    assert!(matches!(LenHeader::decode(&buf[..7]), Err(DictError::Corruption(_))));
}

#[test]
fn test_pack_str_aligned() {
    let mut buf = BytesMut::new();
    assert_eq!("abc".packed_len(true), 16);
    assert_eq!("abc".pack(&mut buf, true).unwrap(), 16);
    assert_eq!(buf.len(), 16);

    let header = LenHeader::decode(&buf).unwrap();
    assert_eq!(header, LenHeader { capacity: 8, size: 3 });

    let (value, consumed) = <&str>::unpack(&buf, true).unwrap();
    assert_eq!(value, "abc");
    assert_eq!(consumed, 16);
}

#[test]
fn test_pack_bytes_unaligned() {
    let mut buf = BytesMut::new();
    let value: &[u8] = b"abc";
    assert_eq!(value.packed_len(false), 11);
    assert_eq!(value.pack(&mut buf, false).unwrap(), 11);

    let header = LenHeader::decode(&buf).unwrap();
    assert_eq!(header, LenHeader { capacity: 3, size: 3 });

    let (unpacked, consumed) = <&[u8]>::unpack(&buf, false).unwrap();
    assert_eq!(unpacked, b"abc");
    assert_eq!(consumed, 11);
    assert_eq!(<&[u8]>::slot_len(&buf, false).unwrap(), 11);
}

#[test]
fn test_pack_empty_bytes() {
    let mut buf = BytesMut::new();
    let value: &[u8] = b"";
    assert_eq!(value.pack(&mut buf, true).unwrap(), LEN_HEADER_SIZE);

    let (unpacked, consumed) = <&[u8]>::unpack(&buf, true).unwrap();
    assert!(unpacked.is_empty());
    assert_eq!(consumed, LEN_HEADER_SIZE);
}

#[test]
fn test_pack_scalars() {
    let mut buf = BytesMut::new();
    assert_eq!(7u32.pack(&mut buf, true).unwrap(), 8);
    assert_eq!(7u32.pack(&mut buf, false).unwrap(), 4);
    assert_eq!((-5i64).pack(&mut buf, true).unwrap(), 8);
    assert_eq!(buf.len(), 20);

    let (a, n) = u32::unpack(&buf, true).unwrap();
    assert_eq!((a, n), (7, 8));
    let (b, m) = u32::unpack(&buf[8..], false).unwrap();
    assert_eq!((b, m), (7, 4));
    let (c, _) = i64::unpack(&buf[12..], true).unwrap();
    assert_eq!(c, -5);
}

#[test]
fn test_walk_packed_sequence() {
    let mut buf = BytesMut::new();
    42u64.pack(&mut buf, true).unwrap();
    "hello".pack(&mut buf, true).unwrap();
    (-1i32).pack(&mut buf, true).unwrap();
    assert_eq!(buf.len() % 8, 0);

    let data = &buf[..];
    let (first, n1) = u64::unpack(data, true).unwrap();
    let (second, n2) = <&str>::unpack(&data[n1..], true).unwrap();
    let (third, n3) = i32::unpack(&data[n1 + n2..], true).unwrap();

    assert_eq!(first, 42);
    assert_eq!(second, "hello");
    assert_eq!(third, -1);
    assert_eq!(n1 + n2 + n3, buf.len());
}

// =============================================================================
// Unpack Validation
// =============================================================================

#[test]
fn test_unpack_truncated_scalar() {
    assert!(matches!(u64::unpack(&[0u8; 5], true), Err(DictError::Corruption(_))));
}

#[test]
fn test_unpack_size_above_capacity() {
    let mut buf = BytesMut::new();
    LenHeader { capacity: 2, size: 3 }.encode(&mut buf);
    buf.extend_from_slice(&[0u8; 8]);
    assert!(matches!(<&[u8]>::unpack(&buf, true), Err(DictError::Corruption(_))));
}

#[test]
fn test_unpack_truncated_payload() {
    let mut buf = BytesMut::new();
    LenHeader { capacity: 16, size: 10 }.encode(&mut buf);
    buf.extend_from_slice(&[0u8; 10]);
    assert!(matches!(<&[u8]>::unpack(&buf, true), Err(DictError::Corruption(_))));
}

#[test]
fn test_unpack_invalid_utf8() {
    let mut buf = BytesMut::new();
    let value: &[u8] = &[0xff, 0xfe];
    value.pack(&mut buf, true).unwrap();

    assert!(matches!(<&str>::unpack(&buf, true), Err(DictError::Corruption(_))));
    assert!(<&[u8]>::unpack(&buf, true).is_ok());
}
