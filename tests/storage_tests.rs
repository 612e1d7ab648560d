//! Tests for the file header and dict file inspection

use std::path::PathBuf;

use atlasdict::storage::{DictFile, DictState, DictType, FileHeader, HEADER_SIZE, MAGIC};
use atlasdict::{Config, DictError, DictInfo, KvDict, ListDict};
use tempfile::TempDir;

fn setup_temp_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.rdict");
    (temp_dir, path)
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_layout() {
    let header = FileHeader {
        index_size: 80,
        data_size: 24,
        data_pad_size: 0,
        magic: MAGIC,
        dict_type: DictType::List,
    };
    let block = header.encode();

    assert_eq!(block.len() as u64, HEADER_SIZE);
    assert_eq!(&block[0..8], &80u64.to_ne_bytes());
    assert_eq!(&block[8..16], &24u64.to_ne_bytes());
    assert_eq!(&block[18..20], &0xD1C7u16.to_ne_bytes());
    assert_eq!(block[20], 1);
    assert!(block[21..].iter().all(|b| *b == 0));

    assert_eq!(FileHeader::decode(&block).unwrap(), header);
    assert_eq!(header.data_end(), Some(HEADER_SIZE + 24));
    assert_eq!(header.index_start(), Some(HEADER_SIZE + 24));
}

#[test]
fn test_header_new_is_empty() {
    let header = FileHeader::new(DictType::Kv);
    assert_eq!(header.magic, MAGIC);
    assert_eq!(header.index_size, 0);
    assert_eq!(header.data_size, 0);
    assert_eq!(header.dict_type, DictType::Kv);
}

#[test]
fn test_header_rejects_short_input() {
    let block = FileHeader::new(DictType::List).encode();
    assert!(matches!(
        FileHeader::decode(&block[..100]),
        Err(DictError::InvalidArgument(_))
    ));
}

#[test]
fn test_header_rejects_bad_magic() {
    let mut block = FileHeader::new(DictType::List).encode();
    block[18] ^= 0xff;
    assert!(matches!(
        FileHeader::decode(&block),
        Err(DictError::InvalidArgument(_))
    ));
}

#[test]
fn test_header_rejects_unknown_type() {
    let mut block = FileHeader::new(DictType::List).encode();
    block[20] = 9;
    assert!(matches!(
        FileHeader::decode(&block),
        Err(DictError::InvalidArgument(_))
    ));
}

#[test]
fn test_header_offsets_overflow() {
    let header = FileHeader {
        index_size: 0,
        data_size: u64::MAX,
        data_pad_size: 0,
        magic: MAGIC,
        dict_type: DictType::List,
    };
    assert_eq!(header.data_end(), None);
    assert_eq!(header.index_start(), None);
}

#[test]
fn test_dict_type_tags() {
    assert_eq!(DictType::from_u8(0).unwrap(), DictType::Kv);
    assert_eq!(DictType::from_u8(1).unwrap(), DictType::List);
    assert_eq!(DictType::from_u8(2).unwrap(), DictType::MultiKv);
    assert_eq!(DictType::List.to_string(), "list");
}

// =============================================================================
// DictInfo Tests
// =============================================================================

#[test]
fn test_info_for_list() {
    let (_temp, path) = setup_temp_file();

    let mut list = ListDict::create(&path).unwrap();
    list.add(b"hello").unwrap();
    list.add(b"world!").unwrap();
    list.commit().unwrap();
    drop(list);

    let info = DictInfo::read(&path).unwrap();
    assert_eq!(info.dict_type, DictType::List);
    assert_eq!(info.entries, 2);
    assert_eq!(info.data_size, 16 + 16);
    assert_eq!(info.file_size, HEADER_SIZE + info.data_size + info.index_size);
}

#[test]
fn test_info_for_kv() {
    let (_temp, path) = setup_temp_file();

    let mut kv = KvDict::<u32>::create(&path, 3).unwrap();
    kv.put(&1, b"one").unwrap();
    kv.put(&2, b"two").unwrap();
    kv.commit().unwrap();
    drop(kv);

    let info = DictInfo::read(&path).unwrap();
    assert_eq!(info.dict_type, DictType::Kv);
    assert_eq!(info.entries, 2);
    // 64-byte meta + 4 buckets
    assert_eq!(info.index_size, 64 + 4 * 8);
    // next (8) + key (8) + value header and bytes (16), per entry
    assert_eq!(info.data_size, 2 * 32);
}

#[test]
fn test_info_rejects_uncommitted_file() {
    let (_temp, path) = setup_temp_file();

    let mut list = ListDict::create(&path).unwrap();
    list.add(b"never committed").unwrap();
    drop(list);

    assert!(DictInfo::read(&path).is_err());
}

// =============================================================================
// DictFile Lifecycle Tests
// =============================================================================

#[test]
fn test_rollback_discards_partial_entry() {
    let (_temp, path) = setup_temp_file();
    let config = Config::builder().path(&path).truncate(true).build();

    let (mut file, index) = DictFile::open(&config, DictType::List).unwrap();
    assert!(index.is_none());
    assert_eq!(file.data_end(), HEADER_SIZE);

    let first = file.append(b"complete").unwrap();
    let partial = file.append(b"half an entry").unwrap();
    assert_eq!(partial, first + 8);

    file.rollback(partial);
    assert_eq!(file.data_end(), partial);
    assert_eq!(file.append(b"next").unwrap(), partial);

    // Offsets outside the data region are ignored
    let end = file.data_end();
    file.rollback(0);
    file.rollback(end + 64);
    assert_eq!(file.data_end(), end);
}

#[test]
fn test_reserve_grows_mapping_up_front() {
    let (_temp, path) = setup_temp_file();
    let config = Config::builder()
        .path(&path)
        .truncate(true)
        .reserved_space_bytes(0)
        .build();

    let (mut file, _) = DictFile::open(&config, DictType::List).unwrap();
    file.reserve(1 << 20).unwrap();
    assert!(file.data().len() as u64 >= HEADER_SIZE + (1 << 20));
    assert_eq!(file.data_end(), HEADER_SIZE);
    assert!(!file.is_dirty());
}

#[test]
fn test_dirty_only_after_append() {
    let (_temp, path) = setup_temp_file();

    let mut list = ListDict::create(&path).unwrap();
    list.add(b"a").unwrap();
    list.commit().unwrap();
    drop(list);

    let config = Config::builder().path(&path).build();
    let (mut file, index) = DictFile::open(&config, DictType::List).unwrap();
    assert_eq!(file.state(), DictState::Building);
    assert!(!file.is_dirty());

    file.append(b"more").unwrap();
    assert!(file.is_dirty());

    let index = index.unwrap();
    file.commit(&index).unwrap();
    assert!(!file.is_dirty());
    assert_eq!(file.state(), DictState::Committed);
}
