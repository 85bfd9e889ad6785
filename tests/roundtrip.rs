//! Round-trip integration tests for the SARC and Yaz0 codecs.

mod common;

use common::{archive_with_endian, flat_archive};
use nestarc::codec::yaz0;
use nestarc::format::{self, NESTED_ARCHIVE_ALIGNMENT};
use nestarc::{AlignMode, Container, Endian, Error};

#[test]
fn test_parse_serialize_is_byte_exact() {
    let archive = flat_archive(&[
        ("Actor/Enemy.bfres", b"model-data"),
        ("Sound/BGM.bars", b"sound-data"),
        ("readme.txt", b"hello"),
    ]);
    let bytes = archive.serialize();
    let reparsed = Container::parse(&bytes).unwrap();
    assert_eq!(reparsed.serialize(), bytes);
}

#[test]
fn test_little_endian_round_trip() {
    let archive = archive_with_endian(Endian::Little, &[("a.bin", b"abc"), ("b.bin", b"defg")]);
    let bytes = archive.serialize();
    let reparsed = Container::parse(&bytes).unwrap();
    assert_eq!(reparsed.endian(), Endian::Little);
    assert_eq!(reparsed.serialize(), bytes);
}

#[test]
fn test_legacy_layout_round_trip() {
    let archive = Container::with_layout(Endian::Big, AlignMode::Legacy, 4)
        .with_member("file.bin", b"payload".to_vec())
        .unwrap();
    let bytes = archive.serialize();
    let reparsed = Container::parse_with_layout(&bytes, AlignMode::Legacy, 4).unwrap();
    assert_eq!(reparsed.serialize(), bytes);
}

#[test]
fn test_nodes_are_hash_sorted_regardless_of_insertion_order() {
    let forward = flat_archive(&[("aaa.bin", b"1"), ("zzz.bin", b"2")]);
    let reverse = flat_archive(&[("zzz.bin", b"2"), ("aaa.bin", b"1")]);
    assert_eq!(forward.serialize(), reverse.serialize());
}

#[test]
fn test_nested_member_gets_wide_alignment() {
    let inner = flat_archive(&[("leaf.bin", b"x")]);
    let outer = flat_archive(&[("pad.txt", b"p"), ("Inner.sarc", &inner.serialize())]);
    let bytes = outer.serialize();
    let reparsed = Container::parse(&bytes).unwrap();
    let member = reparsed.get("Inner.sarc").unwrap();

    // The nested container's block must start on the wide boundary.
    let offset = bytes
        .windows(member.data.len())
        .position(|w| w == member.data)
        .unwrap();
    assert_eq!(offset % NESTED_ARCHIVE_ALIGNMENT, 0);
}

#[test]
fn test_empty_archive_round_trip() {
    let archive = Container::new(Endian::Big);
    let reparsed = Container::parse(&archive.serialize()).unwrap();
    assert!(reparsed.is_empty());
}

#[test]
fn test_bad_magic_is_rejected() {
    let mut bytes = flat_archive(&[("a.bin", b"x")]).serialize();
    bytes[0] = b'X';
    assert!(matches!(
        Container::parse(&bytes),
        Err(Error::InvalidArchive(_))
    ));
}

#[test]
fn test_damaged_bom_falls_back_to_header_probe() {
    let mut bytes = flat_archive(&[("a.bin", b"payload")]).serialize();
    // Corrupt the BOM; the header fields still only make sense big-endian.
    bytes[6] = 0;
    bytes[7] = 0;
    let reparsed = Container::parse(&bytes).unwrap();
    assert_eq!(reparsed.endian(), Endian::Big);
    assert_eq!(reparsed.get("a.bin").unwrap().data, b"payload");
}

#[test]
fn test_yaz0_wrapped_archive_detection() {
    let bytes = flat_archive(&[("a.bin", b"x")]).serialize();
    let compressed = yaz0::compress(&bytes, yaz0::DEFAULT_LEVEL);
    assert!(yaz0::is_compressed(&compressed));
    assert!(format::is_compressed_container(&compressed));
    assert!(!format::is_compressed_container(&bytes));
    assert_eq!(yaz0::decompress(&compressed).unwrap(), bytes);
}

#[test]
fn test_truncated_yaz0_stream_is_corrupt_not_panic() {
    let bytes = flat_archive(&[("a.bin", &[0xAB; 64])]).serialize();
    let compressed = yaz0::compress(&bytes, yaz0::DEFAULT_LEVEL);
    let truncated = &compressed[..compressed.len() - 4];
    assert!(matches!(
        yaz0::decompress(truncated),
        Err(Error::CorruptData(_))
    ));
}
