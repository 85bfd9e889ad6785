//! Shared fixtures for integration tests.

#![allow(dead_code)]

use nestarc::codec::yaz0;
use nestarc::{AlignMode, Container, Endian, Member};

/// Builds a flat big-endian archive from `(name, data)` pairs.
pub fn flat_archive(members: &[(&str, &[u8])]) -> Container {
    archive_with_endian(Endian::Big, members)
}

/// Builds a flat archive with an explicit byte order.
pub fn archive_with_endian(endian: Endian, members: &[(&str, &[u8])]) -> Container {
    let members = members
        .iter()
        .map(|(name, data)| Member::new(*name, *data))
        .collect();
    Container::from_members(endian, AlignMode::default(), 4, members).unwrap()
}

/// Serializes `inner` and embeds it as a member of a new archive, wrapping
/// it in Yaz0 when `compress` is set.
pub fn nest(inner: &Container, name: &str, compress: bool, siblings: &[(&str, &[u8])]) -> Container {
    let bytes = inner.serialize();
    let bytes = if compress {
        yaz0::compress(&bytes, yaz0::DEFAULT_LEVEL)
    } else {
        bytes
    };
    let mut members: Vec<(&str, &[u8])> = vec![(name, &bytes)];
    members.extend_from_slice(siblings);
    archive_with_endian(inner.endian(), &members)
}

/// A three-level fixture: root holds `Outer.pack`, which holds a
/// Yaz0-compressed `Inner.ssarc`, which holds `Data.byml` plus a sibling.
pub fn deep_fixture(data: &[u8]) -> Container {
    let inner = flat_archive(&[("Data.byml", data), ("Sibling.byml", b"sibling")]);
    let middle = nest(&inner, "Inner.ssarc", true, &[("Loose.txt", b"loose")]);
    nest(&middle, "Outer.pack", false, &[])
}
