//! SARC container format: constants, detection, parsing, and serialization.
//!
//! A SARC archive is a flat table of named byte blobs:
//!
//! ```text
//! +--------------------+ 0x00
//! | SARC header (0x14) |  magic, header size, BOM, file size, data offset, version
//! +--------------------+ 0x14
//! | SFAT header (0x0C) |  magic, header size, node count, hash key
//! | SFAT nodes (0x10*n)|  name hash, attributes, data start, data end
//! +--------------------+
//! | SFNT header (0x08) |  magic, header size, reserved
//! | name table         |  NUL-terminated names, each padded to 4 bytes
//! +--------------------+ data offset
//! | member data blocks |  aligned per the serialization mode
//! +--------------------+ file size
//! ```
//!
//! Nodes are sorted ascending by name hash for binary-search lookup. All
//! integer fields follow the byte order declared by the header BOM.

pub mod container;
pub mod parser;
pub mod raw;
pub mod writer;

pub use container::{AlignMode, Container, Member};
pub use raw::Endian;

use crate::codec::yaz0;

/// The SARC archive magic.
pub const SARC_MAGIC: &[u8; 4] = b"SARC";

/// The SFAT (file allocation table) section magic.
pub const SFAT_MAGIC: &[u8; 4] = b"SFAT";

/// The SFNT (file name table) section magic.
pub const SFNT_MAGIC: &[u8; 4] = b"SFNT";

/// Size of the SARC header in bytes.
pub const SARC_HEADER_SIZE: usize = 0x14;

/// Size of the SFAT header in bytes.
pub const SFAT_HEADER_SIZE: usize = 0x0C;

/// Size of one SFAT node in bytes.
pub const SFAT_NODE_SIZE: usize = 0x10;

/// Size of the SFNT header in bytes.
pub const SFNT_HEADER_SIZE: usize = 0x08;

/// The format version emitted by this writer.
pub const VERSION: u16 = 0x0100;

/// The multiplicative key of the SFAT name hash.
pub const HASH_KEY: u32 = 0x65;

/// SFAT attribute flag marking a node that carries a name-table offset.
pub const ATTR_HAS_NAME: u32 = 0x0100_0000;

/// Alignment applied to a member holding a nested archive.
pub const NESTED_ARCHIVE_ALIGNMENT: usize = 0x2000;

/// Computes the SFAT name hash: `h = h * key + byte` over the name bytes,
/// wrapping.
pub fn hash_name(name: &str, key: u32) -> u32 {
    name.bytes()
        .fold(0u32, |h, b| h.wrapping_mul(key).wrapping_add(u32::from(b)))
}

/// Returns whether `data` begins with the SARC magic.
pub fn is_container(data: &[u8]) -> bool {
    data.len() >= 4 && &data[0..4] == SARC_MAGIC
}

/// Returns whether `data` is a Yaz0 stream whose payload is a SARC archive.
///
/// This peeks at the compressed stream without decompressing it, the same
/// cheap classification interactive tree builders rely on.
pub fn is_compressed_container(data: &[u8]) -> bool {
    yaz0::peek_payload_magic(data) == Some(*SARC_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_name_matches_reference() {
        // h("a") = 0x61, h("ab") = 0x61 * 0x65 + 0x62
        assert_eq!(hash_name("a", HASH_KEY), 0x61);
        assert_eq!(hash_name("ab", HASH_KEY), 0x61 * 0x65 + 0x62);
        assert_eq!(hash_name("", HASH_KEY), 0);
    }

    #[test]
    fn test_detection() {
        assert!(is_container(b"SARC...."));
        assert!(!is_container(b"SAR"));
        assert!(!is_container(b"Yaz0...."));
    }

    #[test]
    fn test_compressed_container_detection() {
        let archive = Container::new(Endian::Little).serialize();
        let compressed = yaz0::compress(&archive, 7);
        assert!(is_compressed_container(&compressed));
        assert!(!is_compressed_container(&archive));
        assert!(!is_compressed_container(&yaz0::compress(b"plain text payload", 7)));
    }
}
