//! SARC parsing: raw bytes into a [`Container`].

use crate::format::raw::{read_u16, read_u32, Endian};
use crate::format::{
    AlignMode, Container, Member, ATTR_HAS_NAME, SARC_HEADER_SIZE, SARC_MAGIC, SFAT_HEADER_SIZE,
    SFAT_MAGIC, SFAT_NODE_SIZE, SFNT_HEADER_SIZE, SFNT_MAGIC, VERSION,
};
use crate::{Error, Result};

/// Smallest possible archive: the three fixed headers, no members.
const MIN_ARCHIVE_SIZE: usize = SARC_HEADER_SIZE + SFAT_HEADER_SIZE + SFNT_HEADER_SIZE;

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidArchive(msg.into())
}

/// Checks whether the header fields make sense under a candidate byte order.
///
/// Used when the BOM is damaged: the declared header size, file size, and
/// data offset must all stay within the buffer for an interpretation to be
/// accepted.
fn header_consistent(data: &[u8], endian: Endian) -> bool {
    let Some(header_size) = read_u16(data, 4, endian) else {
        return false;
    };
    let Some(file_size) = read_u32(data, 8, endian) else {
        return false;
    };
    let Some(data_offset) = read_u32(data, 12, endian) else {
        return false;
    };
    header_size as usize == SARC_HEADER_SIZE
        && file_size as usize <= data.len()
        && data_offset <= file_size
        && data_offset as usize >= MIN_ARCHIVE_SIZE
}

/// Detects the archive byte order.
///
/// The BOM is authoritative when intact. When it matches neither order, both
/// interpretations of the header are tried and the consistent one wins.
fn detect_endian(data: &[u8]) -> Result<Endian> {
    let bom = [data[6], data[7]];
    if let Some(endian) = Endian::from_bom(bom) {
        return Ok(endian);
    }
    for endian in [Endian::Big, Endian::Little] {
        if header_consistent(data, endian) {
            log::debug!("damaged BOM {bom:02x?}, recovered byte order {endian:?}");
            return Ok(endian);
        }
    }
    Err(Error::UnsupportedEndianness)
}

/// Parses SARC bytes into a [`Container`] tagged with the given layout.
pub fn parse(data: &[u8], align_mode: AlignMode, min_alignment: usize) -> Result<Container> {
    if data.len() < MIN_ARCHIVE_SIZE {
        return Err(invalid(format!(
            "buffer of {} bytes is too small for the fixed headers",
            data.len()
        )));
    }
    if &data[0..4] != SARC_MAGIC {
        return Err(invalid("missing SARC magic"));
    }
    let endian = detect_endian(data)?;

    let header_size = read_u16(data, 4, endian).unwrap_or(0);
    if header_size as usize != SARC_HEADER_SIZE {
        return Err(invalid(format!(
            "SARC header size {header_size:#x}, expected {SARC_HEADER_SIZE:#x}"
        )));
    }
    let file_size = read_u32(data, 8, endian).unwrap_or(0) as usize;
    let data_offset = read_u32(data, 12, endian).unwrap_or(0) as usize;
    let version = read_u16(data, 16, endian).unwrap_or(0);
    if version != VERSION {
        return Err(invalid(format!("unsupported version {version:#06x}")));
    }
    if file_size > data.len() {
        return Err(invalid(format!(
            "declared file size {file_size} exceeds buffer of {}",
            data.len()
        )));
    }
    if data_offset > file_size || data_offset < MIN_ARCHIVE_SIZE {
        return Err(invalid(format!("data offset {data_offset:#x} out of range")));
    }

    // SFAT section.
    let sfat = SARC_HEADER_SIZE;
    if &data[sfat..sfat + 4] != SFAT_MAGIC {
        return Err(invalid("missing SFAT magic"));
    }
    let sfat_header_size = read_u16(data, sfat + 4, endian).unwrap_or(0);
    if sfat_header_size as usize != SFAT_HEADER_SIZE {
        return Err(invalid(format!(
            "SFAT header size {sfat_header_size:#x}, expected {SFAT_HEADER_SIZE:#x}"
        )));
    }
    let count = read_u16(data, sfat + 6, endian).unwrap_or(0) as usize;
    let nodes_start = sfat + SFAT_HEADER_SIZE;
    let sfnt = nodes_start + count * SFAT_NODE_SIZE;
    if sfnt + SFNT_HEADER_SIZE > data_offset {
        return Err(invalid(format!(
            "{count} SFAT nodes do not fit before the data section"
        )));
    }

    // SFNT section.
    if &data[sfnt..sfnt + 4] != SFNT_MAGIC {
        return Err(invalid("missing SFNT magic"));
    }
    let sfnt_header_size = read_u16(data, sfnt + 4, endian).unwrap_or(0);
    if sfnt_header_size as usize != SFNT_HEADER_SIZE {
        return Err(invalid(format!(
            "SFNT header size {sfnt_header_size:#x}, expected {SFNT_HEADER_SIZE:#x}"
        )));
    }
    let name_table = sfnt + SFNT_HEADER_SIZE;

    let mut members = Vec::with_capacity(count);
    for i in 0..count {
        let node = nodes_start + i * SFAT_NODE_SIZE;
        let attrs = read_u32(data, node + 4, endian)
            .ok_or_else(|| invalid("truncated SFAT node"))?;
        let start = read_u32(data, node + 8, endian)
            .ok_or_else(|| invalid("truncated SFAT node"))? as usize;
        let end = read_u32(data, node + 12, endian)
            .ok_or_else(|| invalid("truncated SFAT node"))? as usize;

        if attrs & ATTR_HAS_NAME == 0 {
            // Hash-only archives exist in the wild but an editor cannot
            // address nameless members.
            return Err(invalid(format!("SFAT node {i} carries no name")));
        }
        let name_offset = name_table + ((attrs & 0x00FF_FFFF) as usize) * 4;
        if name_offset >= data_offset {
            return Err(invalid(format!(
                "node {i} name offset {name_offset:#x} outside the name table"
            )));
        }
        let name_end = data[name_offset..data_offset]
            .iter()
            .position(|&b| b == 0)
            .map(|p| name_offset + p)
            .ok_or_else(|| invalid(format!("node {i} name is not NUL-terminated")))?;
        let name = std::str::from_utf8(&data[name_offset..name_end])
            .map_err(|_| invalid(format!("node {i} name is not valid UTF-8")))?
            .to_string();

        if end < start || data_offset + end > file_size {
            return Err(invalid(format!(
                "member '{name}' data range {start:#x}..{end:#x} out of bounds"
            )));
        }
        let bytes = data[data_offset + start..data_offset + end].to_vec();
        members.push(Member::new(name, bytes));
    }

    Container::from_members(endian, align_mode, min_alignment, members)
}
