//! SARC serialization: a [`Container`] back into archive bytes.

use crate::format::raw::{align_up, pad_to, write_u16, write_u32};
use crate::format::{
    hash_name, AlignMode, Container, Member, ATTR_HAS_NAME, HASH_KEY, NESTED_ARCHIVE_ALIGNMENT,
    SARC_HEADER_SIZE, SARC_MAGIC, SFAT_HEADER_SIZE, SFAT_MAGIC, SFAT_NODE_SIZE, SFNT_HEADER_SIZE,
    SFNT_MAGIC, VERSION,
};

/// Legacy-mode floor: old packers padded every member to 0x20 bytes.
const LEGACY_ALIGNMENT: usize = 0x20;

/// Alignment required for one member's data block.
fn member_alignment(container: &Container, member: &Member) -> usize {
    if member.is_nested_container() {
        return NESTED_ARCHIVE_ALIGNMENT.max(container.min_alignment());
    }
    match container.align_mode() {
        AlignMode::Legacy => container.min_alignment().max(LEGACY_ALIGNMENT),
        AlignMode::New => container.min_alignment(),
    }
}

/// Serializes a container into SARC bytes.
///
/// Nodes are sorted ascending by name hash (the order the format requires
/// for lookup); the name table and data blocks follow the same order. The
/// data section starts at the largest alignment any member needs so that
/// per-member alignment holds in absolute file offsets.
pub fn serialize(container: &Container) -> Vec<u8> {
    let endian = container.endian();

    let mut order: Vec<&Member> = container.members().iter().collect();
    order.sort_by_key(|m| hash_name(&m.name, HASH_KEY));

    // Name table offsets, in units of four bytes.
    let mut name_offsets = Vec::with_capacity(order.len());
    let mut name_table = Vec::new();
    for member in &order {
        name_offsets.push((name_table.len() / 4) as u32);
        name_table.extend_from_slice(member.name.as_bytes());
        name_table.push(0);
        pad_to(&mut name_table, 4);
    }

    let names_end =
        SARC_HEADER_SIZE + SFAT_HEADER_SIZE + order.len() * SFAT_NODE_SIZE + SFNT_HEADER_SIZE
            + name_table.len();
    let section_alignment = order
        .iter()
        .map(|m| member_alignment(container, m))
        .max()
        .unwrap_or(container.min_alignment());
    let data_offset = align_up(names_end, section_alignment);

    // Absolute placement of every data block.
    let mut ranges = Vec::with_capacity(order.len());
    let mut cursor = data_offset;
    for member in &order {
        let start = align_up(cursor, member_alignment(container, member));
        let end = start + member.data.len();
        ranges.push((start - data_offset, end - data_offset));
        cursor = end;
    }
    let file_size = cursor;

    // Construction bounds the member count to u16; the total size has no
    // such structural bound, so refuse to emit an unrepresentable archive.
    debug_assert!(order.len() <= u16::MAX as usize);
    assert!(
        file_size <= u32::MAX as usize,
        "serialized archive of {file_size} bytes exceeds the format's 4 GiB limit"
    );

    let mut out = Vec::with_capacity(file_size);

    // SARC header.
    out.extend_from_slice(SARC_MAGIC);
    write_u16(&mut out, SARC_HEADER_SIZE as u16, endian);
    out.extend_from_slice(&endian.bom());
    write_u32(&mut out, file_size as u32, endian);
    write_u32(&mut out, data_offset as u32, endian);
    write_u16(&mut out, VERSION, endian);
    write_u16(&mut out, 0, endian); // reserved

    // SFAT header and nodes.
    out.extend_from_slice(SFAT_MAGIC);
    write_u16(&mut out, SFAT_HEADER_SIZE as u16, endian);
    write_u16(&mut out, order.len() as u16, endian);
    write_u32(&mut out, HASH_KEY, endian);
    for ((member, name_offset), (start, end)) in
        order.iter().zip(&name_offsets).zip(&ranges)
    {
        write_u32(&mut out, hash_name(&member.name, HASH_KEY), endian);
        write_u32(&mut out, ATTR_HAS_NAME | name_offset, endian);
        write_u32(&mut out, *start as u32, endian);
        write_u32(&mut out, *end as u32, endian);
    }

    // SFNT header and the packed name table.
    out.extend_from_slice(SFNT_MAGIC);
    write_u16(&mut out, SFNT_HEADER_SIZE as u16, endian);
    write_u16(&mut out, 0, endian); // reserved
    out.extend_from_slice(&name_table);

    // Data section.
    for (member, (start, _)) in order.iter().zip(&ranges) {
        out.resize(data_offset + start, 0);
        out.extend_from_slice(&member.data);
    }
    debug_assert_eq!(out.len(), file_size);

    out
}
