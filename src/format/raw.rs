//! Low-level endian-aware primitive access for SARC parsing and writing.
//!
//! SARC integer fields follow the byte order declared by the archive's BOM,
//! so every helper takes an explicit [`Endian`]. Reads are slice-based and
//! bounds-checked; a short buffer surfaces as `None` and the caller turns it
//! into a structured error with format context.

/// Byte order of a container's integer fields, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Big-endian (Wii U archives).
    Big,
    /// Little-endian (Switch archives).
    Little,
}

impl Endian {
    /// The two-byte BOM as it appears at offset 6 of the SARC header.
    pub fn bom(self) -> [u8; 2] {
        match self {
            Endian::Big => [0xFE, 0xFF],
            Endian::Little => [0xFF, 0xFE],
        }
    }

    /// Interprets a BOM, if it matches either byte order.
    pub fn from_bom(bom: [u8; 2]) -> Option<Self> {
        match bom {
            [0xFE, 0xFF] => Some(Endian::Big),
            [0xFF, 0xFE] => Some(Endian::Little),
            _ => None,
        }
    }
}

/// Reads a `u16` at `offset`, or `None` if the buffer is too short.
pub fn read_u16(data: &[u8], offset: usize, endian: Endian) -> Option<u16> {
    let bytes: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
    Some(match endian {
        Endian::Big => u16::from_be_bytes(bytes),
        Endian::Little => u16::from_le_bytes(bytes),
    })
}

/// Reads a `u32` at `offset`, or `None` if the buffer is too short.
pub fn read_u32(data: &[u8], offset: usize, endian: Endian) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(match endian {
        Endian::Big => u32::from_be_bytes(bytes),
        Endian::Little => u32::from_le_bytes(bytes),
    })
}

/// Appends a `u16` in the given byte order.
pub fn write_u16(out: &mut Vec<u8>, value: u16, endian: Endian) {
    match endian {
        Endian::Big => out.extend_from_slice(&value.to_be_bytes()),
        Endian::Little => out.extend_from_slice(&value.to_le_bytes()),
    }
}

/// Appends a `u32` in the given byte order.
pub fn write_u32(out: &mut Vec<u8>, value: u32, endian: Endian) {
    match endian {
        Endian::Big => out.extend_from_slice(&value.to_be_bytes()),
        Endian::Little => out.extend_from_slice(&value.to_le_bytes()),
    }
}

/// Rounds `value` up to the next multiple of `alignment` (a power of two or
/// any positive value; zero passes through unchanged).
pub fn align_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        value
    } else {
        value.div_ceil(alignment) * alignment
    }
}

/// Pads `out` with zero bytes up to the next multiple of `alignment`.
pub fn pad_to(out: &mut Vec<u8>, alignment: usize) {
    let target = align_up(out.len(), alignment);
    out.resize(target, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_round_trip() {
        assert_eq!(Endian::from_bom(Endian::Big.bom()), Some(Endian::Big));
        assert_eq!(Endian::from_bom(Endian::Little.bom()), Some(Endian::Little));
        assert_eq!(Endian::from_bom([0x00, 0x00]), None);
    }

    #[test]
    fn test_read_write_round_trip() {
        for endian in [Endian::Big, Endian::Little] {
            let mut buf = Vec::new();
            write_u16(&mut buf, 0xBEEF, endian);
            write_u32(&mut buf, 0xDEAD_BEEF, endian);
            assert_eq!(read_u16(&buf, 0, endian), Some(0xBEEF));
            assert_eq!(read_u32(&buf, 2, endian), Some(0xDEAD_BEEF));
        }
    }

    #[test]
    fn test_short_buffer_reads_none() {
        assert_eq!(read_u32(&[1, 2, 3], 0, Endian::Big), None);
        assert_eq!(read_u16(&[1], 0, Endian::Little), None);
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(4, 4), 4);
        assert_eq!(align_up(5, 0x20), 0x20);
        assert_eq!(align_up(7, 0), 7);
    }

    #[test]
    fn test_pad_to() {
        let mut buf = vec![1u8; 5];
        pad_to(&mut buf, 8);
        assert_eq!(buf.len(), 8);
        assert_eq!(&buf[5..], &[0, 0, 0]);
    }
}
