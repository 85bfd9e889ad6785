//! Stock-hash collaborator: "is this member modified from stock?"
//!
//! The tree projector marks members whose content differs from a known-good
//! reference table. The table itself is supplied by the caller; the core only
//! asks yes/no questions through [`StockHashes`] and never lets the answer
//! affect mutation correctness.

use std::collections::HashMap;

/// Canonicalizes a member name for stock-table lookup.
///
/// Compressed members carry `.sXXX` extensions while reference tables index
/// the uncompressed name, so every `.s` run collapses to `.` before lookup
/// (`Enemy.sbactorpack` matches the stock entry for `Enemy.bactorpack`).
pub fn canonical_name(name: &str) -> String {
    name.replace(".s", ".")
}

/// Answers whether a member's content differs from its stock counterpart.
///
/// Implementations receive the canonical member name and the member's
/// decompressed bytes. Purely advisory.
pub trait StockHashes {
    /// Returns `true` when `data` differs from the known-good content for
    /// `name`.
    fn is_modified(&self, name: &str, data: &[u8]) -> bool;
}

/// A stock table backed by CRC-32 digests of reference content.
///
/// # Examples
///
/// ```
/// use nestarc::hashes::{CrcHashTable, StockHashes};
///
/// let table = CrcHashTable::from_stock([("Data.byml", b"stock bytes" as &[u8])]);
/// assert!(!table.is_modified("Data.byml", b"stock bytes"));
/// assert!(table.is_modified("Data.byml", b"edited bytes"));
/// assert!(table.is_modified("New.byml", b"anything")); // unknown names count as new
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrcHashTable {
    digests: HashMap<String, u32>,
    count_new: bool,
}

impl CrcHashTable {
    /// Creates an empty table. Unknown names count as modified.
    pub fn new() -> Self {
        Self {
            digests: HashMap::new(),
            count_new: true,
        }
    }

    /// Builds a table by digesting reference content.
    pub fn from_stock<'a>(stock: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Self {
        let mut table = Self::new();
        for (name, data) in stock {
            table.insert(name, crc32fast::hash(data));
        }
        table
    }

    /// Records a precomputed digest for a canonical name.
    pub fn insert(&mut self, name: &str, digest: u32) {
        self.digests.insert(name.to_string(), digest);
    }

    /// Sets whether names absent from the table count as modified.
    pub fn count_new(mut self, count_new: bool) -> Self {
        self.count_new = count_new;
        self
    }

    /// Returns the number of recorded digests.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

impl StockHashes for CrcHashTable {
    fn is_modified(&self, name: &str, data: &[u8]) -> bool {
        match self.digests.get(name) {
            Some(digest) => crc32fast::hash(data) != *digest,
            None => self.count_new,
        }
    }
}

/// A null table: nothing is ever marked modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStockHashes;

impl StockHashes for NoStockHashes {
    fn is_modified(&self, _name: &str, _data: &[u8]) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("Enemy.sbactorpack"), "Enemy.bactorpack");
        assert_eq!(canonical_name("Data.byml"), "Data.byml");
        assert_eq!(canonical_name("Pack.ssarc"), "Pack.sarc");
    }

    #[test]
    fn test_crc_table_detects_changes() {
        let table = CrcHashTable::from_stock([("a.bin", b"one" as &[u8])]);
        assert!(!table.is_modified("a.bin", b"one"));
        assert!(table.is_modified("a.bin", b"two"));
    }

    #[test]
    fn test_unknown_names_follow_count_new() {
        let strict = CrcHashTable::new();
        assert!(strict.is_modified("new.bin", b""));
        let lax = CrcHashTable::new().count_new(false);
        assert!(!lax.is_modified("new.bin", b""));
    }

    #[test]
    fn test_no_stock_hashes() {
        assert!(!NoStockHashes.is_modified("anything", b"at all"));
    }
}
