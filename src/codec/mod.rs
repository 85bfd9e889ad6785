//! Compression codecs for archive members.
//!
//! SARC ecosystems wrap individual archive members (and sometimes the root
//! archive itself) in Yaz0, a fixed-header run-length/LZ scheme. The codec is
//! a pure transform: detection, decompression, and compression never touch
//! archive structure.

pub mod yaz0;

pub use yaz0::{compress, decompress, decompress_if, is_compressed};
