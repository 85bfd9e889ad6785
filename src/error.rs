//! Error types for nested SARC archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when parsing, resolving, projecting, or editing nested
//! archives, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use nestarc::{Container, Result};
//!
//! fn open_root(bytes: &[u8]) -> Result<Container> {
//!     let container = Container::parse(bytes)?;
//!     Ok(container)
//! }
//! ```
//!
//! ## Exhaustive Error Matching
//!
//! For fine-grained handling, match on specific variants. Resolution errors
//! carry the full address and the exact nesting hop that failed, so a caller
//! can report precisely where a lookup went wrong:
//!
//! ```rust
//! use nestarc::Error;
//!
//! fn print_user_message(error: &Error) {
//!     match error {
//!         Error::InvalidArchive(_) => println!("The file is not a valid SARC archive."),
//!         Error::CorruptData(_) => println!("The Yaz0 stream is damaged."),
//!         Error::MemberNotFound { address, segment } => {
//!             println!("Could not find {segment} while resolving {address}.");
//!         }
//!         Error::InvalidName(name) => println!("{name} is not a valid file name."),
//!         _ => println!("Error: {error}"),
//!     }
//! }
//! ```

use std::io;

/// Helper struct for formatting [`Error::MemberNotFound`] messages.
struct MemberNotFoundDisplay<'a> {
    address: &'a str,
    segment: &'a str,
}

impl std::fmt::Display for MemberNotFoundDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.address == self.segment {
            write!(f, "member '{}' not found", self.segment)
        } else {
            write!(
                f,
                "member '{}' not found while resolving '{}'",
                self.segment, self.address
            )
        }
    }
}

/// The main error type for nested archive operations.
///
/// This enum represents all errors that can occur when parsing, resolving,
/// projecting, or mutating nested SARC archives. Each variant includes
/// relevant context to help diagnose the issue.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Format | [`InvalidArchive`][Self::InvalidArchive], [`UnsupportedEndianness`][Self::UnsupportedEndianness] | Invalid archive data |
/// | Compression | [`CorruptData`][Self::CorruptData] | Damaged Yaz0 framing |
/// | Resolution | [`MemberNotFound`][Self::MemberNotFound] | A nesting hop misses |
/// | Validation | [`InvalidName`][Self::InvalidName] | Forbidden rename target |
/// | Collaborator | [`LeafCodec`][Self::LeafCodec] | Leaf decode/encode failure |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    ///
    /// This wraps [`std::io::Error`] and is returned when reading a root
    /// archive from disk or walking a directory for a bulk update fails.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive bytes are not a valid SARC container.
    ///
    /// This error occurs when:
    /// - The buffer is too small to hold the fixed headers
    /// - The `SARC`/`SFAT`/`SFNT` magic bytes are missing
    /// - Declared offsets or counts point outside the buffer
    /// - Two members share the same name
    ///
    /// The string describes what was expected vs. found.
    #[error("invalid SARC archive: {0}")]
    InvalidArchive(String),

    /// A Yaz0 compressed stream is present but its framing is invalid.
    ///
    /// Returned by [`decompress`](crate::codec::yaz0::decompress) when the
    /// magic is present but the payload is truncated, a back-reference
    /// reaches before the start of the output, or the stream ends short of
    /// the declared decompressed size.
    #[error("corrupt Yaz0 data: {0}")]
    CorruptData(String),

    /// The header fields are inconsistent under both byte orders.
    ///
    /// SARC headers carry a byte-order mark, but a damaged file can carry a
    /// mark that matches neither order. The parser then tries both
    /// interpretations and accepts the one whose declared sizes stay within
    /// the buffer; if neither does, this error is returned.
    #[error("archive header is inconsistent under both endianness interpretations")]
    UnsupportedEndianness,

    /// A named member was absent at a specific nesting hop.
    ///
    /// `address` is the full address being resolved; `segment` is the exact
    /// hop that failed. Resolving `pack//missing.sarc//leaf.bin` against a
    /// root without `missing.sarc` reports `missing.sarc`, never `leaf.bin`.
    #[error("{}", MemberNotFoundDisplay { address, segment })]
    MemberNotFound {
        /// The full address that was being resolved.
        address: String,
        /// The path segment at which resolution failed.
        segment: String,
    },

    /// A rename target contains forbidden characters.
    ///
    /// Member names may not contain path separators, wildcards, or quote
    /// characters: `\ / : * ? " ' < > |`.
    #[error("'{0}' is not a valid file name")]
    InvalidName(String),

    /// The leaf decode/encode collaborator reported a failure.
    ///
    /// The message is propagated opaquely; the core never interprets leaf
    /// content.
    #[error("leaf codec error: {0}")]
    LeafCodec(String),
}

/// A specialized `Result` type for nested archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_not_found_reports_failing_segment() {
        let err = Error::MemberNotFound {
            address: "outer.pack//missing.sarc//leaf.bin".into(),
            segment: "missing.sarc".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.sarc"));
        assert!(msg.contains("outer.pack//missing.sarc//leaf.bin"));
    }

    #[test]
    fn test_member_not_found_flat_address() {
        let err = Error::MemberNotFound {
            address: "leaf.bin".into(),
            segment: "leaf.bin".into(),
        };
        assert_eq!(err.to_string(), "member 'leaf.bin' not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
