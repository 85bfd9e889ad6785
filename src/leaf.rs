//! Leaf decode/encode collaborator.
//!
//! Leaf members (parameter files, binary key-value documents, message
//! tables) can be turned into an editable structured-text form and back.
//! That conversion lives outside this crate; the core only routes bytes
//! through a [`LeafCodec`] keyed by file name and never inspects the text.

/// The closed set of structured leaf formats a codec may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// Structured parameter archive (AAMP-style).
    Parameter,
    /// Binary key-value document (BYML-style).
    KeyValue,
    /// Message table (MSBT-style).
    MessageTable,
}

/// A decoded leaf: structured text plus the format it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafDocument {
    /// The structured-text representation, opaque to the core.
    pub text: String,
    /// Which leaf format produced the text; fed back into
    /// [`LeafCodec::encode`].
    pub kind: LeafKind,
}

/// Converts leaf bytes to structured text and back.
///
/// Errors are plain strings; the core wraps them as
/// [`Error::LeafCodec`](crate::Error::LeafCodec) without interpretation.
pub trait LeafCodec {
    /// Decodes a member's (already decompressed) bytes, keyed by its file
    /// name/extension.
    fn decode(&self, name: &str, data: &[u8]) -> std::result::Result<LeafDocument, String>;

    /// Encodes structured text back into member bytes.
    fn encode(&self, doc: &LeafDocument) -> std::result::Result<Vec<u8>, String>;
}
