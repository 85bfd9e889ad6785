//! The editing session: a single open root archive and its mutation engine.

use std::path::Path;
use std::sync::Arc;

use crate::address::validate_member_name;
use crate::codec::yaz0;
use crate::format::{AlignMode, Container, Endian};
use crate::hashes::{canonical_name, StockHashes};
use crate::leaf::{LeafCodec, LeafDocument};
use crate::resolve::Resolver;
use crate::tree::{self, ModificationSet, Tree};
use crate::{Address, Error, Result};

use super::operation::Operation;
use super::should_compress_name;

/// Display metadata for one member, resolved at any nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// The member's file name (last `/`-separated part of the final
    /// segment).
    pub file: String,
    /// Decompressed size in bytes.
    pub size: usize,
    /// Whether the content differs from the stock reference. Advisory.
    pub modified: bool,
    /// Whether the member holds a nested container.
    pub nested: bool,
    /// Whether the member's bytes are stored Yaz0-compressed.
    pub compressed: bool,
}

/// A single-writer editing session over one root [`Container`].
///
/// The session owns the current root snapshot and the resolver cache. Every
/// mutation produces a fresh root via copy-on-write of the affected
/// container and all of its ancestors; the previous root stays untouched
/// until the whole rebuild chain has succeeded, at which point the new root
/// is installed and the resolver cache invalidated.
///
/// Reads ([`project`](Self::project), [`member_data`](Self::member_data))
/// are safe against the immutable snapshot; concurrent mutation of one
/// session is the caller's responsibility to serialize.
///
/// # Examples
///
/// ```
/// use nestarc::{Address, Container, Endian, SarcEditor};
///
/// let mut editor = SarcEditor::create(Endian::Big);
/// let addr = Address::new("Data.byml").unwrap();
/// editor.add_or_replace(&addr, b"contents".to_vec()).unwrap();
/// assert_eq!(editor.member_data(&addr, true).unwrap(), b"contents");
/// let bytes = editor.save();
/// assert!(Container::parse(&bytes).unwrap().contains("Data.byml"));
/// ```
pub struct SarcEditor {
    root: Arc<Container>,
    resolver: Resolver,
}

impl std::fmt::Debug for SarcEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SarcEditor")
            .field("members", &self.root.len())
            .field("endian", &self.root.endian())
            .finish()
    }
}

impl SarcEditor {
    /// Opens a session from raw archive bytes, undoing a Yaz0 wrapper on
    /// the root if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptData`] for broken root compression or
    /// [`Error::InvalidArchive`]/[`Error::UnsupportedEndianness`] for an
    /// unparseable archive.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let data = yaz0::decompress_if(bytes)?;
        Ok(Self::from_root(Container::parse(&data)?))
    }

    /// Opens a session by reading an archive from disk.
    ///
    /// This is the only input I/O the core performs; writing results back
    /// is the caller's job via [`save`](Self::save).
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    /// Creates a session over a fresh, empty root with default layout.
    pub fn create(endian: Endian) -> Self {
        Self::from_root(Container::new(endian))
    }

    /// Creates a session over a fresh, empty root with an explicit layout.
    pub fn create_with_layout(endian: Endian, align_mode: AlignMode, min_alignment: usize) -> Self {
        Self::from_root(Container::with_layout(endian, align_mode, min_alignment))
    }

    /// Wraps an already-parsed root container in a session.
    pub fn from_root(root: Container) -> Self {
        Self {
            root: Arc::new(root),
            resolver: Resolver::new(),
        }
    }

    /// Returns the current root snapshot.
    pub fn root(&self) -> &Arc<Container> {
        &self.root
    }

    /// Returns the root's byte order.
    pub fn endian(&self) -> Endian {
        self.root.endian()
    }

    /// Serializes the current root to archive bytes.
    ///
    /// The core never writes the result to disk; the caller persists the
    /// bytes, applying [`yaz0::compress`] first when the destination name
    /// warrants it (see [`should_compress_name`]).
    pub fn save(&self) -> Vec<u8> {
        self.root.serialize()
    }

    /// Projects the current root into its display tree and modification
    /// set.
    pub fn project(&self, hashes: &dyn StockHashes) -> (Tree, ModificationSet) {
        tree::project(&self.root, hashes)
    }

    /// Returns a member's bytes at any nesting depth, optionally undoing
    /// Yaz0.
    pub fn member_data(&mut self, address: &Address, decompress: bool) -> Result<Vec<u8>> {
        self.resolver.member_data(&self.root, address, decompress)
    }

    /// Returns a member's decompressed payload, for extraction to disk by
    /// the caller.
    pub fn extract_member(&mut self, address: &Address) -> Result<Vec<u8>> {
        self.member_data(address, true)
    }

    /// Resolves display metadata for one member.
    ///
    /// Members living inside a compressed nested archive are never marked
    /// modified: the stock table indexes canonical top-level names and has
    /// no entry to compare them against.
    pub fn member_info(&mut self, address: &Address, hashes: &dyn StockHashes) -> Result<MemberInfo> {
        let member = self.resolver.resolve_member(&self.root, address)?;
        let data = yaz0::decompress_if(&member.data)?;
        let file = address
            .leaf()
            .rsplit('/')
            .next()
            .unwrap_or(address.leaf())
            .to_string();
        let inside_compressed = {
            let hops: Vec<&str> = address.segments().collect();
            hops[..hops.len() - 1].iter().any(|s| should_compress_name(s))
        };
        let modified = if inside_compressed {
            false
        } else {
            hashes.is_modified(&canonical_name(address.leaf()), &data)
        };
        Ok(MemberInfo {
            file,
            size: data.len(),
            modified,
            nested: member.is_nested_container(),
            compressed: member.is_compressed(),
        })
    }

    /// Decodes a leaf member through the supplied codec.
    pub fn open_leaf(&mut self, address: &Address, codec: &dyn LeafCodec) -> Result<LeafDocument> {
        let data = self.member_data(address, true)?;
        codec
            .decode(address.leaf(), &data)
            .map_err(Error::LeafCodec)
    }

    /// Encodes a leaf document and stores it at `address`, rebuilding to
    /// the root.
    pub fn save_leaf(
        &mut self,
        address: &Address,
        doc: &LeafDocument,
        codec: &dyn LeafCodec,
    ) -> Result<()> {
        let bytes = codec.encode(doc).map_err(Error::LeafCodec)?;
        self.add_or_replace(address, bytes)
    }

    /// Applies one [`Operation`].
    pub fn apply(&mut self, op: Operation) -> Result<()> {
        log::debug!("applying {} at {:?}", op.kind(), op.target().map(Address::as_str));
        match op {
            Operation::Delete { address } => self.delete(&address),
            Operation::Rename { address, new_name } => self.rename(&address, &new_name),
            Operation::AddOrReplace { address, data } => self.add_or_replace(&address, data),
            Operation::UpdateFromTree { container, files } => {
                self.update_from_tree(container.as_ref(), files)
            }
        }
    }

    /// Removes the member at `address` and rebuilds every ancestor up to
    /// the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if any hop (or the member itself)
    /// is absent; the session is left unchanged on any failure.
    pub fn delete(&mut self, address: &Address) -> Result<()> {
        let parent = self.resolver.resolve_parent(&self.root, address)?;
        let name = address.leaf();
        if !parent.contains(name) {
            return Err(self.not_found(address, name));
        }
        let rebuilt = parent.without_member(name)?;
        self.install_rebuilt(address.parent(), rebuilt)
    }

    /// Renames the member at `address` to `new_name` within its containing
    /// archive, keeping any directory prefix of the old name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] when `new_name` contains forbidden
    /// characters, [`Error::MemberNotFound`] when the member is absent, or
    /// [`Error::InvalidArchive`] when the target name is already taken.
    pub fn rename(&mut self, address: &Address, new_name: &str) -> Result<()> {
        validate_member_name(new_name)?;
        let parent = self.resolver.resolve_parent(&self.root, address)?;
        let old = address.leaf();
        if !parent.contains(old) {
            return Err(self.not_found(address, old));
        }
        let full = match address.leaf_dir() {
            Some(dir) => format!("{dir}/{new_name}"),
            None => new_name.to_string(),
        };
        let rebuilt = parent.with_renamed(old, &full)?;
        self.install_rebuilt(address.parent(), rebuilt)
    }

    /// Sets the member at `address` to `data`, appending it if absent, and
    /// rebuilds every ancestor up to the root.
    ///
    /// Used for both adding and updating; callers pre-check existence only
    /// for display purposes.
    pub fn add_or_replace(&mut self, address: &Address, data: Vec<u8>) -> Result<()> {
        let parent = self.resolver.resolve_parent(&self.root, address)?;
        let rebuilt = parent.with_member(address.leaf(), data)?;
        self.install_rebuilt(address.parent(), rebuilt)
    }

    /// Merges an external file set into the container at `container`
    /// (`None` targets the root).
    ///
    /// Every `(relative path, bytes)` pair is applied as an add-or-replace
    /// under the container; members absent from the set are left untouched.
    /// The ancestor chain is rebuilt once at the end, which produces output
    /// identical to applying each pair sequentially.
    pub fn update_from_tree(
        &mut self,
        container: Option<&Address>,
        files: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> Result<()> {
        let mut target = match container {
            None => (*self.root).clone(),
            Some(address) => {
                let member = self.resolver.resolve_member(&self.root, address)?;
                let bytes = yaz0::decompress_if(&member.data)?;
                Container::parse(&bytes)?
            }
        };
        for (path, data) in files {
            let name = path.replace('\\', "/");
            target = target.with_member(&name, data)?;
        }
        self.install_rebuilt(container.cloned(), target)
    }

    /// Walks `dir` and merges every file below it into the container at
    /// `container`, using `/`-separated paths relative to `dir` as member
    /// names.
    pub fn update_from_dir(
        &mut self,
        container: Option<&Address>,
        dir: impl AsRef<Path>,
    ) -> Result<()> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(dir)
                .map_err(std::io::Error::other)?;
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((name, std::fs::read(entry.path())?));
        }
        self.update_from_tree(container, files)
    }

    /// Re-embeds a rebuilt container at `at` through every ancestor and
    /// installs the resulting root.
    ///
    /// `at` is the address of the member that held `rebuilt` (`None` when
    /// `rebuilt` is the new root itself). At each level the rebuilt child
    /// is serialized, recompressed when the superseded member's bytes
    /// carried the Yaz0 magic (falling back to the `.sXXX` name convention
    /// only when there are no prior bytes), and spliced into the parent via
    /// copy-on-write. Nothing observable changes until the final install.
    fn install_rebuilt(&mut self, at: Option<Address>, rebuilt: Container) -> Result<()> {
        let mut current = rebuilt;
        let mut member_addr = at;
        while let Some(address) = member_addr {
            let bytes = current.serialize();
            let parent = self.resolver.resolve_parent(&self.root, &address)?;
            let name = address.leaf();
            let data = match parent.get(name) {
                Some(prior) if prior.is_compressed() => yaz0::compress(&bytes, yaz0::DEFAULT_LEVEL),
                Some(_) => bytes,
                // No history for this slot: fall back to the naming
                // convention, defaulting to uncompressed.
                None if should_compress_name(name) => yaz0::compress(&bytes, yaz0::DEFAULT_LEVEL),
                None => bytes,
            };
            current = parent.with_member(name, data)?;
            member_addr = address.parent();
        }
        self.root = Arc::new(current);
        self.resolver.clear();
        Ok(())
    }

    fn not_found(&self, address: &Address, segment: &str) -> Error {
        Error::MemberNotFound {
            address: address.as_str().to_string(),
            segment: segment.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_editor() -> SarcEditor {
        let mut editor = SarcEditor::create(Endian::Big);
        editor
            .add_or_replace(&Address::new("a.bin").unwrap(), b"aaa".to_vec())
            .unwrap();
        editor
            .add_or_replace(&Address::new("dir/b.bin").unwrap(), b"bbb".to_vec())
            .unwrap();
        editor
    }

    #[test]
    fn test_add_and_read_back() {
        let mut editor = flat_editor();
        let addr = Address::new("a.bin").unwrap();
        assert_eq!(editor.member_data(&addr, true).unwrap(), b"aaa");
    }

    #[test]
    fn test_delete_removes_member() {
        let mut editor = flat_editor();
        editor.delete(&Address::new("a.bin").unwrap()).unwrap();
        assert!(!editor.root().contains("a.bin"));
        assert!(editor.root().contains("dir/b.bin"));
    }

    #[test]
    fn test_delete_missing_is_atomic() {
        let mut editor = flat_editor();
        let before = Arc::clone(editor.root());
        let err = editor.delete(&Address::new("missing.bin").unwrap());
        assert!(matches!(err, Err(Error::MemberNotFound { .. })));
        assert!(Arc::ptr_eq(&before, editor.root()));
    }

    #[test]
    fn test_rename_keeps_directory_prefix() {
        let mut editor = flat_editor();
        editor
            .rename(&Address::new("dir/b.bin").unwrap(), "c.bin")
            .unwrap();
        assert!(editor.root().contains("dir/c.bin"));
        assert!(!editor.root().contains("dir/b.bin"));
    }

    #[test]
    fn test_rename_rejects_separators() {
        let mut editor = flat_editor();
        let err = editor.rename(&Address::new("a.bin").unwrap(), "weird/name.bin");
        assert!(matches!(err, Err(Error::InvalidName(_))));
        // And the session is untouched.
        assert!(editor.root().contains("a.bin"));
    }

    #[test]
    fn test_update_from_tree_merges() {
        let mut editor = flat_editor();
        editor
            .update_from_tree(
                None,
                vec![
                    ("a.bin".to_string(), b"AAA".to_vec()),
                    ("new.bin".to_string(), b"new".to_vec()),
                ],
            )
            .unwrap();
        assert_eq!(editor.root().get("a.bin").unwrap().data, b"AAA");
        assert_eq!(editor.root().get("new.bin").unwrap().data, b"new");
        // Untouched member survives the merge.
        assert_eq!(editor.root().get("dir/b.bin").unwrap().data, b"bbb");
    }

    #[test]
    fn test_member_info_flat() {
        let mut editor = flat_editor();
        let info = editor
            .member_info(
                &Address::new("dir/b.bin").unwrap(),
                &crate::hashes::NoStockHashes,
            )
            .unwrap();
        assert_eq!(info.file, "b.bin");
        assert_eq!(info.size, 3);
        assert!(!info.modified);
        assert!(!info.nested);
        assert!(!info.compressed);
    }

    struct UpperCodec;

    impl LeafCodec for UpperCodec {
        fn decode(&self, _name: &str, data: &[u8]) -> std::result::Result<LeafDocument, String> {
            String::from_utf8(data.to_vec())
                .map(|text| LeafDocument {
                    text: text.to_uppercase(),
                    kind: crate::leaf::LeafKind::KeyValue,
                })
                .map_err(|e| e.to_string())
        }

        fn encode(&self, doc: &LeafDocument) -> std::result::Result<Vec<u8>, String> {
            Ok(doc.text.to_lowercase().into_bytes())
        }
    }

    #[test]
    fn test_leaf_round_trip_through_codec() {
        let mut editor = flat_editor();
        let addr = Address::new("a.bin").unwrap();
        let doc = editor.open_leaf(&addr, &UpperCodec).unwrap();
        assert_eq!(doc.text, "AAA");
        editor.save_leaf(&addr, &doc, &UpperCodec).unwrap();
        assert_eq!(editor.member_data(&addr, true).unwrap(), b"aaa");
    }

    #[test]
    fn test_leaf_codec_errors_are_wrapped() {
        let mut editor = SarcEditor::create(Endian::Big);
        editor
            .add_or_replace(&Address::new("bad.bin").unwrap(), vec![0xFF, 0xFE, 0x00])
            .unwrap();
        let err = editor.open_leaf(&Address::new("bad.bin").unwrap(), &UpperCodec);
        assert!(matches!(err, Err(Error::LeafCodec(_))));
    }
}
