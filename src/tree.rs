//! Tree projection: a container's recursive, display-ready naming tree.
//!
//! A projection walks every member of a root container, recurses into any
//! member whose content is itself a (possibly Yaz0-wrapped) container, and
//! splits member names on `/` so that physical names like
//! `Actor/ActorLink/Enemy.bxml` become nested tree levels. The result is a
//! pure display/query artifact: it is rebuilt from scratch after every
//! mutation and never feeds back into serialization.
//!
//! Alongside the tree, projection collects the [`ModificationSet`]: the
//! addresses of members whose content differs from the stock-hash table.
//!
//! A nested member that claims to be a container but fails to parse is
//! downgraded to an opaque leaf with a warning rather than aborting the
//! whole projection; display must stay usable with one corrupt member.

use crate::codec::yaz0;
use crate::format::{Container, Member};
use crate::hashes::{canonical_name, StockHashes};
use std::collections::{BTreeMap, BTreeSet};

/// Addresses whose content differs from the stock reference. Advisory only.
pub type ModificationSet = BTreeSet<String>;

/// A projected naming tree.
///
/// Directory-like grouping and nested containers both project as
/// [`Tree::Dir`]; plain members project as [`Tree::Leaf`]. `BTreeMap` keeps
/// iteration in stable name order for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    /// A plain member (or a corrupt nested container treated as opaque).
    Leaf,
    /// A directory level or a nested container's own projection.
    Dir(BTreeMap<String, Tree>),
}

impl Tree {
    /// Creates an empty directory node.
    pub fn empty_dir() -> Self {
        Tree::Dir(BTreeMap::new())
    }

    /// Returns whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Tree::Leaf)
    }

    /// Returns the children of a directory node, or `None` for a leaf.
    pub fn children(&self) -> Option<&BTreeMap<String, Tree>> {
        match self {
            Tree::Leaf => None,
            Tree::Dir(children) => Some(children),
        }
    }

    /// Looks up a node by `/`-separated display path.
    pub fn get(&self, path: &str) -> Option<&Tree> {
        let mut node = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            node = node.children()?.get(part)?;
        }
        Some(node)
    }

    /// Merges `other` into `self`.
    ///
    /// Two directories merge recursively. On a directory/leaf collision the
    /// directory wins: a grouping level must not be flattened away by a
    /// member that happens to share its name. Leaf-into-leaf is a no-op.
    pub fn merge(&mut self, other: Tree) {
        match (&mut *self, other) {
            (Tree::Dir(mine), Tree::Dir(theirs)) => {
                for (key, value) in theirs {
                    match mine.get_mut(&key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            mine.insert(key, value);
                        }
                    }
                }
            }
            (Tree::Leaf, other @ Tree::Dir(_)) => *self = other,
            (_, Tree::Leaf) => {}
        }
    }

    /// Wraps a subtree under the given name segments, innermost-last.
    fn nest_under(segments: &[&str], inner: Tree) -> Tree {
        segments.iter().rev().fold(inner, |acc, segment| {
            let mut map = BTreeMap::new();
            map.insert((*segment).to_string(), acc);
            Tree::Dir(map)
        })
    }
}

/// Projects a root container into its naming tree and modification set.
///
/// `hashes` supplies the stock reference; pass
/// [`NoStockHashes`](crate::hashes::NoStockHashes) to skip modification
/// marking. Projection never mutates and is safe to re-run at any time
/// against an immutable container snapshot.
pub fn project(root: &Container, hashes: &dyn StockHashes) -> (Tree, ModificationSet) {
    let mut tree = Tree::empty_dir();
    let mut modified = ModificationSet::new();
    project_into(root, "", hashes, &mut tree, &mut modified);
    (tree, modified)
}

fn project_into(
    container: &Container,
    address_prefix: &str,
    hashes: &dyn StockHashes,
    tree: &mut Tree,
    modified: &mut ModificationSet,
) {
    for member in container.members() {
        let address = if address_prefix.is_empty() {
            member.name.clone()
        } else {
            format!("{address_prefix}{}{}", crate::address::NEST_SEPARATOR, member.name)
        };

        // The stock table is keyed on decompressed content; a corrupt
        // wrapper just falls back to the stored bytes.
        let content = yaz0::decompress_if(&member.data)
            .unwrap_or(std::borrow::Cow::Borrowed(&member.data));
        if hashes.is_modified(&canonical_name(&member.name), &content) {
            modified.insert(address.clone());
        }

        let inner = project_member(member, &address, hashes, modified);
        let segments: Vec<&str> = member.name.split('/').filter(|s| !s.is_empty()).collect();
        tree.merge(Tree::nest_under(&segments, inner));
    }
}

/// Projects one member's content: a nested container becomes its own
/// directory projection, everything else a leaf. A member that carries the
/// container magic but fails to decompress or parse downgrades to a leaf.
fn project_member(
    member: &Member,
    address: &str,
    hashes: &dyn StockHashes,
    modified: &mut ModificationSet,
) -> Tree {
    if !member.is_nested_container() {
        return Tree::Leaf;
    }
    let nested = yaz0::decompress_if(&member.data)
        .and_then(|bytes| Container::parse(&bytes));
    match nested {
        Ok(container) => {
            let mut subtree = Tree::empty_dir();
            project_into(&container, address, hashes, &mut subtree, modified);
            subtree
        }
        Err(err) => {
            log::warn!("member '{address}' looks like a container but failed to parse ({err}); treating as opaque data");
            Tree::Leaf
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Endian;
    use crate::hashes::{CrcHashTable, NoStockHashes};

    fn root_with_nesting() -> Container {
        let inner = Container::new(Endian::Big)
            .with_member("Data.byml", b"inner data".to_vec())
            .unwrap()
            .serialize();
        Container::new(Endian::Big)
            .with_member("Actor/Link.bxml", b"actor".to_vec())
            .unwrap()
            .with_member("Pack/Sub.ssarc", yaz0::compress(&inner, 7))
            .unwrap()
            .with_member("Readme.txt", b"hello".to_vec())
            .unwrap()
    }

    #[test]
    fn test_slash_names_split_into_levels() {
        let (tree, _) = project(&root_with_nesting(), &NoStockHashes);
        assert!(tree.get("Actor/Link.bxml").unwrap().is_leaf());
        assert!(tree.get("Readme.txt").unwrap().is_leaf());
        assert!(!tree.get("Actor").unwrap().is_leaf());
    }

    #[test]
    fn test_nested_container_projects_as_dir() {
        let (tree, _) = project(&root_with_nesting(), &NoStockHashes);
        let sub = tree.get("Pack/Sub.ssarc").unwrap();
        assert!(!sub.is_leaf());
        assert!(sub.get("Data.byml").unwrap().is_leaf());
    }

    #[test]
    fn test_display_order_is_name_sorted() {
        let (tree, _) = project(&root_with_nesting(), &NoStockHashes);
        let names: Vec<&String> = tree.children().unwrap().keys().collect();
        assert_eq!(names, ["Actor", "Pack", "Readme.txt"]);
    }

    #[test]
    fn test_modification_set_uses_full_addresses() {
        let root = root_with_nesting();
        // Everything is "new" relative to an empty table.
        let (_, modified) = project(&root, &CrcHashTable::new());
        assert!(modified.contains("Actor/Link.bxml"));
        assert!(modified.contains("Pack/Sub.ssarc//Data.byml"));
    }

    #[test]
    fn test_stock_content_not_marked() {
        let root = root_with_nesting();
        let stock = CrcHashTable::from_stock([("Readme.txt", b"hello" as &[u8])])
            .count_new(false);
        let (_, modified) = project(&root, &stock);
        assert!(modified.is_empty());
    }

    #[test]
    fn test_corrupt_nested_member_downgrades_to_leaf() {
        // Claims the SARC magic but is truncated garbage.
        let mut corrupt = b"SARC".to_vec();
        corrupt.extend_from_slice(&[0u8; 6]);
        let root = Container::new(Endian::Big)
            .with_member("broken.sarc", corrupt)
            .unwrap()
            .with_member("fine.txt", b"ok".to_vec())
            .unwrap();
        let (tree, _) = project(&root, &NoStockHashes);
        assert!(tree.get("broken.sarc").unwrap().is_leaf());
        assert!(tree.get("fine.txt").unwrap().is_leaf());
    }

    #[test]
    fn test_merge_directory_wins_over_leaf() {
        let mut base = Tree::empty_dir();
        base.merge(Tree::nest_under(&["a"], Tree::Leaf));
        let mut dir = BTreeMap::new();
        dir.insert("child".to_string(), Tree::Leaf);
        base.merge(Tree::nest_under(&["a"], Tree::Dir(dir)));
        assert!(base.get("a/child").unwrap().is_leaf());

        // Reverse order: directory first, leaf cannot flatten it.
        let mut base = Tree::empty_dir();
        let mut dir = BTreeMap::new();
        dir.insert("child".to_string(), Tree::Leaf);
        base.merge(Tree::nest_under(&["a"], Tree::Dir(dir)));
        base.merge(Tree::nest_under(&["a"], Tree::Leaf));
        assert!(base.get("a/child").unwrap().is_leaf());
    }
}
