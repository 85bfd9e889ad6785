//! The in-memory container model: an ordered table of named members.
//!
//! A [`Container`] is immutable once built. Every mutation helper returns a
//! new `Container` (copy-on-write), which is what lets the mutation engine
//! rebuild ancestor archives atomically: the previous root stays intact until
//! the whole chain has been rebuilt.

use crate::codec::yaz0;
use crate::format::{
    hash_name, is_compressed_container, is_container, parser, writer, Endian, HASH_KEY,
};
use crate::{Error, Result};
use std::collections::HashMap;

/// Layout rules applied when serializing a container's data section.
///
/// Older packers padded every member generously; newer ones only align
/// members whose content demands it. Both layouts remain in circulation, so
/// the mode is fixed per container at creation and honored byte-for-byte on
/// every rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignMode {
    /// Pad every member to at least 0x20 bytes.
    Legacy,
    /// Pad members to the writer's minimum alignment only; nested archives
    /// still receive their required 0x2000 alignment.
    #[default]
    New,
}

/// One named byte blob inside a [`Container`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// POSIX-style relative path, unique within the container.
    pub name: String,
    /// Owned byte buffer. Treated as opaque unless it carries the SARC or
    /// Yaz0 magic.
    pub data: Vec<u8>,
}

impl Member {
    /// Creates a member from a name and owned data.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Returns whether the member's bytes are Yaz0-compressed.
    pub fn is_compressed(&self) -> bool {
        yaz0::is_compressed(&self.data)
    }

    /// Returns whether the member holds a nested container, compressed or
    /// not.
    pub fn is_nested_container(&self) -> bool {
        is_container(&self.data) || is_compressed_container(&self.data)
    }
}

/// An immutable parsed representation of a SARC archive's member table.
///
/// # Examples
///
/// ```
/// use nestarc::{Container, Endian};
///
/// let root = Container::new(Endian::Big)
///     .with_member("Data.byml", vec![1, 2, 3])
///     .unwrap();
/// let bytes = root.serialize();
/// let reparsed = Container::parse(&bytes).unwrap();
/// assert_eq!(reparsed.get("Data.byml").unwrap().data, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    endian: Endian,
    align_mode: AlignMode,
    min_alignment: usize,
    members: Vec<Member>,
}

impl Container {
    /// Default minimum data alignment.
    pub const DEFAULT_MIN_ALIGNMENT: usize = 4;

    /// Largest member count the format's 16-bit node-count field can
    /// express.
    pub const MAX_MEMBERS: usize = u16::MAX as usize;

    /// Creates an empty container with the given byte order and default
    /// layout ([`AlignMode::New`], minimum alignment 4).
    pub fn new(endian: Endian) -> Self {
        Self::with_layout(endian, AlignMode::default(), Self::DEFAULT_MIN_ALIGNMENT)
    }

    /// Creates an empty container with an explicit layout.
    pub fn with_layout(endian: Endian, align_mode: AlignMode, min_alignment: usize) -> Self {
        Self {
            endian,
            align_mode,
            min_alignment: min_alignment.max(1),
            members: Vec::new(),
        }
    }

    /// Builds a container from parts, validating the unique-name invariant.
    ///
    /// Names must be unique, and so must their SFAT hashes: the format's
    /// lookup table is sorted by hash, so two members whose distinct names
    /// collide under the hash key are unaddressable by consumers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchive`] if two members share a name or a
    /// name hash, or if the member count exceeds [`Self::MAX_MEMBERS`].
    pub fn from_members(
        endian: Endian,
        align_mode: AlignMode,
        min_alignment: usize,
        members: Vec<Member>,
    ) -> Result<Self> {
        if members.len() > Self::MAX_MEMBERS {
            return Err(Error::InvalidArchive(format!(
                "{} members exceed the node-count limit of {}",
                members.len(),
                Self::MAX_MEMBERS
            )));
        }
        let mut hashes: HashMap<u32, &str> = HashMap::with_capacity(members.len());
        for member in &members {
            if let Some(prior) = hashes.insert(hash_name(&member.name, HASH_KEY), &member.name) {
                return Err(if prior == member.name {
                    Error::InvalidArchive(format!("duplicate member name '{}'", member.name))
                } else {
                    Error::InvalidArchive(format!(
                        "name hash collision between '{prior}' and '{}'",
                        member.name
                    ))
                });
            }
        }
        Ok(Self {
            endian,
            align_mode,
            min_alignment: min_alignment.max(1),
            members,
        })
    }

    /// Parses SARC bytes into a container with the default layout tags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchive`] for bad magic, truncated or
    /// out-of-bounds headers, unnamed nodes, duplicate or hash-colliding
    /// names, and
    /// [`Error::UnsupportedEndianness`] when the BOM is damaged and neither
    /// byte order yields a consistent header.
    pub fn parse(data: &[u8]) -> Result<Self> {
        parser::parse(data, AlignMode::default(), Self::DEFAULT_MIN_ALIGNMENT)
    }

    /// Parses SARC bytes, tagging the result with an explicit serialization
    /// layout for later rebuilds.
    pub fn parse_with_layout(
        data: &[u8],
        align_mode: AlignMode,
        min_alignment: usize,
    ) -> Result<Self> {
        parser::parse(data, align_mode, min_alignment.max(1))
    }

    /// Serializes the container back to SARC bytes.
    ///
    /// Nodes, names, and data blocks are emitted in name-hash order, the
    /// order required by the format, with padding per the container's
    /// alignment mode. Serializing an unmodified parse is byte-exact.
    ///
    /// # Panics
    ///
    /// Panics if the output would exceed the 4 GiB the format's 32-bit
    /// size fields can express.
    pub fn serialize(&self) -> Vec<u8> {
        writer::serialize(self)
    }

    /// Returns the container's byte order.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Returns the serialization alignment mode.
    pub fn align_mode(&self) -> AlignMode {
        self.align_mode
    }

    /// Returns the minimum data alignment.
    pub fn min_alignment(&self) -> usize {
        self.min_alignment
    }

    /// Returns the members in insertion order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the container has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Looks up a member by exact name.
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Returns whether a member with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns a copy with `name` set to `data`, replacing an existing
    /// member in place or appending a new one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `name` is empty, or
    /// [`Error::InvalidArchive`] if appending would exceed
    /// [`Self::MAX_MEMBERS`] or collide with another name's hash.
    pub fn with_member(&self, name: &str, data: impl Into<Vec<u8>>) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidName(String::new()));
        }
        let mut next = self.clone();
        let data = data.into();
        match next.members.iter_mut().find(|m| m.name == name) {
            Some(member) => member.data = data,
            None => {
                if next.members.len() >= Self::MAX_MEMBERS {
                    return Err(Error::InvalidArchive(format!(
                        "node-count limit of {} reached",
                        Self::MAX_MEMBERS
                    )));
                }
                let hash = hash_name(name, HASH_KEY);
                if let Some(other) = next
                    .members
                    .iter()
                    .find(|m| hash_name(&m.name, HASH_KEY) == hash)
                {
                    return Err(Error::InvalidArchive(format!(
                        "name hash collision between '{}' and '{name}'",
                        other.name
                    )));
                }
                next.members.push(Member::new(name, data));
            }
        }
        Ok(next)
    }

    /// Returns a copy without the named member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if no member has that name.
    pub fn without_member(&self, name: &str) -> Result<Self> {
        let idx = self
            .members
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| Error::MemberNotFound {
                address: name.to_string(),
                segment: name.to_string(),
            })?;
        let mut next = self.clone();
        next.members.remove(idx);
        Ok(next)
    }

    /// Returns a copy with the named member re-inserted under a new full
    /// name, keeping its position and data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if `old` is absent, or
    /// [`Error::InvalidArchive`] if `new` already names another member or
    /// collides with one under the name hash.
    pub fn with_renamed(&self, old: &str, new: &str) -> Result<Self> {
        if old != new && self.contains(new) {
            return Err(Error::InvalidArchive(format!(
                "member '{new}' already exists"
            )));
        }
        let new_hash = hash_name(new, HASH_KEY);
        if let Some(other) = self
            .members
            .iter()
            .find(|m| m.name != old && hash_name(&m.name, HASH_KEY) == new_hash)
        {
            return Err(Error::InvalidArchive(format!(
                "name hash collision between '{}' and '{new}'",
                other.name
            )));
        }
        let idx = self
            .members
            .iter()
            .position(|m| m.name == old)
            .ok_or_else(|| Error::MemberNotFound {
                address: old.to_string(),
                segment: old.to_string(),
            })?;
        let mut next = self.clone();
        next.members[idx].name = new.to_string();
        Ok(next)
    }
}
