//! Archive address type for naming members across nesting boundaries.
//!
//! An [`Address`] names one member inside a (possibly nested) SARC tree. The
//! reserved double-slash separator `//` crosses an archive boundary, while
//! single slashes inside a segment are ordinary directory structure encoded
//! in the member name itself:
//!
//! ```text
//! Actor/Pack/Enemy.sbactorpack//Actor/ActorLink/Enemy.bxml
//! ^ member of the root            ^ member of the nested pack
//! ```
//!
//! Addresses coming from interactive callers may carry a leading `SARC:` tag
//! (marking "inside the open archive" as opposed to a standalone filesystem
//! path), escaped `\/` slashes, or a trailing slash; [`Address::new`]
//! normalizes all three away so that equal addresses compare equal.

use crate::{Error, Result};
use std::fmt;

/// The separator that crosses a nested-archive boundary.
pub const NEST_SEPARATOR: &str = "//";

/// Optional leading tag marking an address inside the open root archive.
pub const ROOT_TAG: &str = "SARC:";

/// Characters that may not appear in a member file name supplied by a caller
/// (rename targets and similar). Path separators, wildcards, and quotes.
pub const FORBIDDEN_NAME_CHARS: &[char] =
    &['\\', '/', ':', '*', '?', '"', '\'', '<', '>', '|'];

/// Validates a bare member file name against [`FORBIDDEN_NAME_CHARS`].
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if the name is empty or contains any
/// forbidden character.
///
/// # Examples
///
/// ```
/// use nestarc::address::validate_member_name;
///
/// assert!(validate_member_name("Data.byml").is_ok());
/// assert!(validate_member_name("weird/name.bin").is_err());
/// assert!(validate_member_name("why?.bin").is_err());
/// ```
pub fn validate_member_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| FORBIDDEN_NAME_CHARS.contains(&c)) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A normalized address naming one member across nested-archive boundaries.
///
/// # Examples
///
/// ```
/// use nestarc::Address;
///
/// let addr = Address::new("SARC:Pack.pack//Sub.ssarc//Data.byml").unwrap();
/// assert_eq!(addr.as_str(), "Pack.pack//Sub.ssarc//Data.byml");
/// assert_eq!(addr.segments().collect::<Vec<_>>(), vec!["Pack.pack", "Sub.ssarc", "Data.byml"]);
/// assert_eq!(addr.leaf(), "Data.byml");
/// assert_eq!(addr.parent().unwrap().as_str(), "Pack.pack//Sub.ssarc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new `Address` from a string, normalizing and validating it.
    ///
    /// Normalization strips a leading [`ROOT_TAG`], unescapes `\/` to `/`,
    /// and trims a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the address is empty after
    /// normalization or any boundary-separated segment is empty.
    pub fn new(s: &str) -> Result<Self> {
        let s = s.strip_prefix(ROOT_TAG).unwrap_or(s);
        let mut s = s.replace("\\/", "/");
        while s.ends_with('/') && !s.ends_with(NEST_SEPARATOR) {
            s.pop();
        }
        if s.is_empty() {
            return Err(Error::InvalidName(String::new()));
        }
        if s.split(NEST_SEPARATOR).any(str::is_empty) {
            return Err(Error::InvalidName(s));
        }
        Ok(Self(s))
    }

    /// Returns the address as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an iterator over the nesting segments.
    ///
    /// Each segment is one member name; all but the last name a nested
    /// container along the chain.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(NEST_SEPARATOR)
    }

    /// Returns the number of nesting segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns the final segment, the member's name in its containing
    /// archive.
    pub fn leaf(&self) -> &str {
        self.0
            .rsplit(NEST_SEPARATOR)
            .next()
            .unwrap_or(&self.0)
    }

    /// Returns the address of the containing archive, if any.
    ///
    /// Returns `None` when the member lives directly in the root.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rfind(NEST_SEPARATOR)
            .map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Appends one nesting segment, descending into a nested container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `member` is empty.
    pub fn join(&self, member: &str) -> Result<Self> {
        if member.is_empty() {
            return Err(Error::InvalidName(String::new()));
        }
        Ok(Self(format!("{}{}{}", self.0, NEST_SEPARATOR, member)))
    }

    /// Returns the directory prefix of the leaf segment, if the member name
    /// encodes directory structure (e.g. `Actor/ActorLink` for
    /// `Actor/ActorLink/Enemy.bxml`).
    pub fn leaf_dir(&self) -> Option<&str> {
        let leaf = self.leaf();
        leaf.rfind('/').map(|idx| &leaf[..idx])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_tag_stripped() {
        let addr = Address::new("SARC:Pack.pack//leaf.bin").unwrap();
        assert_eq!(addr.as_str(), "Pack.pack//leaf.bin");
    }

    #[test]
    fn test_escaped_slash_normalized() {
        let addr = Address::new("Actor\\/Link.bxml").unwrap();
        assert_eq!(addr.as_str(), "Actor/Link.bxml");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let addr = Address::new("Pack.pack//Sub.ssarc/").unwrap();
        assert_eq!(addr.as_str(), "Pack.pack//Sub.ssarc");
    }

    #[test]
    fn test_segments_and_leaf() {
        let addr = Address::new("a.pack//b.sarc//dir/leaf.bin").unwrap();
        assert_eq!(addr.depth(), 3);
        assert_eq!(addr.leaf(), "dir/leaf.bin");
        assert_eq!(addr.leaf_dir(), Some("dir"));
        assert_eq!(addr.parent().unwrap().as_str(), "a.pack//b.sarc");
    }

    #[test]
    fn test_flat_address_has_no_parent() {
        let addr = Address::new("leaf.bin").unwrap();
        assert!(addr.parent().is_none());
        assert_eq!(addr.leaf(), "leaf.bin");
    }

    #[test]
    fn test_empty_rejected() {
        assert!(Address::new("").is_err());
        assert!(Address::new("SARC:").is_err());
        assert!(Address::new("a.pack////leaf").is_err());
    }

    #[test]
    fn test_forbidden_name_chars() {
        assert!(validate_member_name("ok.byml").is_ok());
        for bad in ["a/b", "a\\b", "a:b", "a*b", "a?b", "a\"b", "a'b", "a<b", "a>b", "a|b"] {
            assert!(validate_member_name(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_join() {
        let addr = Address::new("Pack.pack").unwrap();
        let nested = addr.join("Sub.ssarc").unwrap();
        assert_eq!(nested.as_str(), "Pack.pack//Sub.ssarc");
    }
}
