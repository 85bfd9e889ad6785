//! Nested-path resolution with a parent-container cache.
//!
//! Resolving `a.pack//b.ssarc//leaf.bin` walks from the root: look up
//! `a.pack`, undo Yaz0 if present, parse as a container, then repeat for
//! `b.ssarc`. The innermost container (the *parent* of the final segment) is
//! what every read and mutation needs, so parents are cached per address.
//!
//! The cache is only valid against one root [`Container`]: the mutation
//! engine produces a fresh root on every edit, so its owner must call
//! [`Resolver::clear`] whenever a new root is installed. The editor does
//! this as an explicit postcondition of every successful mutation.

use crate::codec::yaz0;
use crate::format::{Container, Member};
use crate::{Address, Error, Result};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default number of cached parent containers.
///
/// Interactive sessions revisit a handful of nesting chains at a time;
/// a small cache covers them while bounding memory held by decompressed
/// intermediate archives.
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

/// Walks nested-archive chains and caches the containers it parses.
pub struct Resolver {
    cache: LruCache<String, Arc<Container>>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Creates a resolver with the default cache capacity.
    pub fn new() -> Self {
        Self::with_capacity(
            NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        )
    }

    /// Creates a resolver with an explicit cache capacity.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Drops every cached container.
    ///
    /// Must be called whenever a new root is installed; cached parents
    /// belong to the superseded root.
    pub fn clear(&mut self) {
        if self.cache.len() > 0 {
            log::debug!("invalidating {} cached parent containers", self.cache.len());
        }
        self.cache.clear();
    }

    /// Returns the number of cached containers.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Resolves the container holding the final segment of `address`.
    ///
    /// For a flat address this is the root itself. Each hop looks up the
    /// named member, undoes Yaz0 if present, and parses the bytes as a
    /// container for the next hop.
    ///
    /// # Errors
    ///
    /// - [`Error::MemberNotFound`] naming the exact hop that was absent
    /// - [`Error::CorruptData`] if a hop's Yaz0 framing is invalid
    /// - [`Error::InvalidArchive`] if a hop's bytes are not a container
    pub fn resolve_parent(
        &mut self,
        root: &Arc<Container>,
        address: &Address,
    ) -> Result<Arc<Container>> {
        let segments: Vec<&str> = address.segments().collect();
        let mut current = Arc::clone(root);
        let mut prefix = String::new();

        for hop in &segments[..segments.len() - 1] {
            if prefix.is_empty() {
                prefix.push_str(hop);
            } else {
                prefix.push_str(crate::address::NEST_SEPARATOR);
                prefix.push_str(hop);
            }
            if let Some(cached) = self.cache.get(&prefix) {
                current = Arc::clone(cached);
                continue;
            }
            let member = current.get(hop).ok_or_else(|| Error::MemberNotFound {
                address: address.as_str().to_string(),
                segment: (*hop).to_string(),
            })?;
            let bytes = yaz0::decompress_if(&member.data)?;
            let parsed = Arc::new(Container::parse(&bytes)?);
            self.cache.put(prefix.clone(), Arc::clone(&parsed));
            current = parsed;
        }
        Ok(current)
    }

    /// Resolves the member named by the full address.
    ///
    /// # Errors
    ///
    /// As [`resolve_parent`](Self::resolve_parent); a missing final segment
    /// reports the full address as context.
    pub fn resolve_member(
        &mut self,
        root: &Arc<Container>,
        address: &Address,
    ) -> Result<Member> {
        let parent = self.resolve_parent(root, address)?;
        parent
            .get(address.leaf())
            .cloned()
            .ok_or_else(|| Error::MemberNotFound {
                address: address.as_str().to_string(),
                segment: address.leaf().to_string(),
            })
    }

    /// Returns a member's bytes, optionally undoing Yaz0.
    pub fn member_data(
        &mut self,
        root: &Arc<Container>,
        address: &Address,
        decompress: bool,
    ) -> Result<Vec<u8>> {
        let member = self.resolve_member(root, address)?;
        if decompress {
            Ok(yaz0::decompress_if(&member.data)?.into_owned())
        } else {
            Ok(member.data)
        }
    }
}
