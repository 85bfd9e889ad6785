//! Archive editing: mutation of members at any nesting depth.
//!
//! This module provides the ability to modify an open nested-archive
//! session by:
//! - Deleting members
//! - Renaming members
//! - Adding new members or replacing existing ones
//! - Merging an external file set (or a directory) into a container
//!
//! Every mutation at depth N rebuilds container N, re-serializes it,
//! recompresses it when its slot in container N-1 held Yaz0 data, and
//! re-embeds the bytes, repeating up to the root. The session's root is only
//! replaced once the whole chain has rebuilt, so a failed operation leaves
//! the open archive exactly as it was.

mod editor;
mod operation;

pub use editor::{MemberInfo, SarcEditor};
pub use operation::Operation;

/// Returns whether a member name marks its content as stored compressed.
///
/// The ecosystem convention is that an `.sXXX` extension means
/// "Yaz0-compressed XXX" (`.ssarc`, `.sbactorpack`), with `.sarc` itself as
/// the one exception. This is only a naming heuristic; the rebuild chain
/// prefers the evidence of the superseded member's actual bytes and falls
/// back here for members with no recorded history.
pub fn should_compress_name(name: &str) -> bool {
    match name.rfind('.') {
        Some(idx) => {
            let ext = &name[idx..];
            ext.starts_with(".s") && ext != ".sarc"
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_compress_name() {
        assert!(should_compress_name("Pack/Sub.ssarc"));
        assert!(should_compress_name("Enemy.sbactorpack"));
        assert!(!should_compress_name("Pack/Sub.sarc"));
        assert!(!should_compress_name("Data.byml"));
        assert!(!should_compress_name("no_extension"));
    }
}
