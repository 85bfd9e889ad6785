//! Mutation operations on an open archive session.

use crate::Address;

/// One mutation of a nested-archive session.
///
/// Operations apply immediately through
/// [`SarcEditor::apply`](super::SarcEditor::apply); the enum form exists so
/// callers can build, inspect, or log edits before handing them over.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Remove the member at `address`.
    Delete {
        /// Full nested address of the member.
        address: Address,
    },
    /// Rename the member at `address` within its containing archive.
    Rename {
        /// Full nested address of the member.
        address: Address,
        /// Bare new file name (no separators).
        new_name: String,
    },
    /// Set the member at `address` to `data`, appending it if absent.
    ///
    /// Used for both "add new file" and "update existing file"; existence
    /// is a display question, never a correctness one.
    AddOrReplace {
        /// Full nested address of the member.
        address: Address,
        /// The member's new bytes, stored as given.
        data: Vec<u8>,
    },
    /// Merge `(relative path, bytes)` pairs into the container at
    /// `container`, or into the root when `None`.
    ///
    /// Members absent from the set are left untouched.
    UpdateFromTree {
        /// Address of the target container, `None` for the root.
        container: Option<Address>,
        /// The external file set to merge in.
        files: Vec<(String, Vec<u8>)>,
    },
}

impl Operation {
    /// Returns the operation type as a string, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Delete { .. } => "delete",
            Operation::Rename { .. } => "rename",
            Operation::AddOrReplace { .. } => "add-or-replace",
            Operation::UpdateFromTree { .. } => "update-from-tree",
        }
    }

    /// Returns the address the operation targets, if it names one member.
    pub fn target(&self) -> Option<&Address> {
        match self {
            Operation::Delete { address }
            | Operation::Rename { address, .. }
            | Operation::AddOrReplace { address, .. } => Some(address),
            Operation::UpdateFromTree { container, .. } => container.as_ref(),
        }
    }
}
