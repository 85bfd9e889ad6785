//! # nestarc
//!
//! A pure-Rust library for reading, navigating, and editing SARC archives,
//! including archives nested inside other archives to arbitrary depth.
//!
//! SARC containers are flat: every member is a named byte blob, and a name
//! may contain `/` to suggest directory structure without the container
//! storing directories. A member's bytes may themselves be another SARC,
//! optionally Yaz0-compressed, so a single root file can hold a whole tree
//! of archives. This crate projects that tree, resolves members at any
//! depth, and rebuilds the full ancestor chain after every edit so the
//! serialized root always reflects the change.
//!
//! ## Quick Start
//!
//! ### Inspecting an Archive
//!
//! ```rust,no_run
//! use nestarc::{NoStockHashes, Result, SarcEditor};
//!
//! fn main() -> Result<()> {
//!     let editor = SarcEditor::open_path("Pack.pack")?;
//!
//!     let (tree, modified) = editor.project(&NoStockHashes);
//!     for name in tree.children().map(|d| d.keys()).into_iter().flatten() {
//!         println!("{name}");
//!     }
//!     println!("{} members differ from stock", modified.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Editing a Deeply Nested Member
//!
//! ```rust,no_run
//! use nestarc::{Address, Result, SarcEditor};
//!
//! fn main() -> Result<()> {
//!     let mut editor = SarcEditor::open_path("Pack.pack")?;
//!
//!     // "//" crosses an archive boundary; plain "/" stays inside one.
//!     let addr = Address::new("Nested.ssarc//Actor/Data.byml")?;
//!     editor.add_or_replace(&addr, std::fs::read("Data.byml")?)?;
//!
//!     // The caller persists the result; compress first if the
//!     // destination name calls for it.
//!     std::fs::write("Pack.pack", editor.save())?;
//!     Ok(())
//! }
//! ```
//!
//! ### Building an Archive from Scratch
//!
//! ```rust
//! use nestarc::{Address, Endian, Result, SarcEditor};
//!
//! fn main() -> Result<()> {
//!     let mut editor = SarcEditor::create(Endian::Big);
//!     editor.add_or_replace(&Address::new("Model/Body.bfres")?, vec![0u8; 16])?;
//!     let bytes = editor.save();
//!     assert!(bytes.starts_with(b"SARC"));
//!     Ok(())
//! }
//! ```
//!
//! ## Addresses
//!
//! [`Address`] is the validated form of a nested path. Segments are joined
//! with `//`; each segment names a member of the container reached by the
//! previous segment, and intermediate segments must hold SARC data (raw or
//! Yaz0-wrapped). A leading `SARC:` tag and `\/` escapes are accepted on
//! input and normalized away.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. [`Error::MemberNotFound`] reports both
//! the full address and the exact segment that failed to resolve, so a miss
//! three archives deep names the hop that broke.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.75** or later.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod address;
pub mod codec;
pub mod edit;
pub mod error;
pub mod format;
pub mod hashes;
pub mod leaf;
pub mod resolve;
pub mod tree;

pub use address::Address;
pub use error::{Error, Result};

// Re-export the archive model at crate root for convenience
pub use format::{AlignMode, Container, Endian, Member};

// Re-export the editing API at crate root for convenience
pub use edit::{should_compress_name, MemberInfo, Operation, SarcEditor};

// Re-export resolution and projection
pub use resolve::Resolver;
pub use tree::{ModificationSet, Tree};

// Re-export stock-hash comparison
pub use hashes::{CrcHashTable, NoStockHashes, StockHashes};

// Re-export the leaf-codec seam
pub use leaf::{LeafCodec, LeafDocument, LeafKind};
