//! # infinity-fs
//!
//! `infinity-fs` is a pure Rust, read-only virtual filesystem over the resource archives of
//! Infinity Engine games (Baldur's Gate, Icewind Dale, Planescape: Torment).
//!
//! ## Features
//! - Parse `chitin.key` (`KEY V1`) and its `BIFF V1` archives
//! - Read `BIFC V1.0` and `BIF V1.0` compressed archives
//! - One synthetic directory per resource type (`DLG`, `CRE`, `TIS`, ...)
//! - Type, archive and name filters applied while building the catalog
//! - Lazy archive parsing with a bounded cache of idle archive handles
//!
//! ## Usage
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! infinity-fs = "0.1"
//! ```
//!
//! ### Example: Listing and Extracting Resources
//! ```rust,no_run
//! use infinity_fs::{FsOptions, InfinityFs, ResourceType, Vfs};
//! use std::fs::File;
//!
//! let options = FsOptions::new().with_type_filter([ResourceType::DLG, ResourceType::CRE]);
//! let fs = InfinityFs::new("path/to/game/chitin.key", options).unwrap();
//!
//! // List every cataloged resource
//! for record in fs.resources() {
//!     println!("{} in {}", record.full_name(), record.archive_path());
//! }
//!
//! // Extract one
//! let mut resource = fs.open("abazigal.cre").unwrap().into_file().unwrap();
//! let mut output = File::create("ABAZIGAL.CRE").unwrap();
//! std::io::copy(&mut resource, &mut output).unwrap();
//! ```

mod archive_view;
pub mod bif;
pub mod catalog;
pub mod error;
mod ext;
pub mod filter;
mod handle_pool;
pub mod infinity_dir;
pub mod infinity_file;
pub mod infinity_fs;
pub mod key_file;
pub mod locator;
pub mod metadata;
pub mod options;
pub mod resource_type;
#[cfg(test)]
mod test_support;
pub mod vfs;

pub use catalog::{CatalogFilters, DirectoryRecord, Resolution, ResourceRecord, ResourceSpan};
pub use error::{FsError, Result};
pub use filter::Filter;
pub use handle_pool::PoolStats;
pub use infinity_dir::InfinityDir;
pub use infinity_file::InfinityFile;
pub use infinity_fs::{ArchiveState, FsEntry, InfinityFs};
pub use locator::{EntryLocator, LocatorSlot, ResourceLocator};
pub use metadata::{EntryKind, Metadata};
pub use options::{FsOptions, DEFAULT_CACHE_CAPACITY};
pub use resource_type::ResourceType;
pub use vfs::{OpenFlags, Vfs};
