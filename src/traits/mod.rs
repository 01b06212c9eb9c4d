//! # Backend Traits
//!
//! The capability a storage backend provides to the driver.
//!
//! ## Trait Layout
//!
//! ```text
//! VfsRead + VfsWrite + VfsDir = Vfs
//!
//! VfsRead::open / VfsWrite::create / VfsWrite::open_append ──▶ Box<dyn VfsFile>
//! ```
//!
//! | Trait | Primitives |
//! |-------|------------|
//! | [`VfsRead`] | `metadata` (stat), `open` |
//! | [`VfsWrite`] | `create`, `open_append`, `remove_file`, `rename` |
//! | [`VfsDir`] | `read_dir`, `create_dir`, `remove_dir_all` |
//! | [`VfsFile`] | an open handle: `Read + Write + Seek` plus `metadata` |
//!
//! ## Thread Safety
//!
//! All backend traits require `Send + Sync`. Methods take `&self`; a single
//! backend behind an `Arc` serves every session at once, so backends use
//! interior mutability for their state.
//!
//! ## Object Safety
//!
//! All traits are object-safe:
//!
//! ```rust
//! use vfs_ftp_driver::{Vfs, VfsRead};
//!
//! fn probe(fs: &dyn Vfs) -> bool {
//!     fs.metadata(std::path::Path::new("/")).is_ok()
//! }
//! ```

mod vfs_dir;
mod vfs_file;
mod vfs_read;
mod vfs_write;

pub use vfs_dir::{ReadDirIter, VfsDir};
pub use vfs_file::VfsFile;
pub use vfs_read::VfsRead;
pub use vfs_write::VfsWrite;

/// A complete backend: everything the driver needs.
///
/// # Blanket Implementation
///
/// Automatically implemented for any type that implements all three component
/// traits. Never implement `Vfs` directly.
///
/// # Example
///
/// ```rust
/// use vfs_ftp_driver::{FsError, Vfs};
/// use std::io::Read;
/// use std::path::Path;
///
/// fn slurp<B: Vfs + ?Sized>(fs: &B, path: &Path) -> Result<Vec<u8>, FsError> {
///     let mut file = fs.open(path)?;
///     let mut data = Vec::new();
///     file.read_to_end(&mut data)
///         .map_err(|e| FsError::from_io("read", path, e))?;
///     Ok(data)
/// }
/// ```
pub trait Vfs: VfsRead + VfsWrite + VfsDir {}

// Blanket implementation - any type implementing all three gets Vfs for free
impl<T: VfsRead + VfsWrite + VfsDir> Vfs for T {}
