//! Write operations for virtual filesystems.

use std::path::Path;

use crate::{FsError, VfsFile};

/// Write operations for a virtual filesystem.
///
/// All methods use `&self` (interior mutability). Backends manage their own synchronization.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn VfsWrite`.
pub trait VfsWrite: Send + Sync {
    /// Create a file for writing, truncating it if it already exists.
    ///
    /// Parent directories must exist.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent directory does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn create(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError>;

    /// Open an existing file so that every write lands at its end.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the file does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn open_append(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError>;

    /// Remove a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the file does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn remove_file(&self, path: &Path) -> Result<(), FsError>;

    /// Rename/move a file or directory.
    ///
    /// Whether an existing destination is replaced is backend-specific; the
    /// driver never relies on it.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the source path does not exist
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;
}
