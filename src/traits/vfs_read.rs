//! Read operations for virtual filesystems.

use std::path::Path;

use crate::{FsError, Metadata, VfsFile};

/// Read operations for a virtual filesystem.
///
/// All methods use `&self` (interior mutability). Backends manage their own synchronization.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. One backend is shared by every
/// session's driver, so methods may be called concurrently.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn VfsRead`.
pub trait VfsRead: Send + Sync {
    /// Get metadata for a path.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn metadata(&self, path: &Path) -> Result<Metadata, FsError>;

    /// Open an existing file for reading.
    ///
    /// The returned handle starts at offset 0 and is released when dropped.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn open(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError>;
}
