//! Directory operations for virtual filesystems.

use std::path::Path;

use crate::{DirEntry, FsError, Permissions};

/// Directory operations for a virtual filesystem.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn VfsDir`.
pub trait VfsDir: Send + Sync {
    /// List the immediate children of a directory.
    ///
    /// The outer `Result` indicates whether the directory could be opened; each
    /// item's `Result` indicates whether that specific entry could be read.
    /// Order is whatever the backend produces.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError>;

    /// Create a directory (parent must exist).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent directory does not exist
    /// - [`FsError::AlreadyExists`] if the path already exists
    fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError>;

    /// Remove a directory and all its contents recursively.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    fn remove_dir_all(&self, path: &Path) -> Result<(), FsError>;
}

/// Iterator over directory entries.
///
/// Wraps a boxed iterator for flexibility across different backends.
///
/// - Outer `Result` (from [`VfsDir::read_dir`]) = "can I open this directory?"
/// - Inner `Result` (per item) = "can I read this entry?"
pub struct ReadDirIter(Box<dyn Iterator<Item = Result<DirEntry, FsError>> + Send + 'static>);

impl ReadDirIter {
    /// Create from any compatible iterator.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<DirEntry, FsError>> + Send + 'static,
    {
        Self(Box::new(iter))
    }

    /// Create from a pre-collected vector.
    pub fn from_vec(entries: Vec<Result<DirEntry, FsError>>) -> Self {
        Self(Box::new(entries.into_iter()))
    }
}

impl Iterator for ReadDirIter {
    type Item = Result<DirEntry, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileType;
    use std::path::PathBuf;

    fn entry(name: &str, file_type: FileType) -> DirEntry {
        DirEntry {
            name: name.into(),
            path: PathBuf::from("/").join(name),
            file_type,
            size: 0,
        }
    }

    #[test]
    fn read_dir_iter_from_vec_keeps_order() {
        let iter = ReadDirIter::from_vec(vec![
            Ok(entry("b", FileType::File)),
            Ok(entry("a", FileType::Directory)),
        ]);
        let names: Vec<_> = iter.map(|e| e.unwrap().name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn read_dir_iter_yields_entry_errors_in_place() {
        let entries = vec![
            Ok(entry("a", FileType::File)),
            Err(FsError::PermissionDenied {
                path: PathBuf::from("/b"),
                operation: "read_dir",
            }),
        ];
        let mut iter = ReadDirIter::from_vec(entries);
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(
            iter.next().unwrap(),
            Err(FsError::PermissionDenied { .. })
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn read_dir_iter_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ReadDirIter>();
    }
}
