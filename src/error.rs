//! Error types for the FTP storage driver and its backends.

use std::path::{Path, PathBuf};

/// Filesystem error type shared by the driver and every backend.
///
/// All error variants include relevant context (path, operation) where applicable.
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// The driver itself only ever constructs [`NotADirectory`](FsError::NotADirectory),
/// [`NameCollision`](FsError::NameCollision), [`AlreadyExists`](FsError::AlreadyExists),
/// [`PutFile`](FsError::PutFile) and the `Io` errors of its own stream copies.
/// Everything else is passed through from the backend untouched.
///
/// # Examples
///
/// ```rust
/// use vfs_ftp_driver::FsError;
/// use std::path::PathBuf;
///
/// let err = FsError::NotFound { path: PathBuf::from("/missing") };
/// assert!(err.to_string().contains("/missing"));
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // Path/File Errors
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    /// A directory occupies the name an upload wants to write to.
    #[error("a directory has the same name: {path}")]
    NameCollision {
        /// The path occupied by the directory.
        path: PathBuf,
    },

    /// Expected a file but found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: PathBuf,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: PathBuf,
    },

    /// Directory is not empty when it should be.
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The path to the non-empty directory.
        path: PathBuf,
    },

    // Permission/Access Errors
    /// Permission denied for operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: PathBuf,
        /// The operation that was denied.
        operation: &'static str,
    },

    // Backend/Operation Errors
    /// Probing an upload destination failed for a reason other than absence.
    #[error("put file error: {path}: {source}")]
    PutFile {
        /// The upload destination.
        path: PathBuf,
        /// The error reported by the backend while probing.
        #[source]
        source: Box<FsError>,
    },

    /// Generic backend error.
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Convert an I/O error into the most specific variant, keeping path context.
    ///
    /// `NotFound`, `AlreadyExists` and `PermissionDenied` map onto their own
    /// variants; anything else is wrapped in [`FsError::Io`].
    pub fn from_io(operation: &'static str, path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::AlreadyExists => FsError::AlreadyExists {
                path: path.to_path_buf(),
                operation,
            },
            std::io::ErrorKind::DirectoryNotEmpty => FsError::DirectoryNotEmpty {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied {
                path: path.to_path_buf(),
                operation,
            },
            _ => FsError::Io {
                operation,
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Returns `true` if this error means the entry does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }
}

impl From<std::io::Error> for FsError {
    fn from(error: std::io::Error) -> Self {
        FsError::from_io("io", Path::new(""), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_error_not_found_display() {
        let err = FsError::NotFound {
            path: PathBuf::from("/missing"),
        };
        assert_eq!(err.to_string(), "not found: /missing");
    }

    #[test]
    fn fs_error_already_exists_display() {
        let err = FsError::AlreadyExists {
            path: PathBuf::from("/exists"),
            operation: "rename",
        };
        assert_eq!(err.to_string(), "rename: already exists: /exists");
    }

    #[test]
    fn fs_error_name_collision_display() {
        let err = FsError::NameCollision {
            path: PathBuf::from("/uploads"),
        };
        assert_eq!(err.to_string(), "a directory has the same name: /uploads");
    }

    #[test]
    fn fs_error_put_file_keeps_source() {
        use std::error::Error;

        let err = FsError::PutFile {
            path: PathBuf::from("/a.txt"),
            source: Box::new(FsError::Backend("disk on fire".into())),
        };
        assert!(err.to_string().starts_with("put file error: /a.txt"));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "backend error: disk on fire");
    }

    #[test]
    fn fs_error_from_io_not_found_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let fs_err = FsError::from_io("open", Path::new("/gone"), io_err);
        match fs_err {
            FsError::NotFound { path } => assert_eq!(path, PathBuf::from("/gone")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn fs_error_from_io_permission_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let fs_err = FsError::from(io_err);
        assert!(matches!(fs_err, FsError::PermissionDenied { .. }));
    }

    #[test]
    fn fs_error_from_io_already_exists() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "test");
        let fs_err = FsError::from_io("create_dir", Path::new("/d"), io_err);
        assert!(matches!(
            fs_err,
            FsError::AlreadyExists {
                operation: "create_dir",
                ..
            }
        ));
    }

    #[test]
    fn fs_error_from_io_directory_not_empty() {
        let io_err = std::io::Error::from(std::io::ErrorKind::DirectoryNotEmpty);
        let fs_err = FsError::from_io("rename", Path::new("/full"), io_err);
        match fs_err {
            FsError::DirectoryNotEmpty { path } => assert_eq!(path, PathBuf::from("/full")),
            other => panic!("expected DirectoryNotEmpty, got {other:?}"),
        }
    }

    #[test]
    fn fs_error_from_io_other() {
        let io_err = std::io::Error::other("test");
        let fs_err = FsError::from(io_err);
        assert!(matches!(fs_err, FsError::Io { .. }));
    }

    #[test]
    fn is_not_found_only_matches_not_found() {
        assert!(
            FsError::NotFound {
                path: PathBuf::from("/x")
            }
            .is_not_found()
        );
        assert!(!FsError::Backend("x".into()).is_not_found());
    }
}
