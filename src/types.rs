//! Core types shared by the driver and its backends.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Backend-native metadata for a filesystem entry.
///
/// This is what a [`Vfs`](crate::Vfs) backend reports. The driver condenses it
/// into a [`FileInfo`] before handing it to the protocol layer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Type of the entry (file, directory, symlink).
    pub file_type: FileType,
    /// Size in bytes.
    pub size: u64,
    /// Permissions.
    pub permissions: Permissions,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
}

impl Metadata {
    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            file_type: FileType::File,
            size: 0,
            permissions: Permissions::default_file(),
            modified: SystemTime::UNIX_EPOCH,
        }
    }
}

/// A directory entry returned from `read_dir`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Name of the entry (filename only, not full path).
    pub name: String,
    /// Full path to the entry.
    pub path: PathBuf,
    /// Type of the entry.
    pub file_type: FileType,
    /// Size in bytes.
    pub size: u64,
}

/// Snapshot of one entry as the protocol layer sees it.
///
/// Built fresh on every `stat` and for every listed entry; never cached.
/// Two records with equal fields are interchangeable.
///
/// ```rust
/// use vfs_ftp_driver::{FileInfo, Metadata};
///
/// let meta = Metadata { size: 5, ..Metadata::default() };
/// let info = FileInfo::from_metadata("b.txt", &meta);
/// assert_eq!(info, FileInfo { name: "b.txt".into(), size: 5, is_dir: false });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileInfo {
    /// Final path component.
    pub name: String,
    /// Size in bytes. Only meaningful for files.
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl FileInfo {
    /// Build a record from a name and backend metadata.
    pub fn from_metadata(name: impl Into<String>, meta: &Metadata) -> Self {
        Self {
            name: name.into(),
            size: meta.size,
            is_dir: meta.is_dir(),
        }
    }

    /// Build a record for `path`, naming it after the final component.
    ///
    /// Paths without a final component (such as `/`) keep their full text.
    pub fn for_path(path: &Path, meta: &Metadata) -> Self {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => path.to_string_lossy().into_owned(),
        };
        Self::from_metadata(name, meta)
    }
}

impl From<DirEntry> for FileInfo {
    fn from(entry: DirEntry) -> Self {
        Self {
            name: entry.name,
            size: entry.size,
            is_dir: entry.file_type == FileType::Directory,
        }
    }
}

/// Unix-style permissions stored as a mode bitmask.
///
/// Uses the standard Unix permission bits (rwxrwxrwx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions(u32);

impl Permissions {
    /// Create permissions from a Unix mode (e.g., 0o755).
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Get the raw mode value.
    #[inline]
    pub const fn mode(&self) -> u32 {
        self.0
    }

    /// Default permissions for a new file (0o644 = rw-r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o644)
    }

    /// Default permissions for a new directory (0o755 = rwxr-xr-x).
    #[inline]
    pub const fn default_dir() -> Self {
        Self(0o755)
    }

    /// Everything allowed (0o777). Used for directories made by the driver;
    /// the backend's own umask or policy narrows it.
    #[inline]
    pub const fn permissive() -> Self {
        Self(0o777)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_is_dir_only_for_directories() {
        let dir = Metadata {
            file_type: FileType::Directory,
            ..Default::default()
        };
        assert!(dir.is_dir());
        assert!(!Metadata::default().is_dir());
    }

    #[test]
    fn file_info_for_path_uses_final_component() {
        let meta = Metadata {
            size: 5,
            ..Default::default()
        };
        let info = FileInfo::for_path(Path::new("/a/b.txt"), &meta);
        assert_eq!(info.name, "b.txt");
        assert_eq!(info.size, 5);
        assert!(!info.is_dir);
    }

    #[test]
    fn file_info_for_root_keeps_path_text() {
        let meta = Metadata {
            file_type: FileType::Directory,
            ..Default::default()
        };
        let info = FileInfo::for_path(Path::new("/"), &meta);
        assert_eq!(info.name, "/");
        assert!(info.is_dir);
    }

    #[test]
    fn file_info_from_dir_entry() {
        let entry = DirEntry {
            name: "sub".into(),
            path: PathBuf::from("/sub"),
            file_type: FileType::Directory,
            size: 0,
        };
        let info = FileInfo::from(entry);
        assert_eq!(
            info,
            FileInfo {
                name: "sub".into(),
                size: 0,
                is_dir: true
            }
        );
    }

    #[test]
    fn permissions_from_mode_masks_extra_bits() {
        let p = Permissions::from_mode(0o100755);
        assert_eq!(p.mode(), 0o755);
    }

    #[test]
    fn permissions_defaults() {
        assert_eq!(Permissions::default_file().mode(), 0o644);
        assert_eq!(Permissions::default_dir().mode(), 0o755);
        assert_eq!(Permissions::permissive().mode(), 0o777);
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<Metadata>();
        assert_send_sync::<DirEntry>();
        assert_send_sync::<FileInfo>();
        assert_send_sync::<Permissions>();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn file_info_serializes_as_plain_record() {
        let info = FileInfo {
            name: "b.txt".into(),
            size: 5,
            is_dir: false,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "b.txt", "size": 5, "is_dir": false })
        );
    }
}
