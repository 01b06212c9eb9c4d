//! Local-disk backend rooted at a host directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use crate::{
    DirEntry, FileType, FsError, Metadata, Permissions, ReadDirIter, VfsDir, VfsFile, VfsRead,
    VfsWrite,
};

/// A backend over `std::fs`, confined to one host directory.
///
/// Virtual paths are joined beneath `root` after lexical normalization, so
/// `/pub/a.txt` and `pub/a.txt` both map to `<root>/pub/a.txt` and `..` can
/// never climb above `root`. Symlinks are followed, in listings as well as
/// in lookups; a dangling link is listed as a symlink. Removing `/` empties
/// `root` but leaves the directory in place.
#[derive(Debug, Clone)]
pub struct NativeFs {
    root: PathBuf,
}

impl NativeFs {
    /// Serve the contents of `root`. The directory must already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The host directory that `/` maps to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &Path) -> PathBuf {
        let mut out = self.root.clone();
        let mut depth = 0usize;
        for component in path.components() {
            match component {
                Component::Normal(name) => {
                    out.push(name);
                    depth += 1;
                }
                Component::ParentDir if depth > 0 => {
                    out.pop();
                    depth -= 1;
                }
                _ => {}
            }
        }
        out
    }

    fn host_metadata(&self, operation: &'static str, path: &Path) -> Result<fs::Metadata, FsError> {
        fs::metadata(self.host_path(path)).map_err(|e| FsError::from_io(operation, path, e))
    }
}

fn convert(meta: &fs::Metadata) -> Metadata {
    let file_type = if meta.is_dir() {
        FileType::Directory
    } else if meta.file_type().is_symlink() {
        FileType::Symlink
    } else {
        FileType::File
    };

    #[cfg(unix)]
    let permissions = {
        use std::os::unix::fs::PermissionsExt;
        Permissions::from_mode(meta.permissions().mode())
    };
    #[cfg(not(unix))]
    let permissions = if meta.permissions().readonly() {
        Permissions::from_mode(0o444)
    } else {
        Permissions::default_file()
    };

    Metadata {
        file_type,
        size: meta.len(),
        permissions,
        modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
    }
}

/// Open handle onto a host file.
struct NativeFile {
    file: File,
    path: PathBuf,
}

impl Read for NativeFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for NativeFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for NativeFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl VfsFile for NativeFile {
    fn metadata(&self) -> Result<Metadata, FsError> {
        self.file
            .metadata()
            .map(|meta| convert(&meta))
            .map_err(|e| FsError::from_io("metadata", &self.path, e))
    }
}

impl VfsRead for NativeFs {
    fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        self.host_metadata("metadata", path).map(|meta| convert(&meta))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
        let file = File::open(self.host_path(path)).map_err(|e| FsError::from_io("open", path, e))?;
        let is_dir = file
            .metadata()
            .map_err(|e| FsError::from_io("open", path, e))?
            .is_dir();
        if is_dir {
            return Err(FsError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(Box::new(NativeFile {
            file,
            path: path.to_path_buf(),
        }))
    }
}

impl VfsWrite for NativeFs {
    fn create(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
        let host = self.host_path(path);
        if host.is_dir() {
            return Err(FsError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        let file = File::create(&host).map_err(|e| FsError::from_io("create", path, e))?;
        Ok(Box::new(NativeFile {
            file,
            path: path.to_path_buf(),
        }))
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
        let host = self.host_path(path);
        if host.is_dir() {
            return Err(FsError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&host)
            .map_err(|e| FsError::from_io("open_append", path, e))?;
        Ok(Box::new(NativeFile {
            file,
            path: path.to_path_buf(),
        }))
    }

    fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        if self.host_metadata("remove_file", path)?.is_dir() {
            return Err(FsError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        fs::remove_file(self.host_path(path)).map_err(|e| FsError::from_io("remove_file", path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(self.host_path(from), self.host_path(to)).map_err(|e| {
            let blamed = if e.kind() == io::ErrorKind::DirectoryNotEmpty {
                to
            } else {
                from
            };
            FsError::from_io("rename", blamed, e)
        })
    }
}

impl VfsDir for NativeFs {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError> {
        if !self.host_metadata("read_dir", path)?.is_dir() {
            return Err(FsError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        let entries =
            fs::read_dir(self.host_path(path)).map_err(|e| FsError::from_io("read_dir", path, e))?;

        let base = path.to_path_buf();
        Ok(ReadDirIter::new(entries.map(move |entry| {
            let entry = entry.map_err(|e| FsError::from_io("read_dir", &base, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = base.join(&name);
            let meta = fs::metadata(entry.path())
                .or_else(|_| entry.metadata())
                .map_err(|e| FsError::from_io("read_dir", &path, e))?;
            let meta = convert(&meta);
            Ok(DirEntry {
                name,
                path,
                file_type: meta.file_type,
                size: meta.size,
            })
        })))
    }

    fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        let host = self.host_path(path);

        #[cfg(unix)]
        let result = {
            use std::os::unix::fs::DirBuilderExt;
            fs::DirBuilder::new().mode(perm.mode()).create(&host)
        };
        #[cfg(not(unix))]
        let result = {
            let _ = perm;
            fs::create_dir(&host)
        };

        result.map_err(|e| FsError::from_io("create_dir", path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
        if !self.host_metadata("remove_dir_all", path)?.is_dir() {
            return Err(FsError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        let host = self.host_path(path);
        if host != self.root {
            return fs::remove_dir_all(&host)
                .map_err(|e| FsError::from_io("remove_dir_all", path, e));
        }

        // The served directory itself stays; only its contents go.
        let entries =
            fs::read_dir(&host).map_err(|e| FsError::from_io("remove_dir_all", path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io("remove_dir_all", path, e))?;
            let child = path.join(entry.file_name());
            let is_dir = entry
                .file_type()
                .map_err(|e| FsError::from_io("remove_dir_all", &child, e))?
                .is_dir();
            let removed = if is_dir {
                fs::remove_dir_all(entry.path())
            } else {
                fs::remove_file(entry.path())
            };
            removed.map_err(|e| FsError::from_io("remove_dir_all", &child, e))?;
        }
        Ok(())
    }
}
