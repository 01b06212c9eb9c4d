//! In-memory backend.

use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use crate::{
    DirEntry, FileType, FsError, Metadata, Permissions, ReadDirIter, VfsDir, VfsFile, VfsRead,
    VfsWrite,
};

/// Contents of one file, shared by the tree and every open handle.
#[derive(Debug)]
struct FileData {
    bytes: Vec<u8>,
    modified: SystemTime,
}

type SharedFile = Arc<RwLock<FileData>>;

#[derive(Debug, Clone)]
enum Node {
    Dir {
        perm: Permissions,
        modified: SystemTime,
    },
    File(SharedFile),
}

/// A filesystem that lives entirely in memory.
///
/// Entries are kept in a sorted map keyed by absolute path, so listings come
/// back in name order. Open handles share the file's buffer with the tree:
/// bytes written through a handle are visible to `metadata` and to other
/// handles immediately.
///
/// Paths are resolved lexically: `.` is ignored, `..` climbs (never above
/// `/`), and relative paths are taken from the root. `/a/b` and `a/b` name
/// the same entry.
///
/// # Example
///
/// ```rust
/// use std::io::Write;
/// use std::path::Path;
/// use vfs_ftp_driver::{MemoryFs, VfsRead, VfsWrite};
///
/// let fs = MemoryFs::new();
/// fs.create(Path::new("/hello.txt")).unwrap().write_all(b"hi").unwrap();
/// assert_eq!(fs.metadata(Path::new("hello.txt")).unwrap().size, 2);
/// ```
#[derive(Debug)]
pub struct MemoryFs {
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
}

impl MemoryFs {
    /// Create an empty filesystem containing only `/`.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            PathBuf::from("/"),
            Node::Dir {
                perm: Permissions::default_dir(),
                modified: SystemTime::now(),
            },
        );
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    fn read_nodes(&self) -> Result<RwLockReadGuard<'_, BTreeMap<PathBuf, Node>>, FsError> {
        self.nodes
            .read()
            .map_err(|_| FsError::Backend("memory fs lock poisoned".into()))
    }

    fn write_nodes(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<PathBuf, Node>>, FsError> {
        self.nodes
            .write()
            .map_err(|_| FsError::Backend("memory fs lock poisoned".into()))
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute, lexically normalized form of `path`.
fn resolve(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(name) => out.push(name),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

fn require_parent_dir(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> Result<(), FsError> {
    let parent = path.parent().unwrap_or(Path::new("/"));
    match nodes.get(parent) {
        Some(Node::Dir { .. }) => Ok(()),
        Some(Node::File(_)) => Err(FsError::NotADirectory {
            path: parent.to_path_buf(),
        }),
        None => Err(FsError::NotFound {
            path: parent.to_path_buf(),
        }),
    }
}

fn lock_err() -> io::Error {
    io::Error::other("memory fs lock poisoned")
}

fn file_metadata(data: &FileData) -> Metadata {
    Metadata {
        file_type: FileType::File,
        size: data.bytes.len() as u64,
        permissions: Permissions::default_file(),
        modified: data.modified,
    }
}

fn node_metadata(node: &Node) -> Result<Metadata, FsError> {
    match node {
        Node::Dir { perm, modified } => Ok(Metadata {
            file_type: FileType::Directory,
            size: 0,
            permissions: *perm,
            modified: *modified,
        }),
        Node::File(data) => {
            let data = data
                .read()
                .map_err(|_| FsError::Backend("memory fs lock poisoned".into()))?;
            Ok(file_metadata(&data))
        }
    }
}

/// Open handle onto a [`MemoryFs`] file.
struct MemoryFile {
    data: SharedFile,
    pos: u64,
    append: bool,
}

impl MemoryFile {
    fn new(data: SharedFile, append: bool) -> Box<dyn VfsFile> {
        Box::new(Self {
            data,
            pos: 0,
            append,
        })
    }
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.read().map_err(|_| lock_err())?;
        let len = data.bytes.len();
        let start = usize::try_from(self.pos).map_or(len, |pos| pos.min(len));
        let n = buf.len().min(len - start);
        buf[..n].copy_from_slice(&data.bytes[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut data = self.data.write().map_err(|_| lock_err())?;
        if self.append {
            self.pos = data.bytes.len() as u64;
        }
        let end = usize::try_from(self.pos)
            .ok()
            .and_then(|start| start.checked_add(buf.len()))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "write position exceeds addressable memory",
                )
            })?;
        let start = end - buf.len();
        if end > data.bytes.len() {
            data.bytes.resize(end, 0);
        }
        data.bytes[start..end].copy_from_slice(buf);
        data.modified = SystemTime::now();
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(offset) => {
                let data = self.data.read().map_err(|_| lock_err())?;
                (data.bytes.len() as u64, offset)
            }
            SeekFrom::Current(offset) => (self.pos, offset),
        };
        match base.checked_add_signed(offset) {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

impl VfsFile for MemoryFile {
    fn metadata(&self) -> Result<Metadata, FsError> {
        let data = self
            .data
            .read()
            .map_err(|_| FsError::Backend("memory fs lock poisoned".into()))?;
        Ok(file_metadata(&data))
    }
}

impl VfsRead for MemoryFs {
    fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let path = resolve(path);
        let nodes = self.read_nodes()?;
        match nodes.get(&path) {
            Some(node) => node_metadata(node),
            None => Err(FsError::NotFound { path }),
        }
    }

    fn open(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
        let path = resolve(path);
        let nodes = self.read_nodes()?;
        match nodes.get(&path) {
            Some(Node::File(data)) => Ok(MemoryFile::new(Arc::clone(data), false)),
            Some(Node::Dir { .. }) => Err(FsError::NotAFile { path }),
            None => Err(FsError::NotFound { path }),
        }
    }
}

impl VfsWrite for MemoryFs {
    fn create(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
        let path = resolve(path);
        let mut nodes = self.write_nodes()?;
        match nodes.get(&path) {
            Some(Node::File(data)) => {
                let mut guard = data
                    .write()
                    .map_err(|_| FsError::Backend("memory fs lock poisoned".into()))?;
                guard.bytes.clear();
                guard.modified = SystemTime::now();
                drop(guard);
                Ok(MemoryFile::new(Arc::clone(data), false))
            }
            Some(Node::Dir { .. }) => Err(FsError::NotAFile { path }),
            None => {
                require_parent_dir(&nodes, &path)?;
                let data = Arc::new(RwLock::new(FileData {
                    bytes: Vec::new(),
                    modified: SystemTime::now(),
                }));
                nodes.insert(path, Node::File(Arc::clone(&data)));
                Ok(MemoryFile::new(data, false))
            }
        }
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
        let path = resolve(path);
        let nodes = self.read_nodes()?;
        match nodes.get(&path) {
            Some(Node::File(data)) => Ok(MemoryFile::new(Arc::clone(data), true)),
            Some(Node::Dir { .. }) => Err(FsError::NotAFile { path }),
            None => Err(FsError::NotFound { path }),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        let path = resolve(path);
        let mut nodes = self.write_nodes()?;
        match nodes.get(&path) {
            Some(Node::File(_)) => {
                nodes.remove(&path);
                Ok(())
            }
            Some(Node::Dir { .. }) => Err(FsError::NotAFile { path }),
            None => Err(FsError::NotFound { path }),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let from = resolve(from);
        let to = resolve(to);
        let mut nodes = self.write_nodes()?;

        let moving_dir = match nodes.get(&from) {
            Some(Node::Dir { .. }) => true,
            Some(Node::File(_)) => false,
            None => return Err(FsError::NotFound { path: from }),
        };
        if from == to {
            return Ok(());
        }
        if moving_dir && to.starts_with(&from) {
            return Err(FsError::Backend(format!(
                "cannot move {} inside itself",
                from.display()
            )));
        }
        match nodes.get(&to) {
            Some(Node::Dir { .. }) => {
                return Err(FsError::AlreadyExists {
                    path: to,
                    operation: "rename",
                });
            }
            Some(Node::File(_)) if moving_dir => {
                return Err(FsError::NotADirectory { path: to });
            }
            _ => {}
        }
        require_parent_dir(&nodes, &to)?;

        let moved: Vec<PathBuf> = nodes
            .keys()
            .filter(|key| key.starts_with(&from))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = nodes.remove(&old) {
                let new = match old.strip_prefix(&from) {
                    Ok(rest) if rest.as_os_str().is_empty() => to.clone(),
                    Ok(rest) => to.join(rest),
                    Err(_) => continue,
                };
                nodes.insert(new, node);
            }
        }
        Ok(())
    }
}

impl VfsDir for MemoryFs {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError> {
        let path = resolve(path);
        let nodes = self.read_nodes()?;
        match nodes.get(&path) {
            Some(Node::Dir { .. }) => {}
            Some(Node::File(_)) => return Err(FsError::NotADirectory { path }),
            None => return Err(FsError::NotFound { path }),
        }

        let mut entries = Vec::new();
        for (child, node) in nodes.iter() {
            if child.parent() != Some(path.as_path()) {
                continue;
            }
            let Some(name) = child.file_name() else {
                continue;
            };
            let meta = node_metadata(node)?;
            entries.push(Ok(DirEntry {
                name: name.to_string_lossy().into_owned(),
                path: child.clone(),
                file_type: meta.file_type,
                size: meta.size,
            }));
        }
        Ok(ReadDirIter::from_vec(entries))
    }

    fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        let path = resolve(path);
        let mut nodes = self.write_nodes()?;
        if nodes.contains_key(&path) {
            return Err(FsError::AlreadyExists {
                path,
                operation: "create_dir",
            });
        }
        require_parent_dir(&nodes, &path)?;
        nodes.insert(
            path,
            Node::Dir {
                perm,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
        let path = resolve(path);
        let mut nodes = self.write_nodes()?;
        match nodes.get(&path) {
            Some(Node::Dir { .. }) => {}
            Some(Node::File(_)) => return Err(FsError::NotADirectory { path }),
            None => return Err(FsError::NotFound { path }),
        }

        let root = Path::new("/");
        nodes.retain(|key, _| key == root || !key.starts_with(&path));
        Ok(())
    }
}
