//! # Driver
//!
//! The per-session adapter a protocol server talks to.
//!
//! ## Overview
//!
//! [`Driver`] is the capability interface the server consumes: one method per
//! storage-touching command. [`FsDriver`] implements it by translating each
//! call into one or more [`Vfs`] backend calls.
//!
//! ```text
//! server ──▶ Driver::put_file ──▶ FsDriver ──▶ Vfs::metadata / create / open_append
//! ```
//!
//! ## Policy
//!
//! | Operation | Backend calls | Policy |
//! |-----------|---------------|--------|
//! | `stat` | `metadata` | fallback lookup |
//! | `change_dir` | `metadata` | must be a directory; stores the raw path |
//! | `list_dir` | `read_dir` | visitor errors stop iteration |
//! | `make_dir` | `create_dir` | permissive mode |
//! | `delete_dir` | `remove_dir_all` | recursive |
//! | `delete_file` | `remove_file` | |
//! | `rename` | `metadata`, `rename` | never overwrites; fallback on source |
//! | `open_for_read` | `open` | caller owns the returned stream |
//! | `put_file` | `metadata`, `remove_file`, `create`, `open_append` | see [`WriteMode`] |
//!
//! Apart from these checks backend errors are returned untouched. Nothing is
//! cached: every call re-queries the backend.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::trace;

use crate::path::{to_slash, with_fallback};
use crate::{FileInfo, FsError, Permissions, Vfs, VfsFile};

/// Storage operations required by the protocol server.
///
/// One instance serves one session and is driven sequentially; only
/// [`change_dir`](Driver::change_dir) mutates it.
///
/// # Object Safety
///
/// This trait is object-safe, so servers can hold a `Box<dyn Driver>`.
pub trait Driver: Send {
    /// Metadata for a single entry.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the entry is absent
    fn stat(&self, path: &str) -> Result<FileInfo, FsError>;

    /// Change the session's working directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the target is absent
    /// - [`FsError::NotADirectory`] if the target is a file
    fn change_dir(&mut self, path: &str) -> Result<(), FsError>;

    /// Visit every immediate child of a directory in backend order.
    ///
    /// Iteration stops at the first error `visit` returns, and that error is
    /// returned unchanged. A partial listing is an expected outcome.
    fn list_dir(
        &self,
        path: &str,
        visit: &mut dyn FnMut(FileInfo) -> Result<(), FsError>,
    ) -> Result<(), FsError>;

    /// Create a directory.
    fn make_dir(&self, path: &str) -> Result<(), FsError>;

    /// Delete a directory and everything beneath it.
    fn delete_dir(&self, path: &str) -> Result<(), FsError>;

    /// Delete a single file.
    fn delete_file(&self, path: &str) -> Result<(), FsError>;

    /// Rename `from` to `to`. Never overwrites an existing destination.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if `to` already exists
    fn rename(&self, from: &str, to: &str) -> Result<(), FsError>;

    /// Open a file for download starting at `offset`.
    ///
    /// Returns the file's *total* size and a stream positioned at `offset`.
    /// The stream is the caller's to close.
    fn open_for_read(&self, path: &str, offset: u64) -> Result<(u64, FileReader), FsError>;

    /// Store everything `data` yields at `path`, returning the bytes written.
    ///
    /// With `append` set and an existing file, data goes to its end; otherwise
    /// the file is (re)created.
    ///
    /// # Errors
    ///
    /// - [`FsError::NameCollision`] if a directory occupies `path`
    /// - [`FsError::PutFile`] if probing `path` fails for a reason other than absence
    fn put_file(&self, path: &str, data: &mut dyn Read, append: bool) -> Result<u64, FsError>;
}

/// How an upload is written, decided from the destination's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Nothing there yet: create the file.
    Create,
    /// Replace an existing file: remove it, then create afresh.
    Overwrite,
    /// Extend an existing file.
    Append,
}

impl WriteMode {
    /// Pick the mode for a destination that `exists` (as a file).
    ///
    /// An append to a missing file is demoted to a plain create.
    ///
    /// ```rust
    /// use vfs_ftp_driver::WriteMode;
    ///
    /// assert_eq!(WriteMode::select(false, true), WriteMode::Create);
    /// assert_eq!(WriteMode::select(true, true), WriteMode::Append);
    /// ```
    pub fn select(exists: bool, append: bool) -> Self {
        match (exists, append) {
            (false, _) => WriteMode::Create,
            (true, false) => WriteMode::Overwrite,
            (true, true) => WriteMode::Append,
        }
    }
}

/// An open download stream.
///
/// Owns the backend file handle. Dropping the reader closes it, so whoever
/// receives one from [`Driver::open_for_read`] is responsible for dropping it
/// once the transfer finishes or is aborted.
#[must_use = "dropping a FileReader closes the file"]
pub struct FileReader {
    file: Box<dyn VfsFile>,
}

impl FileReader {
    /// Wrap an open backend handle.
    pub fn new(file: Box<dyn VfsFile>) -> Self {
        Self { file }
    }
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl fmt::Debug for FileReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileReader").finish_non_exhaustive()
    }
}

/// [`Driver`] over any [`Vfs`] backend.
///
/// Holds a shared handle to the backend, the session's working directory and
/// the session's permission policy `P`. The policy is never inspected here;
/// it only travels with the session for the server to consult.
pub struct FsDriver<B: ?Sized, P> {
    fs: Arc<B>,
    cur_dir: String,
    perm: P,
}

impl<B: Vfs + ?Sized, P> FsDriver<B, P> {
    /// Create a driver rooted at `/`.
    pub fn new(fs: Arc<B>, perm: P) -> Self {
        Self {
            fs,
            cur_dir: String::from("/"),
            perm,
        }
    }

    /// The working directory exactly as last passed to `change_dir`.
    pub fn current_dir(&self) -> &str {
        &self.cur_dir
    }

    /// The session's permission policy.
    pub fn perm(&self) -> &P {
        &self.perm
    }

    /// The shared backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.fs
    }

    fn stream_into(
        path: &Path,
        mut file: Box<dyn VfsFile>,
        data: &mut dyn Read,
    ) -> Result<u64, FsError> {
        let written = io::copy(data, &mut file).map_err(|source| FsError::Io {
            operation: "copy",
            path: path.to_path_buf(),
            source,
        })?;
        file.flush().map_err(|source| FsError::Io {
            operation: "flush",
            path: path.to_path_buf(),
            source,
        })?;
        Ok(written)
    }
}

impl<B: Vfs + ?Sized, P: Send> Driver for FsDriver<B, P> {
    fn stat(&self, path: &str) -> Result<FileInfo, FsError> {
        let path = to_slash(path);
        with_fallback("stat", &path, |p| {
            let meta = self.fs.metadata(p)?;
            Ok(FileInfo::for_path(p, &meta))
        })
    }

    fn change_dir(&mut self, path: &str) -> Result<(), FsError> {
        let info = self.stat(path)?;
        if !info.is_dir {
            return Err(FsError::NotADirectory {
                path: path.into(),
            });
        }
        trace!(from = %self.cur_dir, to = path, "change_dir");
        self.cur_dir = path.to_string();
        Ok(())
    }

    fn list_dir(
        &self,
        path: &str,
        visit: &mut dyn FnMut(FileInfo) -> Result<(), FsError>,
    ) -> Result<(), FsError> {
        let path = to_slash(path);
        for entry in self.fs.read_dir(Path::new(&*path))? {
            visit(FileInfo::from(entry?))?;
        }
        Ok(())
    }

    fn make_dir(&self, path: &str) -> Result<(), FsError> {
        let path = to_slash(path);
        self.fs
            .create_dir(Path::new(&*path), Permissions::permissive())
    }

    fn delete_dir(&self, path: &str) -> Result<(), FsError> {
        let path = to_slash(path);
        self.fs.remove_dir_all(Path::new(&*path))
    }

    fn delete_file(&self, path: &str) -> Result<(), FsError> {
        let path = to_slash(path);
        self.fs.remove_file(Path::new(&*path))
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        let to = Path::new(to);
        if self.fs.metadata(to).is_ok() {
            return Err(FsError::AlreadyExists {
                path: to.to_path_buf(),
                operation: "rename",
            });
        }

        let from = to_slash(from);
        with_fallback("rename", &from, |p| self.fs.rename(p, to))
    }

    fn open_for_read(&self, path: &str, offset: u64) -> Result<(u64, FileReader), FsError> {
        let path = to_slash(path);
        let path = Path::new(&*path);

        let mut file = self.fs.open(path)?;
        let size = file.metadata()?.size;
        file.seek(SeekFrom::Start(offset))
            .map_err(|source| FsError::Io {
                operation: "seek",
                path: path.to_path_buf(),
                source,
            })?;

        trace!(path = %path.display(), size, offset, "opened for read");
        Ok((size, FileReader::new(file)))
    }

    fn put_file(&self, path: &str, data: &mut dyn Read, append: bool) -> Result<u64, FsError> {
        let path = to_slash(path);
        let path = Path::new(&*path);

        let exists = match self.fs.metadata(path) {
            Ok(meta) if meta.is_dir() => {
                return Err(FsError::NameCollision {
                    path: path.to_path_buf(),
                });
            }
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                return Err(FsError::PutFile {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        let mode = WriteMode::select(exists, append);
        trace!(path = %path.display(), ?mode, append, "put_file");

        match mode {
            WriteMode::Create => Self::stream_into(path, self.fs.create(path)?, data),
            WriteMode::Overwrite => {
                self.fs.remove_file(path)?;
                Self::stream_into(path, self.fs.create(path)?, data)
            }
            WriteMode::Append => {
                let mut file = self.fs.open_append(path)?;
                file.seek(SeekFrom::End(0))
                    .map_err(|source| FsError::Io {
                        operation: "seek",
                        path: path.to_path_buf(),
                        source,
                    })?;
                Self::stream_into(path, file, data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DirEntry, FileType, Metadata, ReadDirIter, VfsDir, VfsRead, VfsWrite};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Backend that only knows entries stored without a leading separator and
    /// records every call it receives.
    #[derive(Default)]
    struct ScriptedFs {
        calls: Mutex<Vec<String>>,
        unreadable: bool,
    }

    impl ScriptedFs {
        fn record(&self, call: &str, path: &Path) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{call} {}", path.display()));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    /// A file whose seeks always fail.
    struct BrokenSeek;

    impl Read for BrokenSeek {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for BrokenSeek {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for BrokenSeek {
        fn seek(&mut self, _: SeekFrom) -> io::Result<u64> {
            Err(io::Error::other("seek unsupported"))
        }
    }

    impl VfsFile for BrokenSeek {
        fn metadata(&self) -> Result<Metadata, FsError> {
            Ok(Metadata {
                size: 10,
                ..Metadata::default()
            })
        }
    }

    impl VfsRead for ScriptedFs {
        fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
            self.record("metadata", path);
            if self.unreadable {
                return Err(FsError::PermissionDenied {
                    path: path.to_path_buf(),
                    operation: "metadata",
                });
            }
            match path.to_str() {
                Some("docs") => Ok(Metadata {
                    file_type: FileType::Directory,
                    ..Metadata::default()
                }),
                Some("docs/a.txt") | Some("taken.txt") => Ok(Metadata {
                    size: 3,
                    ..Metadata::default()
                }),
                _ => Err(FsError::NotFound {
                    path: path.to_path_buf(),
                }),
            }
        }

        fn open(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
            self.record("open", path);
            Ok(Box::new(BrokenSeek))
        }
    }

    impl VfsWrite for ScriptedFs {
        fn create(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
            self.record("create", path);
            Ok(Box::new(BrokenSeek))
        }

        fn open_append(&self, path: &Path) -> Result<Box<dyn VfsFile>, FsError> {
            self.record("open_append", path);
            Ok(Box::new(BrokenSeek))
        }

        fn remove_file(&self, path: &Path) -> Result<(), FsError> {
            self.record("remove_file", path);
            Ok(())
        }

        fn rename(&self, from: &Path, _to: &Path) -> Result<(), FsError> {
            self.record("rename", from);
            if from.has_root() {
                Err(FsError::NotFound {
                    path: from.to_path_buf(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl VfsDir for ScriptedFs {
        fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError> {
            self.record("read_dir", path);
            Ok(ReadDirIter::from_vec(vec![Ok(DirEntry {
                name: "a.txt".into(),
                path: PathBuf::from("docs/a.txt"),
                file_type: FileType::File,
                size: 3,
            })]))
        }

        fn create_dir(&self, path: &Path, perm: Permissions) -> Result<(), FsError> {
            self.record(&format!("create_dir {:o}", perm.mode()), path);
            Ok(())
        }

        fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
            self.record("remove_dir_all", path);
            Ok(())
        }
    }

    fn driver(fs: ScriptedFs) -> FsDriver<ScriptedFs, ()> {
        FsDriver::new(Arc::new(fs), ())
    }

    #[test]
    fn driver_is_object_safe() {
        fn _check(_: &dyn Driver) {}
        fn _boxed(d: FsDriver<dyn Vfs, ()>) -> Box<dyn Driver> {
            Box::new(d)
        }
    }

    #[test]
    fn write_mode_decision_table() {
        assert_eq!(WriteMode::select(false, false), WriteMode::Create);
        assert_eq!(WriteMode::select(false, true), WriteMode::Create);
        assert_eq!(WriteMode::select(true, false), WriteMode::Overwrite);
        assert_eq!(WriteMode::select(true, true), WriteMode::Append);
    }

    #[test]
    fn stat_falls_back_to_unrooted_path() {
        let d = driver(ScriptedFs::default());
        let info = d.stat("/docs/a.txt").unwrap();
        assert_eq!(info.name, "a.txt");
        assert_eq!(info.size, 3);
        assert_eq!(
            d.fs.calls(),
            vec!["metadata /docs/a.txt", "metadata docs/a.txt"]
        );
    }

    #[test]
    fn change_dir_stores_raw_path() {
        let mut d = driver(ScriptedFs::default());
        assert_eq!(d.current_dir(), "/");
        d.change_dir("/docs").unwrap();
        assert_eq!(d.current_dir(), "/docs");
    }

    #[test]
    fn change_dir_rejects_files() {
        let mut d = driver(ScriptedFs::default());
        let err = d.change_dir("/docs/a.txt").unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
        assert_eq!(d.current_dir(), "/");
    }

    #[test]
    fn rename_probes_raw_destination_then_retries_source() {
        let d = driver(ScriptedFs::default());
        d.rename("/docs/a.txt", "docs/b.txt").unwrap();
        assert_eq!(
            d.fs.calls(),
            vec![
                "metadata docs/b.txt",
                "rename /docs/a.txt",
                "rename docs/a.txt"
            ]
        );
    }

    #[test]
    fn rename_refuses_existing_destination_without_renaming() {
        let d = driver(ScriptedFs::default());
        let err = d.rename("/docs/a.txt", "taken.txt").unwrap_err();
        assert!(matches!(
            err,
            FsError::AlreadyExists {
                operation: "rename",
                ..
            }
        ));
        assert_eq!(d.fs.calls(), vec!["metadata taken.txt"]);
    }

    #[test]
    fn make_dir_uses_permissive_mode() {
        let d = driver(ScriptedFs::default());
        d.make_dir("/new").unwrap();
        assert_eq!(d.fs.calls(), vec!["create_dir 777 /new"]);
    }

    #[test]
    fn open_for_read_surfaces_seek_failure() {
        let d = driver(ScriptedFs::default());
        let err = d.open_for_read("/docs/a.txt", 4).unwrap_err();
        assert!(matches!(err, FsError::Io { operation: "seek", .. }));
    }

    #[test]
    fn put_file_wraps_unexpected_probe_errors() {
        let d = driver(ScriptedFs {
            unreadable: true,
            ..ScriptedFs::default()
        });
        let err = d.put_file("/x", &mut &b"data"[..], false).unwrap_err();
        match err {
            FsError::PutFile { path, source } => {
                assert_eq!(path, PathBuf::from("/x"));
                assert!(matches!(*source, FsError::PermissionDenied { .. }));
            }
            other => panic!("expected PutFile, got {other:?}"),
        }
        assert_eq!(d.fs.calls(), vec!["metadata /x"]);
    }

    #[test]
    fn put_file_refuses_directory_before_writing() {
        let d = driver(ScriptedFs::default());
        let err = d.put_file("docs", &mut &b"data"[..], true).unwrap_err();
        assert!(matches!(err, FsError::NameCollision { .. }));
        assert_eq!(d.fs.calls(), vec!["metadata docs"]);
    }

    #[test]
    fn put_file_overwrite_removes_then_creates() {
        let d = driver(ScriptedFs::default());
        let n = d.put_file("taken.txt", &mut &b"data"[..], false).unwrap();
        assert_eq!(n, 4);
        assert_eq!(
            d.fs.calls(),
            vec![
                "metadata taken.txt",
                "remove_file taken.txt",
                "create taken.txt"
            ]
        );
    }

    #[test]
    fn list_dir_converts_entries() {
        let d = driver(ScriptedFs::default());
        let mut seen = Vec::new();
        d.list_dir("docs", &mut |info| {
            seen.push(info);
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![FileInfo {
                name: "a.txt".into(),
                size: 3,
                is_dir: false
            }]
        );
    }
}
