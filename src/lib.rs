//! # vfs-ftp-driver
//!
//! Storage adapter between a **file-transfer protocol server** and any
//! **pluggable virtual filesystem**.
//!
//! The server speaks in protocol commands (`STAT`, `LIST`, `RETR`, `STOR`,
//! `APPE`, `RNFR`/`RNTO`, ...). Each one becomes a call on a per-session
//! [`Driver`], which [`FsDriver`] translates into primitive calls on a shared
//! [`Vfs`] backend.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Read;
//! use std::sync::Arc;
//! use vfs_ftp_driver::{Driver, DriverFactory, MemoryFs, VfsDriverFactory};
//!
//! let factory = VfsDriverFactory::new(Arc::new(MemoryFs::new()));
//! let mut session = factory.new_driver()?;
//!
//! session.make_dir("/pub")?;
//! session.change_dir("/pub")?;
//! session.put_file("/pub/hello.txt", &mut &b"hello"[..], false)?;
//! session.put_file("/pub/hello.txt", &mut &b", world"[..], true)?;
//!
//! let (size, mut reader) = session.open_for_read("/pub/hello.txt", 7)?;
//! let mut tail = String::new();
//! reader.read_to_string(&mut tail).unwrap();
//! assert_eq!((size, tail.as_str()), (12, "world"));
//! # Ok::<(), vfs_ftp_driver::FsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Driver`] | What the protocol server calls, one instance per session |
//! | [`FsDriver`] | [`Driver`] over any [`Vfs`] backend |
//! | [`DriverFactory`] | Builds a driver when a session opens |
//! | [`VfsDriverFactory`] | [`DriverFactory`] sharing one backend across sessions |
//! | [`Vfs`] | Backend capability: [`VfsRead`] + [`VfsWrite`] + [`VfsDir`] |
//! | [`FileInfo`] | Name, size and directory flag reported to the server |
//! | [`FileReader`] | Download stream returned by [`Driver::open_for_read`] |
//! | [`FsError`] | Error type with path and operation context |
//!
//! ---
//!
//! ## Backends
//!
//! [`MemoryFs`] keeps everything in process memory and [`NativeFs`] serves a
//! host directory. Anything implementing the three component traits gets
//! [`Vfs`] through a blanket implementation and can be plugged in instead.
//!
//! Some backends index entries without a leading `/`. [`stat`](Driver::stat)
//! and [`rename`](Driver::rename) retry once with the separator stripped; see
//! [`path`].
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Backend errors pass through
//! unchanged; the driver adds only its own refusals:
//!
//! ```rust
//! use vfs_ftp_driver::FsError;
//! use std::path::PathBuf;
//!
//! let err = FsError::NameCollision { path: PathBuf::from("/pub") };
//! assert_eq!(err.to_string(), "a directory has the same name: /pub");
//!
//! let err = FsError::AlreadyExists {
//!     path: PathBuf::from("/b.txt"),
//!     operation: "rename",
//! };
//! assert_eq!(err.to_string(), "rename: already exists: /b.txt");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! Backend traits require `Send + Sync` and take `&self`; one backend behind
//! an `Arc` serves every session. A [`Driver`] is `Send` but belongs to a
//! single session, which drives it sequentially.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Metadata`], [`DirEntry`], [`FileInfo`], [`Permissions`], [`SimplePerm`] |

mod backends;
mod driver;
mod error;
mod factory;
pub mod path;
mod traits;
mod types;

// Public re-exports - error types
pub use error::FsError;

// Public re-exports - core types
pub use types::{DirEntry, FileInfo, FileType, Metadata, Permissions};

// Public re-exports - backend traits
pub use traits::{ReadDirIter, Vfs, VfsDir, VfsFile, VfsRead, VfsWrite};

// Public re-exports - driver
pub use driver::{Driver, FileReader, FsDriver, WriteMode};
pub use factory::{DriverFactory, SimplePerm, VfsDriverFactory};

// Public re-exports - reference backends
pub use backends::{MemoryFs, NativeFs};
