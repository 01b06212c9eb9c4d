//! Open file handles.

use std::io::{Read, Seek, Write};

use crate::{FsError, Metadata};

/// An open file handed out by a backend.
///
/// Handles are plain owned values: dropping one closes the underlying resource.
/// Backends decide which directions actually work; writing to a handle from
/// [`VfsRead::open`](super::VfsRead::open) may fail.
pub trait VfsFile: Read + Write + Seek + Send {
    /// Metadata of the open file, as of now.
    fn metadata(&self) -> Result<Metadata, FsError>;
}
