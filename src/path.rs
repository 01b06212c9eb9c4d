//! # Path Policy
//!
//! How protocol paths become backend paths.
//!
//! ## Responsibility
//! - Normalize separators to `/`, the form every backend receives
//! - Provide the single fallback lookup used by `stat` and `rename`
//!
//! ## Fallback Lookup
//!
//! Protocol clients always send absolute paths (`/pub/file.txt`), but some
//! backends index entries without the leading separator (`pub/file.txt`).
//! [`with_fallback`] runs an operation against the normalized path and, if that
//! fails, exactly once more against the path with one leading `/` removed. The
//! caller sees the second attempt's outcome, error included.
//!
//! ```rust
//! use vfs_ftp_driver::path::{strip_leading_separator, to_slash};
//!
//! assert_eq!(to_slash("/pub/file.txt"), "/pub/file.txt");
//! assert_eq!(strip_leading_separator("/pub/file.txt"), "pub/file.txt");
//! assert_eq!(strip_leading_separator("//twice"), "/twice");
//! ```

use std::borrow::Cow;
use std::path::{MAIN_SEPARATOR, Path};

use tracing::debug;

use crate::FsError;

/// The separator every backend path uses.
pub const SEPARATOR: char = '/';

/// Convert host separators to `/`.
///
/// A no-op on hosts whose separator already is `/`. Nothing else about the
/// path changes: no `.`/`..` folding, no trailing separator trimming.
pub fn to_slash(path: &str) -> Cow<'_, str> {
    if MAIN_SEPARATOR == SEPARATOR || !path.contains(MAIN_SEPARATOR) {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(path.replace(MAIN_SEPARATOR, "/"))
    }
}

/// Remove one leading `/`, if present.
pub fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix(SEPARATOR).unwrap_or(path)
}

/// Run `op` on `path`, retrying once without the leading separator on failure.
///
/// Returns the first attempt's success, otherwise whatever the retry yields.
/// When `path` has no leading separator the retry would repeat the identical
/// call, so `op` runs exactly once and its error is returned. A transient
/// backend failure on such a path is therefore not retried; callers that want
/// a second attempt have to make it themselves.
pub fn with_fallback<T, F>(operation: &'static str, path: &str, mut op: F) -> Result<T, FsError>
where
    F: FnMut(&Path) -> Result<T, FsError>,
{
    let err = match op(Path::new(path)) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let stripped = strip_leading_separator(path);
    if stripped.len() == path.len() {
        return Err(err);
    }

    debug!(operation, path, error = %err, "retrying without leading separator");
    op(Path::new(stripped))
}
