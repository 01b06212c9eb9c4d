//! Per-session driver construction.

use std::sync::Arc;

use tracing::debug;

use crate::{Driver, FsDriver, FsError, Vfs};

/// Builds one [`Driver`] per protocol session.
///
/// The server calls [`new_driver`](DriverFactory::new_driver) when a connection
/// opens and drops the driver when it closes.
pub trait DriverFactory: Send + Sync {
    /// The driver handed to each session.
    type Driver: Driver;

    /// Create a fresh driver.
    fn new_driver(&self) -> Result<Self::Driver, FsError>;
}

/// Owner/group pair handed to every session.
///
/// The driver carries it without looking at it; servers that report
/// ownership in listings read it back through [`FsDriver::perm`].
///
/// With the `serde` feature it can be loaded from server configuration:
///
/// ```rust
/// # #[cfg(feature = "serde")]
/// # {
/// use vfs_ftp_driver::SimplePerm;
///
/// let perm: SimplePerm = serde_json::from_str(r#"{"owner":"ftp","group":"users"}"#).unwrap();
/// assert_eq!(perm.owner(), "ftp");
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimplePerm {
    owner: String,
    group: String,
}

impl SimplePerm {
    /// Create a policy for the given owner and group.
    pub fn new(owner: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            group: group.into(),
        }
    }

    /// The placeholder policy used when none is configured (`test`/`test`).
    pub fn placeholder() -> Self {
        Self::new("test", "test")
    }

    /// Owner name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Group name.
    pub fn group(&self) -> &str {
        &self.group
    }
}

impl Default for SimplePerm {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// [`DriverFactory`] producing [`FsDriver`]s over one shared backend.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use vfs_ftp_driver::{Driver, DriverFactory, MemoryFs, VfsDriverFactory};
///
/// let factory = VfsDriverFactory::new(Arc::new(MemoryFs::new()));
/// let driver = factory.new_driver().unwrap();
/// assert_eq!(driver.current_dir(), "/");
/// assert!(driver.stat("/").unwrap().is_dir);
/// ```
pub struct VfsDriverFactory<B: ?Sized, P = SimplePerm> {
    fs: Arc<B>,
    perm: P,
}

impl<B: Vfs + ?Sized> VfsDriverFactory<B> {
    /// Create a factory with the placeholder permission policy.
    pub fn new(fs: Arc<B>) -> Self {
        Self {
            fs,
            perm: SimplePerm::placeholder(),
        }
    }
}

impl<B: Vfs + ?Sized, P> VfsDriverFactory<B, P> {
    /// Replace the permission policy every new driver receives.
    pub fn with_perm<Q>(self, perm: Q) -> VfsDriverFactory<B, Q> {
        VfsDriverFactory { fs: self.fs, perm }
    }

    /// The shared backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.fs
    }
}

impl<B, P> DriverFactory for VfsDriverFactory<B, P>
where
    B: Vfs + ?Sized,
    P: Clone + Send + Sync,
{
    type Driver = FsDriver<B, P>;

    fn new_driver(&self) -> Result<Self::Driver, FsError> {
        debug!("creating driver for new session");
        Ok(FsDriver::new(Arc::clone(&self.fs), self.perm.clone()))
    }
}
