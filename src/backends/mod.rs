//! # Reference Backends
//!
//! Two ready-made [`Vfs`](crate::Vfs) implementations.
//!
//! | Backend | Storage |
//! |---------|---------|
//! | [`MemoryFs`] | Process memory; gone when dropped |
//! | [`NativeFs`] | A host directory via `std::fs` |
//!
//! Anything else (object stores, archives, overlays) plugs in by implementing
//! [`VfsRead`](crate::VfsRead), [`VfsWrite`](crate::VfsWrite) and
//! [`VfsDir`](crate::VfsDir).

mod memory;
mod native;

pub use memory::MemoryFs;
pub use native::NativeFs;
