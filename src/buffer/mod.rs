//! Buffer access: the host collaborator traits, scoped locking, geometry helpers, deep copy,
//! and an in-process heap host.

/// Geometry, blank-copy and deep-copy helpers over any host buffer.
pub mod access;
mod format;
/// In-process reference host.
pub mod heap;
/// Host collaborator traits.
pub mod host;
/// Scoped lock guards.
pub mod lock;
