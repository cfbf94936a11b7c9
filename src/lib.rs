//! Pixelbuf adds accessors, deep copy and lossless serialization on top of a host's
//! multi-plane pixel buffer.
//!
//! The host (a platform media framework, or the bundled [`HeapAllocator`]) owns allocation,
//! locking and memory layout; this crate only calls through the [`ImageBuffer`] /
//! [`BufferAllocator`] traits:
//!
//! - [`PixelBufferExt`]: geometry per region, scoped [`ReadLock`] / [`WriteLock`], blank copy
//!   and stride-aware deep copy
//! - [`encode`] / [`decode`]: buffer to [`SerializedBuffer`] and back, byte-exact
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod buffer;
pub mod codec;

pub use crate::foundation::core::{
    AttachmentMode, Attachments, ExtendedPixels, LockMode, PixelFormat, PlaneGeometry, Region,
};
pub use crate::foundation::error::{BufferError, BufferResult};

pub use crate::buffer::access::{PixelBufferExt, copy_rows};
pub use crate::buffer::heap::{HeapAllocator, HeapAllocatorOpts, HeapBuffer};
pub use crate::buffer::host::{BufferAllocator, ImageBuffer};
pub use crate::buffer::lock::{ReadLock, WriteLock};
pub use crate::codec::decode::decode;
pub use crate::codec::encode::encode;
pub use crate::codec::record::{Blob, PlaneRecord, PlaneRecords, SerializedBuffer};
