use crate::foundation::core::{AttachmentMode, Attachments, ExtendedPixels, LockMode, PixelFormat};
use crate::foundation::error::BufferResult;

/// A multi-plane image buffer owned by a host media framework.
///
/// Every getter is a live query against the host; nothing is cached on this side because the
/// host may mutate the buffer between calls.
///
/// Memory contract: the `base_address*` methods return the bytes of a region, exactly
/// `height * bytes_per_row` long, and are only expected to succeed between [`ImageBuffer::lock`]
/// and the matching [`ImageBuffer::unlock`]. Prefer [`crate::ReadLock`] / [`crate::WriteLock`]
/// over calling the lock pair by hand.
pub trait ImageBuffer {
    /// Buffer width in pixels.
    fn width(&self) -> usize;
    /// Buffer height in pixels.
    fn height(&self) -> usize;
    /// Pixel format tag the buffer was created with.
    fn pixel_format(&self) -> PixelFormat;
    /// Whether the buffer stores independent planes.
    fn is_planar(&self) -> bool;
    /// Number of planes; `0` for non-planar buffers.
    fn plane_count(&self) -> usize;

    /// Width of plane `plane` in pixels.
    fn width_of_plane(&self, plane: usize) -> usize;
    /// Height of plane `plane` in rows.
    fn height_of_plane(&self, plane: usize) -> usize;
    /// Stride of a non-planar buffer.
    fn bytes_per_row(&self) -> usize;
    /// Stride of plane `plane`.
    fn bytes_per_row_of_plane(&self, plane: usize) -> usize;

    /// Attachment dictionary for `mode`, if any.
    fn attachments(&self, mode: AttachmentMode) -> Option<Attachments>;

    /// Padding the host allocated around the visible image.
    fn extended_pixels(&self) -> ExtendedPixels {
        ExtendedPixels::default()
    }

    /// Ask the host to replicate edge pixels into the extended padding.
    fn fill_extended_pixels(&mut self) -> BufferResult<()> {
        Ok(())
    }

    /// Enter the memory-access window.
    fn lock(&self, mode: LockMode) -> BufferResult<()>;
    /// Leave the memory-access window; `mode` must match the one used to lock.
    fn unlock(&self, mode: LockMode) -> BufferResult<()>;

    /// Bytes of a non-planar buffer.
    fn base_address(&self) -> Option<&[u8]>;
    /// Bytes of plane `plane`.
    fn base_address_of_plane(&self, plane: usize) -> Option<&[u8]>;
    /// Writable bytes of a non-planar buffer.
    fn base_address_mut(&mut self) -> Option<&mut [u8]>;
    /// Writable bytes of plane `plane`.
    fn base_address_of_plane_mut(&mut self, plane: usize) -> Option<&mut [u8]>;
}

/// Host facility that allocates new [`ImageBuffer`]s.
pub trait BufferAllocator {
    /// Buffer type produced by this allocator.
    type Buffer: ImageBuffer;

    /// Allocate a buffer with unspecified pixel content.
    ///
    /// `attachments` is forwarded to the host untouched. Fails with
    /// [`crate::BufferError::Allocation`] when the host refuses the geometry or format.
    fn create_buffer(
        &self,
        width: usize,
        height: usize,
        pixel_format: PixelFormat,
        attachments: Option<&Attachments>,
    ) -> BufferResult<Self::Buffer>;
}
