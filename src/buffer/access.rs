use crate::buffer::host::{BufferAllocator, ImageBuffer};
use crate::buffer::lock::{ReadLock, WriteLock};
use crate::foundation::core::{AttachmentMode, PlaneGeometry, Region};
use crate::foundation::error::{BufferError, BufferResult};

/// Convenience layer over any [`ImageBuffer`].
///
/// Blanket-implemented; bring it into scope and call the methods on a host buffer directly.
pub trait PixelBufferExt: ImageBuffer {
    /// Regions to walk, in order: `[Whole]` for non-planar buffers, otherwise one per plane.
    fn regions(&self) -> Vec<Region>;

    /// Width, height and stride of `region`.
    fn geometry(&self, region: Region) -> PlaneGeometry;

    /// `height * bytes_per_row` of `region`, `None` on overflow.
    fn byte_len(&self, region: Region) -> Option<usize>;

    /// Lock read-only for the lifetime of the returned guard.
    fn lock_read(&self) -> BufferResult<ReadLock<'_, Self>>;

    /// Lock read-write for the lifetime of the returned guard.
    fn lock_write(&mut self) -> BufferResult<WriteLock<'_, Self>>;

    /// Allocate a buffer with the same width, height, format and propagatable attachments.
    ///
    /// Pixel content is not copied.
    fn allocate_blank_copy<A: BufferAllocator>(&self, allocator: &A) -> BufferResult<A::Buffer>;

    /// Allocate a blank copy and copy every byte of every region into it.
    ///
    /// Regions whose strides differ between the two allocations are copied row by row, each
    /// row clipped to the narrower stride.
    fn deep_copy<A: BufferAllocator>(&self, allocator: &A) -> BufferResult<A::Buffer>;
}

impl<B: ImageBuffer + ?Sized> PixelBufferExt for B {
    fn regions(&self) -> Vec<Region> {
        if self.is_planar() {
            (0..self.plane_count()).map(Region::Plane).collect()
        } else {
            vec![Region::Whole]
        }
    }

    fn geometry(&self, region: Region) -> PlaneGeometry {
        match region {
            Region::Whole => PlaneGeometry {
                width: self.width(),
                height: self.height(),
                bytes_per_row: self.bytes_per_row(),
            },
            Region::Plane(i) => PlaneGeometry {
                width: self.width_of_plane(i),
                height: self.height_of_plane(i),
                bytes_per_row: self.bytes_per_row_of_plane(i),
            },
        }
    }

    fn byte_len(&self, region: Region) -> Option<usize> {
        self.geometry(region).byte_len()
    }

    fn lock_read(&self) -> BufferResult<ReadLock<'_, Self>> {
        ReadLock::new(self)
    }

    fn lock_write(&mut self) -> BufferResult<WriteLock<'_, Self>> {
        WriteLock::new(self)
    }

    fn allocate_blank_copy<A: BufferAllocator>(&self, allocator: &A) -> BufferResult<A::Buffer> {
        let attachments = self.attachments(AttachmentMode::ShouldPropagate);
        allocator.create_buffer(
            self.width(),
            self.height(),
            self.pixel_format(),
            attachments.as_ref(),
        )
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(width = self.width(), height = self.height(), format = %self.pixel_format())
    )]
    fn deep_copy<A: BufferAllocator>(&self, allocator: &A) -> BufferResult<A::Buffer> {
        let mut copy = self.allocate_blank_copy(allocator)?;
        {
            let src = self.lock_read()?;
            let mut dst = WriteLock::new(&mut copy)?;
            for region in self.regions() {
                let src_geom = self.geometry(region);
                let dst_geom = dst.buffer().geometry(region);

                let src_bytes = src.bytes(region).ok_or_else(|| missing_region(region))?;
                let dst_bytes = dst.bytes_mut(region).ok_or_else(|| missing_region(region))?;
                copy_rows(
                    src_bytes,
                    src_geom.bytes_per_row,
                    dst_bytes,
                    dst_geom.bytes_per_row,
                    src_geom.height.min(dst_geom.height),
                );
            }
        }
        Ok(copy)
    }
}

/// Copy `height` rows from `src` to `dst`.
///
/// Equal strides copy `height * stride` bytes in one go. Otherwise each row copies
/// `min(src_stride, dst_stride)` bytes and the two cursors advance by their own strides.
/// Copies never run past the end of either slice.
pub fn copy_rows(src: &[u8], src_stride: usize, dst: &mut [u8], dst_stride: usize, height: usize) {
    if src_stride == dst_stride {
        let len = height
            .saturating_mul(src_stride)
            .min(src.len())
            .min(dst.len());
        dst[..len].copy_from_slice(&src[..len]);
        return;
    }

    let row = src_stride.min(dst_stride);
    if row == 0 {
        return;
    }
    tracing::debug!(src_stride, dst_stride, height, "stride mismatch, copying row by row");
    for (s, d) in src
        .chunks(src_stride)
        .zip(dst.chunks_mut(dst_stride))
        .take(height)
    {
        let n = row.min(s.len()).min(d.len());
        d[..n].copy_from_slice(&s[..n]);
    }
}

pub(crate) fn missing_region(region: Region) -> BufferError {
    match region {
        Region::Whole => BufferError::MissingData,
        Region::Plane(plane) => BufferError::MissingPlaneData { plane },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/access.rs"]
mod tests;
