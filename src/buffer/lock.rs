use crate::buffer::access::PixelBufferExt;
use crate::buffer::host::ImageBuffer;
use crate::foundation::core::{LockMode, Region};
use crate::foundation::error::BufferResult;

/// Scoped read-only lock on a buffer.
///
/// Locks [`LockMode::ReadOnly`] on construction and unlocks with the same mode when dropped,
/// on every exit path. Any number of read locks may share a buffer; none can coexist with a
/// [`WriteLock`], which needs the buffer mutably.
pub struct ReadLock<'a, B: ImageBuffer + ?Sized> {
    buffer: &'a B,
}

impl<'a, B: ImageBuffer + ?Sized> ReadLock<'a, B> {
    /// Lock `buffer` read-only.
    pub fn new(buffer: &'a B) -> BufferResult<Self> {
        buffer.lock(LockMode::ReadOnly)?;
        Ok(Self { buffer })
    }

    /// The locked buffer.
    pub fn buffer(&self) -> &B {
        self.buffer
    }

    /// Bytes of `region`, exactly `height * bytes_per_row` long.
    ///
    /// `None` when the host cannot provide the memory or provides less than the geometry implies.
    pub fn bytes(&self, region: Region) -> Option<&[u8]> {
        let len = self.buffer.byte_len(region)?;
        let bytes = match region {
            Region::Whole => self.buffer.base_address()?,
            Region::Plane(i) => self.buffer.base_address_of_plane(i)?,
        };
        bytes.get(..len)
    }
}

impl<B: ImageBuffer + ?Sized> Drop for ReadLock<'_, B> {
    fn drop(&mut self) {
        release(self.buffer, LockMode::ReadOnly);
    }
}

/// Scoped read-write lock on a buffer.
pub struct WriteLock<'a, B: ImageBuffer + ?Sized> {
    buffer: &'a mut B,
}

impl<'a, B: ImageBuffer + ?Sized> WriteLock<'a, B> {
    /// Lock `buffer` read-write.
    pub fn new(buffer: &'a mut B) -> BufferResult<Self> {
        buffer.lock(LockMode::ReadWrite)?;
        Ok(Self { buffer })
    }

    /// The locked buffer.
    pub fn buffer(&self) -> &B {
        self.buffer
    }

    /// Bytes of `region`; see [`ReadLock::bytes`].
    pub fn bytes(&self, region: Region) -> Option<&[u8]> {
        let len = self.buffer.byte_len(region)?;
        let bytes = match region {
            Region::Whole => self.buffer.base_address()?,
            Region::Plane(i) => self.buffer.base_address_of_plane(i)?,
        };
        bytes.get(..len)
    }

    /// Writable bytes of `region`, exactly `height * bytes_per_row` long.
    pub fn bytes_mut(&mut self, region: Region) -> Option<&mut [u8]> {
        let len = self.buffer.byte_len(region)?;
        let bytes = match region {
            Region::Whole => self.buffer.base_address_mut()?,
            Region::Plane(i) => self.buffer.base_address_of_plane_mut(i)?,
        };
        bytes.get_mut(..len)
    }
}

impl<B: ImageBuffer + ?Sized> Drop for WriteLock<'_, B> {
    fn drop(&mut self) {
        release(&*self.buffer, LockMode::ReadWrite);
    }
}

fn release<B: ImageBuffer + ?Sized>(buffer: &B, mode: LockMode) {
    if let Err(err) = buffer.unlock(mode) {
        tracing::warn!(?mode, %err, "failed to unlock buffer");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/lock.rs"]
mod tests;
