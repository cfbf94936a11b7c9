use std::cell::Cell;

use crate::buffer::format::layout_for;
use crate::buffer::host::{BufferAllocator, ImageBuffer};
use crate::foundation::core::{AttachmentMode, Attachments, LockMode, PixelFormat};
use crate::foundation::error::{BufferError, BufferResult};

/// Options for [`HeapAllocator`].
#[derive(Debug, Clone, Copy)]
pub struct HeapAllocatorOpts {
    /// Every row stride is rounded up to a multiple of this many bytes (`0` is treated as `1`).
    pub row_alignment: usize,
    /// Allocations whose planes add up to more bytes than this are refused.
    pub max_buffer_bytes: usize,
}

impl Default for HeapAllocatorOpts {
    fn default() -> Self {
        Self {
            row_alignment: 64,
            max_buffer_bytes: 512 * 1024 * 1024,
        }
    }
}

/// In-process buffer host backed by `Vec<u8>` planes.
///
/// Knows a fixed set of packed and planar formats (see [`PixelFormat`] constants); any other
/// format tag is refused like an unsupported format on a platform host.
#[derive(Debug, Clone, Default)]
pub struct HeapAllocator {
    opts: HeapAllocatorOpts,
}

impl HeapAllocator {
    /// Create an allocator with `opts`.
    pub fn new(opts: HeapAllocatorOpts) -> Self {
        Self { opts }
    }

    /// Create an allocator that aligns row strides to `row_alignment` bytes.
    pub fn with_row_alignment(row_alignment: usize) -> Self {
        Self::new(HeapAllocatorOpts {
            row_alignment,
            ..HeapAllocatorOpts::default()
        })
    }

    /// Options this allocator was created with.
    pub fn opts(&self) -> HeapAllocatorOpts {
        self.opts
    }
}

impl BufferAllocator for HeapAllocator {
    type Buffer = HeapBuffer;

    fn create_buffer(
        &self,
        width: usize,
        height: usize,
        pixel_format: PixelFormat,
        attachments: Option<&Attachments>,
    ) -> BufferResult<HeapBuffer> {
        if width == 0 || height == 0 {
            return Err(BufferError::allocation(format!(
                "invalid dimensions {width}x{height}"
            )));
        }
        let Some(layout) = layout_for(pixel_format) else {
            return Err(BufferError::allocation(format!(
                "unsupported pixel format {pixel_format}"
            )));
        };

        let overflow =
            || BufferError::allocation(format!("{width}x{height} {pixel_format} overflows usize"));
        let align = self.opts.row_alignment.max(1);

        let mut shapes = Vec::with_capacity(layout.planes.len());
        let mut total = 0usize;
        for plane in layout.planes {
            let (w, h) = plane.dimensions(width, height);
            let stride = w
                .checked_mul(plane.bytes_per_pixel)
                .and_then(|row| row.checked_next_multiple_of(align))
                .ok_or_else(overflow)?;
            let len = stride.checked_mul(h).ok_or_else(overflow)?;
            total = total.checked_add(len).ok_or_else(overflow)?;
            shapes.push((w, h, stride, len));
        }
        if total > self.opts.max_buffer_bytes {
            return Err(BufferError::allocation(format!(
                "{width}x{height} {pixel_format} needs {total} bytes, limit is {}",
                self.opts.max_buffer_bytes
            )));
        }

        tracing::debug!(
            width,
            height,
            format = %pixel_format,
            planes = shapes.len(),
            bytes = total,
            "allocated heap buffer"
        );

        Ok(HeapBuffer {
            width,
            height,
            pixel_format,
            planar: layout.planar,
            planes: shapes
                .into_iter()
                .map(|(width, height, bytes_per_row, len)| HeapPlane {
                    width,
                    height,
                    bytes_per_row,
                    bytes: vec![0u8; len],
                })
                .collect(),
            propagated: attachments.cloned().unwrap_or_default(),
            local: Attachments::new(),
            lock_state: Cell::new(None),
        })
    }
}

#[derive(Debug)]
struct HeapPlane {
    width: usize,
    height: usize,
    bytes_per_row: usize,
    bytes: Vec<u8>,
}

/// Buffer produced by [`HeapAllocator`].
///
/// Memory is only addressable while locked, and only writable under a [`LockMode::ReadWrite`]
/// lock. Nested locks in the same mode are counted.
#[derive(Debug)]
pub struct HeapBuffer {
    width: usize,
    height: usize,
    pixel_format: PixelFormat,
    planar: bool,
    planes: Vec<HeapPlane>,
    propagated: Attachments,
    local: Attachments,
    lock_state: Cell<Option<(LockMode, usize)>>,
}

impl HeapBuffer {
    /// Current lock mode and nesting depth, `None` when unlocked.
    pub fn lock_state(&self) -> Option<(LockMode, usize)> {
        self.lock_state.get()
    }

    /// Return `true` while any lock is held.
    pub fn is_locked(&self) -> bool {
        self.lock_state.get().is_some()
    }

    /// Set one attachment in the dictionary selected by `mode`.
    pub fn set_attachment(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
        mode: AttachmentMode,
    ) {
        let dict = match mode {
            AttachmentMode::ShouldPropagate => &mut self.propagated,
            AttachmentMode::ShouldNotPropagate => &mut self.local,
        };
        dict.insert(key.into(), value);
    }

    fn plane(&self, plane: usize) -> Option<&HeapPlane> {
        if self.planar {
            self.planes.get(plane)
        } else {
            None
        }
    }

    fn whole(&self) -> Option<&HeapPlane> {
        if self.planar {
            None
        } else {
            self.planes.first()
        }
    }

    fn writable(&self) -> bool {
        matches!(self.lock_state.get(), Some((LockMode::ReadWrite, _)))
    }
}

impl ImageBuffer for HeapBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn is_planar(&self) -> bool {
        self.planar
    }

    fn plane_count(&self) -> usize {
        if self.planar { self.planes.len() } else { 0 }
    }

    fn width_of_plane(&self, plane: usize) -> usize {
        self.plane(plane).map_or(0, |p| p.width)
    }

    fn height_of_plane(&self, plane: usize) -> usize {
        self.plane(plane).map_or(0, |p| p.height)
    }

    fn bytes_per_row(&self) -> usize {
        self.whole().map_or(0, |p| p.bytes_per_row)
    }

    fn bytes_per_row_of_plane(&self, plane: usize) -> usize {
        self.plane(plane).map_or(0, |p| p.bytes_per_row)
    }

    fn attachments(&self, mode: AttachmentMode) -> Option<Attachments> {
        let dict = match mode {
            AttachmentMode::ShouldPropagate => &self.propagated,
            AttachmentMode::ShouldNotPropagate => &self.local,
        };
        (!dict.is_empty()).then(|| dict.clone())
    }

    fn lock(&self, mode: LockMode) -> BufferResult<()> {
        let next = match self.lock_state.get() {
            None => (mode, 1),
            Some((held, depth)) if held == mode => (mode, depth + 1),
            Some((held, _)) => {
                return Err(BufferError::lock(format!(
                    "buffer is locked {held:?}, cannot lock {mode:?}"
                )));
            }
        };
        self.lock_state.set(Some(next));
        Ok(())
    }

    fn unlock(&self, mode: LockMode) -> BufferResult<()> {
        match self.lock_state.get() {
            None => Err(BufferError::lock("buffer is not locked")),
            Some((held, _)) if held != mode => Err(BufferError::lock(format!(
                "buffer is locked {held:?}, cannot unlock {mode:?}"
            ))),
            Some((_, 1)) => {
                self.lock_state.set(None);
                Ok(())
            }
            Some((held, depth)) => {
                self.lock_state.set(Some((held, depth - 1)));
                Ok(())
            }
        }
    }

    fn base_address(&self) -> Option<&[u8]> {
        if !self.is_locked() {
            return None;
        }
        self.whole().map(|p| p.bytes.as_slice())
    }

    fn base_address_of_plane(&self, plane: usize) -> Option<&[u8]> {
        if !self.is_locked() {
            return None;
        }
        self.plane(plane).map(|p| p.bytes.as_slice())
    }

    fn base_address_mut(&mut self) -> Option<&mut [u8]> {
        if !self.writable() || self.planar {
            return None;
        }
        self.planes.first_mut().map(|p| p.bytes.as_mut_slice())
    }

    fn base_address_of_plane_mut(&mut self, plane: usize) -> Option<&mut [u8]> {
        if !self.writable() || !self.planar {
            return None;
        }
        self.planes.get_mut(plane).map(|p| p.bytes.as_mut_slice())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/heap.rs"]
mod tests;
