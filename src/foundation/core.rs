use std::collections::BTreeMap;
use std::fmt;

/// Opaque 32-bit pixel format tag (a four-character code on most hosts).
///
/// The codec never interprets this value; it is round-tripped verbatim. Only hosts (such as
/// [`crate::HeapAllocator`]) give it meaning when laying out memory.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PixelFormat(pub u32);

impl PixelFormat {
    /// Packed 8-bit ARGB.
    pub const ARGB32: Self = Self(0x0000_0020);
    /// Packed 8-bit BGRA.
    pub const BGRA32: Self = Self::from_fourcc(*b"BGRA");
    /// Packed 8-bit RGBA.
    pub const RGBA32: Self = Self::from_fourcc(*b"RGBA");
    /// Packed 8-bit RGB, no alpha.
    pub const RGB24: Self = Self(0x0000_0018);
    /// Single 8-bit component.
    pub const ONE_COMPONENT_8: Self = Self::from_fourcc(*b"L008");
    /// Packed 4:2:2 Cb Y'0 Cr Y'1.
    pub const YUV422_PACKED: Self = Self::from_fourcc(*b"2vuy");
    /// Bi-planar 4:2:0, video range (luma plane + interleaved CbCr plane).
    pub const YUV420_BIPLANAR_VIDEO_RANGE: Self = Self::from_fourcc(*b"420v");
    /// Bi-planar 4:2:0, full range.
    pub const YUV420_BIPLANAR_FULL_RANGE: Self = Self::from_fourcc(*b"420f");
    /// Tri-planar 4:2:0 (Y, Cb, Cr).
    pub const YUV420_PLANAR: Self = Self::from_fourcc(*b"y420");

    /// Build a format tag from a big-endian four-character code.
    pub const fn from_fourcc(code: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(code))
    }

    /// Return the four-character code if every byte is printable ASCII.
    pub fn fourcc(self) -> Option<[u8; 4]> {
        let bytes = self.0.to_be_bytes();
        bytes
            .iter()
            .all(|b| b.is_ascii_graphic() || *b == b' ')
            .then_some(bytes)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fourcc() {
            Some(code) => {
                for b in code {
                    write!(f, "{}", b as char)?;
                }
                Ok(())
            }
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

/// Lock mode for a buffer's memory-access window.
///
/// A buffer must be unlocked with the same mode it was locked with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Memory is only read while locked.
    ReadOnly,
    /// Memory may be written while locked.
    ReadWrite,
}

impl LockMode {
    /// Return `true` for [`LockMode::ReadOnly`].
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

/// Which attachment dictionary to query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttachmentMode {
    /// Attachments that are copied along with the buffer.
    ShouldPropagate,
    /// Attachments that stay with this buffer only.
    ShouldNotPropagate,
}

/// Opaque metadata dictionary associated with a buffer.
///
/// Forwarded to allocators verbatim; never serialized by the codec.
pub type Attachments = BTreeMap<String, serde_json::Value>;

/// Memory region of a buffer: the whole buffer (non-planar) or one plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    /// The single implicit plane of a non-planar buffer.
    Whole,
    /// Plane `i` of a planar buffer.
    Plane(usize),
}

/// Dimensions and stride of one region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneGeometry {
    /// Width in pixels.
    pub width: usize,
    /// Height in rows.
    pub height: usize,
    /// Byte distance between the starts of consecutive rows.
    pub bytes_per_row: usize,
}

impl PlaneGeometry {
    /// Total bytes spanned by the region (`height * bytes_per_row`), `None` on overflow.
    pub fn byte_len(self) -> Option<usize> {
        self.height.checked_mul(self.bytes_per_row)
    }
}

/// Padding pixels a host allocates around the visible image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExtendedPixels {
    /// Columns of padding on the left.
    pub left: usize,
    /// Columns of padding on the right.
    pub right: usize,
    /// Rows of padding on top.
    pub top: usize,
    /// Rows of padding at the bottom.
    pub bottom: usize,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
