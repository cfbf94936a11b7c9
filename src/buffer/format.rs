use crate::foundation::core::PixelFormat;

/// Memory shape of one plane relative to the full image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlaneLayout {
    pub(crate) bytes_per_pixel: usize,
    pub(crate) x_subsampling: usize,
    pub(crate) y_subsampling: usize,
}

impl PlaneLayout {
    const fn full(bytes_per_pixel: usize) -> Self {
        Self {
            bytes_per_pixel,
            x_subsampling: 1,
            y_subsampling: 1,
        }
    }

    const fn subsampled(bytes_per_pixel: usize, x: usize, y: usize) -> Self {
        Self {
            bytes_per_pixel,
            x_subsampling: x,
            y_subsampling: y,
        }
    }

    /// Plane dimensions for an image of `width` x `height`; subsampled planes round up.
    pub(crate) fn dimensions(self, width: usize, height: usize) -> (usize, usize) {
        (
            width.div_ceil(self.x_subsampling),
            height.div_ceil(self.y_subsampling),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FormatLayout {
    pub(crate) planar: bool,
    pub(crate) planes: &'static [PlaneLayout],
}

const PACKED_1: &[PlaneLayout] = &[PlaneLayout::full(1)];
const PACKED_2: &[PlaneLayout] = &[PlaneLayout::full(2)];
const PACKED_3: &[PlaneLayout] = &[PlaneLayout::full(3)];
const PACKED_4: &[PlaneLayout] = &[PlaneLayout::full(4)];
const BIPLANAR_420: &[PlaneLayout] = &[PlaneLayout::full(1), PlaneLayout::subsampled(2, 2, 2)];
const TRIPLANAR_420: &[PlaneLayout] = &[
    PlaneLayout::full(1),
    PlaneLayout::subsampled(1, 2, 2),
    PlaneLayout::subsampled(1, 2, 2),
];

/// Layout of the formats the heap host knows how to allocate.
pub(crate) fn layout_for(format: PixelFormat) -> Option<FormatLayout> {
    let (planar, planes) = match format {
        PixelFormat::ARGB32 | PixelFormat::BGRA32 | PixelFormat::RGBA32 => (false, PACKED_4),
        PixelFormat::RGB24 => (false, PACKED_3),
        PixelFormat::YUV422_PACKED => (false, PACKED_2),
        PixelFormat::ONE_COMPONENT_8 => (false, PACKED_1),
        PixelFormat::YUV420_BIPLANAR_VIDEO_RANGE | PixelFormat::YUV420_BIPLANAR_FULL_RANGE => {
            (true, BIPLANAR_420)
        }
        PixelFormat::YUV420_PLANAR => (true, TRIPLANAR_420),
        _ => return None,
    };
    Some(FormatLayout { planar, planes })
}
