use crate::buffer::access::{PixelBufferExt, missing_region};
use crate::buffer::host::ImageBuffer;
use crate::codec::record::{Blob, PlaneRecord, PlaneRecords, SerializedBuffer};
use crate::foundation::core::Region;
use crate::foundation::error::BufferResult;

/// Snapshot `buffer`'s geometry and bytes into a [`SerializedBuffer`].
///
/// The buffer is locked read-only for the duration and unlocked on every exit path. Planar
/// buffers emit one `planes` entry per plane in increasing order; non-planar buffers emit a
/// single `data` blob. Each blob holds `height * bytes_per_row` bytes, stride padding included.
///
/// Fails with [`crate::BufferError::MissingPlaneData`] / [`crate::BufferError::MissingData`]
/// when the host cannot provide a region's memory; no partial record is returned.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        width = buffer.width(),
        height = buffer.height(),
        format = %buffer.pixel_format(),
        planar = buffer.is_planar()
    )
)]
pub fn encode<B: ImageBuffer + ?Sized>(buffer: &B) -> BufferResult<SerializedBuffer> {
    let is_planar = buffer.is_planar();
    let mut record = SerializedBuffer {
        plane_count: buffer.plane_count(),
        pixel_format: buffer.pixel_format(),
        width: buffer.width(),
        height: buffer.height(),
        is_planar: Some(is_planar),
        planes: None,
        data: None,
    };

    let guard = buffer.lock_read()?;
    if is_planar {
        let mut planes = PlaneRecords::new();
        for i in 0..record.plane_count {
            let region = Region::Plane(i);
            let bytes = guard.bytes(region).ok_or_else(|| missing_region(region))?;
            let geom = buffer.geometry(region);
            planes.insert(
                i,
                PlaneRecord {
                    data: Some(Blob::from(bytes)),
                    bytes_per_row: Some(geom.bytes_per_row),
                    height: Some(geom.height),
                },
            );
        }
        record.planes = Some(planes);
    } else {
        let bytes = guard
            .bytes(Region::Whole)
            .ok_or_else(|| missing_region(Region::Whole))?;
        record.data = Some(Blob::from(bytes));
    }

    tracing::debug!(bytes = record.payload_len(), "encoded buffer");
    Ok(record)
}
