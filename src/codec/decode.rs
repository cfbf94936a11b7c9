use crate::buffer::access::{PixelBufferExt, missing_region};
use crate::buffer::host::{BufferAllocator, ImageBuffer};
use crate::codec::record::{Blob, SerializedBuffer, plane_data_key};
use crate::foundation::core::Region;
use crate::foundation::error::{BufferError, BufferResult};

/// Materialize a new buffer from `record`.
///
/// Allocates through `allocator` (no attachments), locks the new buffer read-write, and copies
/// each blob verbatim into its region. Every blob must be exactly as long as the allocated
/// region (`height * bytes_per_row`), otherwise decoding fails with
/// [`crate::BufferError::CorruptData`] and the half-filled buffer is dropped.
///
/// Records without `isPlanar` are read as planar, see [`SerializedBuffer::planar`]. Only those
/// legacy records may decode into a non-planar allocation, and only when they carry no planes.
///
/// `data`, `planes` and `planeData{i}` are optional in [`SerializedBuffer`] so one type holds
/// both record shapes; their absence is reported here as [`crate::BufferError::MissingKey`].
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        width = record.width,
        height = record.height,
        format = %record.pixel_format,
        planes = record.plane_count
    )
)]
pub fn decode<A: BufferAllocator>(
    record: &SerializedBuffer,
    allocator: &A,
) -> BufferResult<A::Buffer> {
    let sources = sources(record)?;

    let mut buffer = allocator.create_buffer(
        record.width,
        record.height,
        record.pixel_format,
        None,
    )?;

    if record.planar() {
        if record.is_planar.is_some() && !buffer.is_planar() {
            return Err(BufferError::corrupt(format!(
                "record is planar, allocated {} buffer is not",
                record.pixel_format
            )));
        }
        if record.plane_count > buffer.plane_count() {
            return Err(BufferError::corrupt(format!(
                "record has {} planes, allocated {} buffer has {}",
                record.plane_count,
                record.pixel_format,
                buffer.plane_count()
            )));
        }
    } else if buffer.is_planar() {
        return Err(BufferError::corrupt(format!(
            "record is non-planar, allocated {} buffer is planar",
            record.pixel_format
        )));
    }

    {
        let mut guard = buffer.lock_write()?;
        for (region, blob) in sources {
            let expected = guard.buffer().byte_len(region).ok_or_else(|| {
                BufferError::corrupt(format!("{region:?} size overflows usize"))
            })?;
            if blob.len() != expected {
                return Err(BufferError::corrupt(format!(
                    "'{}' holds {} bytes, allocated region expects {expected}",
                    source_key(region),
                    blob.len()
                )));
            }
            let dst = guard
                .bytes_mut(region)
                .ok_or_else(|| missing_region(region))?;
            dst.copy_from_slice(blob.as_slice());
        }
    }

    Ok(buffer)
}

/// Blobs to copy, in region order. Checked before anything is allocated.
fn sources(record: &SerializedBuffer) -> BufferResult<Vec<(Region, &Blob)>> {
    if !record.planar() {
        let data = record
            .data
            .as_ref()
            .ok_or_else(|| BufferError::missing_key("data"))?;
        return Ok(vec![(Region::Whole, data)]);
    }

    let planes = record
        .planes
        .as_ref()
        .ok_or_else(|| BufferError::missing_key("planes"))?;
    (0..record.plane_count)
        .map(|i| {
            planes
                .get(i)
                .and_then(|p| p.data.as_ref())
                .map(|data| (Region::Plane(i), data))
                .ok_or_else(|| BufferError::missing_key(plane_data_key(i)))
        })
        .collect()
}

fn source_key(region: Region) -> String {
    match region {
        Region::Whole => "data".to_string(),
        Region::Plane(i) => plane_data_key(i),
    }
}
