use std::collections::BTreeMap;
use std::fmt;
use std::io;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::buffer::host::{BufferAllocator, ImageBuffer};
use crate::foundation::core::PixelFormat;
use crate::foundation::error::BufferResult;

const PLANE_DATA: &str = "planeData";
const PLANE_BYTES_PER_ROW: &str = "planeBytesPerRow";
const PLANE_HEIGHT: &str = "planeHeight";

/// Key of plane `index`'s bytes inside the `planes` record.
pub fn plane_data_key(index: usize) -> String {
    format!("{PLANE_DATA}{index}")
}

/// Key of plane `index`'s stride inside the `planes` record.
pub fn plane_bytes_per_row_key(index: usize) -> String {
    format!("{PLANE_BYTES_PER_ROW}{index}")
}

/// Key of plane `index`'s row count inside the `planes` record.
pub fn plane_height_key(index: usize) -> String {
    format!("{PLANE_HEIGHT}{index}")
}

/// Serialized form of a pixel buffer: geometry plus raw region bytes.
///
/// JSON shape:
///
/// ```text
/// { "planeCount": 2, "pixelFormat": 875704438, "width": 4, "height": 2, "isPlanar": true,
///   "planes": { "planeData0": "<base64>", "planeBytesPerRow0": 64, "planeHeight0": 2, ... } }
/// ```
///
/// Non-planar buffers carry a single `data` blob instead of `planes`. Attachments are never
/// part of the record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedBuffer {
    /// Plane count reported by the source buffer (`0` when non-planar).
    pub plane_count: usize,
    /// Pixel format tag, round-tripped verbatim.
    pub pixel_format: PixelFormat,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Absent in records written before the flag existed; see [`SerializedBuffer::planar`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_planar: Option<bool>,
    /// Per-plane bytes and geometry, present iff planar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planes: Option<PlaneRecords>,
    /// Whole-buffer bytes, present iff non-planar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Blob>,
}

impl SerializedBuffer {
    /// Snapshot `buffer` into a new record. See [`crate::encode`].
    pub fn encode<B: ImageBuffer + ?Sized>(buffer: &B) -> BufferResult<Self> {
        crate::codec::encode::encode(buffer)
    }

    /// Materialize a new buffer from this record. See [`crate::decode`].
    pub fn decode<A: BufferAllocator>(&self, allocator: &A) -> BufferResult<A::Buffer> {
        crate::codec::decode::decode(self, allocator)
    }

    /// Whether the record is read as planar.
    ///
    /// Records without an `isPlanar` key come from the oldest writer, which only produced the
    /// `planes` shape, so they are planar.
    pub fn planar(&self) -> bool {
        self.is_planar.unwrap_or(true)
    }

    /// Sum of all blob lengths.
    pub fn payload_len(&self) -> usize {
        let planes = self
            .planes
            .iter()
            .flat_map(|p| p.iter())
            .filter_map(|(_, p)| p.data.as_ref())
            .map(Blob::len);
        planes.chain(self.data.as_ref().map(Blob::len)).sum()
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> BufferResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> BufferResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a record from JSON text.
    pub fn from_json(s: &str) -> BufferResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Write compact JSON to `w`.
    pub fn to_writer<W: io::Write>(&self, w: W) -> BufferResult<()> {
        Ok(serde_json::to_writer(w, self)?)
    }

    /// Read a JSON record from `r`.
    pub fn from_reader<R: io::Read>(r: R) -> BufferResult<Self> {
        Ok(serde_json::from_reader(r)?)
    }
}

/// One plane's entry in the `planes` record.
///
/// Stride and height are optional on input: an early writer stored the stride twice under the
/// stride key and never wrote the height key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaneRecord {
    /// Raw plane bytes, `height * bytes_per_row` long.
    pub data: Option<Blob>,
    /// Source stride.
    pub bytes_per_row: Option<usize>,
    /// Source row count.
    pub height: Option<usize>,
}

/// The nested `planes` record, keyed by plane index.
///
/// Serialized flat as `planeData{i}`, `planeBytesPerRow{i}` and `planeHeight{i}` entries in
/// increasing plane order. Unknown keys are skipped when reading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaneRecords {
    planes: BTreeMap<usize, PlaneRecord>,
}

impl PlaneRecords {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry for plane `index`, replacing any previous one.
    pub fn insert(&mut self, index: usize, plane: PlaneRecord) {
        self.planes.insert(index, plane);
    }

    /// Entry for plane `index`.
    pub fn get(&self, index: usize) -> Option<&PlaneRecord> {
        self.planes.get(&index)
    }

    /// Mutable entry for plane `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut PlaneRecord> {
        self.planes.get_mut(&index)
    }

    /// Number of plane entries.
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Return `true` when no plane entries are present.
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Entries in increasing plane order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PlaneRecord)> {
        self.planes.iter().map(|(i, p)| (*i, p))
    }
}

impl Serialize for PlaneRecords {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (i, plane) in self.iter() {
            if let Some(data) = &plane.data {
                map.serialize_entry(&plane_data_key(i), data)?;
            }
            if let Some(bpr) = plane.bytes_per_row {
                map.serialize_entry(&plane_bytes_per_row_key(i), &bpr)?;
            }
            if let Some(height) = plane.height {
                map.serialize_entry(&plane_height_key(i), &height)?;
            }
        }
        map.end()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlaneField {
    Data,
    BytesPerRow,
    Height,
}

/// Split `planeData3` into `(Data, 3)`; anything else is `None`.
fn parse_plane_key(key: &str) -> Option<(PlaneField, usize)> {
    let (field, index) = if let Some(rest) = key.strip_prefix(PLANE_DATA) {
        (PlaneField::Data, rest)
    } else if let Some(rest) = key.strip_prefix(PLANE_BYTES_PER_ROW) {
        (PlaneField::BytesPerRow, rest)
    } else if let Some(rest) = key.strip_prefix(PLANE_HEIGHT) {
        (PlaneField::Height, rest)
    } else {
        return None;
    };
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    index.parse().ok().map(|i| (field, i))
}

impl<'de> Deserialize<'de> for PlaneRecords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PlanesVisitor;

        impl<'de> Visitor<'de> for PlanesVisitor {
            type Value = PlaneRecords;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of planeData{i} / planeBytesPerRow{i} / planeHeight{i} entries")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<PlaneRecords, M::Error> {
                let mut out = PlaneRecords::new();
                while let Some(key) = map.next_key::<String>()? {
                    let Some((field, i)) = parse_plane_key(&key) else {
                        map.next_value::<IgnoredAny>()?;
                        continue;
                    };
                    let plane = out.planes.entry(i).or_default();
                    match field {
                        PlaneField::Data => plane.data = Some(map.next_value()?),
                        PlaneField::BytesPerRow => plane.bytes_per_row = Some(map.next_value()?),
                        PlaneField::Height => plane.height = Some(map.next_value()?),
                    }
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(PlanesVisitor)
    }
}

/// Raw bytes of one region.
///
/// Human-readable formats carry it as a standard base64 string, binary formats as a byte
/// string. Input also accepts a plain array of integers.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    /// Byte length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Take the bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&STANDARD.encode(&self.0))
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BlobVisitor;

        impl<'de> Visitor<'de> for BlobVisitor {
            type Value = Blob;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a base64 string or a byte sequence")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Blob, E> {
                STANDARD
                    .decode(v)
                    .map(Blob)
                    .map_err(|e| E::custom(format!("invalid base64 blob: {e}")))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Blob, E> {
                Ok(Blob(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Blob, E> {
                Ok(Blob(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Blob, A::Error> {
                let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1 << 20));
                while let Some(b) = seq.next_element::<u8>()? {
                    out.push(b);
                }
                Ok(Blob(out))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_any(BlobVisitor)
        } else {
            deserializer.deserialize_byte_buf(BlobVisitor)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/record.rs"]
mod tests;
