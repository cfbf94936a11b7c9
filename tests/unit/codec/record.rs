use super::*;

fn planar_record() -> SerializedBuffer {
    let mut planes = PlaneRecords::new();
    planes.insert(
        0,
        PlaneRecord {
            data: Some(Blob(vec![1, 2, 3, 4])),
            bytes_per_row: Some(2),
            height: Some(2),
        },
    );
    planes.insert(
        1,
        PlaneRecord {
            data: Some(Blob(vec![9, 8])),
            bytes_per_row: Some(2),
            height: Some(1),
        },
    );
    SerializedBuffer {
        plane_count: 2,
        pixel_format: PixelFormat::YUV420_BIPLANAR_VIDEO_RANGE,
        width: 2,
        height: 2,
        is_planar: Some(true),
        planes: Some(planes),
        data: None,
    }
}

#[test]
fn plane_keys_are_formatted_by_index() {
    assert_eq!(plane_data_key(0), "planeData0");
    assert_eq!(plane_bytes_per_row_key(12), "planeBytesPerRow12");
    assert_eq!(plane_height_key(3), "planeHeight3");
}

#[test]
fn parse_plane_key_rejects_malformed_suffixes() {
    assert_eq!(parse_plane_key("planeData7"), Some((PlaneField::Data, 7)));
    assert_eq!(
        parse_plane_key("planeBytesPerRow0"),
        Some((PlaneField::BytesPerRow, 0))
    );
    assert_eq!(parse_plane_key("planeHeight10"), Some((PlaneField::Height, 10)));
    assert_eq!(parse_plane_key("planeData"), None);
    assert_eq!(parse_plane_key("planeData+1"), None);
    assert_eq!(parse_plane_key("planeDataX"), None);
    assert_eq!(parse_plane_key("width"), None);
}

#[test]
fn planar_record_json_shape() {
    let v = serde_json::to_value(planar_record()).unwrap();
    let obj = v.as_object().unwrap();
    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    for k in ["planeCount", "pixelFormat", "width", "height", "isPlanar", "planes"] {
        assert!(keys.contains(&k), "missing {k}");
    }
    assert!(!obj.contains_key("data"));

    let planes = obj["planes"].as_object().unwrap();
    assert_eq!(planes["planeData0"], "AQIDBA==");
    assert_eq!(planes["planeBytesPerRow0"], 2);
    assert_eq!(planes["planeHeight0"], 2);
    assert_eq!(planes["planeData1"], "CQg=");
    assert_eq!(planes["planeHeight1"], 1);
    assert_eq!(planes.len(), 6);
}

#[test]
fn field_order_follows_record_layout() {
    let s = planar_record().to_json().unwrap();
    let pos = |k: &str| s.find(&format!("\"{k}\"")).unwrap();
    assert!(pos("planeCount") < pos("pixelFormat"));
    assert!(pos("pixelFormat") < pos("width"));
    assert!(pos("height") < pos("isPlanar"));
    assert!(pos("isPlanar") < pos("planes"));
    assert!(pos("planeData0") < pos("planeData1"));
}

#[test]
fn json_text_reads_back_equal() {
    let rec = planar_record();
    let back = SerializedBuffer::from_json(&rec.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back, rec);

    let mut out = Vec::new();
    rec.to_writer(&mut out).unwrap();
    let back = SerializedBuffer::from_reader(out.as_slice()).unwrap();
    assert_eq!(back, rec);
}

#[test]
fn non_planar_record_omits_planes() {
    let rec = SerializedBuffer {
        plane_count: 0,
        pixel_format: PixelFormat::BGRA32,
        width: 1,
        height: 1,
        is_planar: Some(false),
        planes: None,
        data: Some(Blob(vec![0, 0, 0, 255])),
    };
    let v = serde_json::to_value(&rec).unwrap();
    assert!(v.get("planes").is_none());
    assert_eq!(v["data"], "AAAA/w==");
    assert!(!rec.planar());
    assert_eq!(rec.payload_len(), 4);
}

#[test]
fn blob_accepts_integer_arrays() {
    let blob: Blob = serde_json::from_str("[1, 2, 255]").unwrap();
    assert_eq!(blob.as_slice(), &[1, 2, 255]);
    assert!(serde_json::from_str::<Blob>("[256]").is_err());
    assert!(serde_json::from_str::<Blob>("\"not base64!\"").is_err());
}

#[test]
fn legacy_record_without_flags_or_heights() {
    let s = r#"{
        "planeCount": 1,
        "pixelFormat": 1278226488,
        "width": 2,
        "height": 1,
        "planes": { "planeData0": "BQY=", "planeBytesPerRow0": 2, "somethingElse": [1, 2] }
    }"#;
    let rec = SerializedBuffer::from_json(s).unwrap();
    assert_eq!(rec.is_planar, None);
    assert!(rec.planar());
    let plane = rec.planes.as_ref().unwrap().get(0).unwrap();
    assert_eq!(plane.data.as_ref().unwrap().as_slice(), &[5, 6]);
    assert_eq!(plane.bytes_per_row, Some(2));
    assert_eq!(plane.height, None);
    assert_eq!(rec.planes.as_ref().unwrap().len(), 1);
}

#[test]
fn missing_required_keys_surface_as_format_errors() {
    let err = SerializedBuffer::from_json(r#"{"planeCount": 0, "width": 1, "height": 1}"#)
        .unwrap_err();
    assert!(matches!(err, crate::BufferError::Format(_)));
    assert!(err.to_string().contains("pixelFormat"));

    let err = SerializedBuffer::from_json(
        r#"{"planeCount": 0, "pixelFormat": "BGRA", "width": 1, "height": 1}"#,
    )
    .unwrap_err();
    assert!(matches!(err, crate::BufferError::Format(_)));
}

#[test]
fn blob_debug_is_summarized() {
    assert_eq!(format!("{:?}", Blob(vec![0; 4096])), "Blob(4096 bytes)");
}

#[test]
fn blob_is_a_raw_byte_string_in_binary_formats() {
    let blob = Blob(vec![1, 2, 3, 255]);
    let wire = postcard::to_allocvec(&blob).unwrap();
    // varint length prefix then the bytes, no base64
    assert_eq!(wire, vec![4, 1, 2, 3, 255]);

    let back: Blob = postcard::from_bytes(&wire).unwrap();
    assert_eq!(back.into_inner(), vec![1, 2, 3, 255]);
}

#[test]
fn blob_accepts_byte_strings() {
    use serde::de::value::{BytesDeserializer, Error};

    let blob = Blob::deserialize(BytesDeserializer::<Error>::new(&[7, 8, 9])).unwrap();
    assert_eq!(blob.as_slice(), &[7, 8, 9]);
}

#[test]
fn plane_entries_can_be_patched_in_place() {
    let mut record = planar_record();
    let planes = record.planes.as_mut().unwrap();
    planes.get_mut(1).unwrap().height = None;
    assert!(planes.get_mut(5).is_none());

    let v: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    assert!(v["planes"].get(plane_height_key(1)).is_none());
    assert_eq!(v["planes"][plane_height_key(0)], 2);
}
