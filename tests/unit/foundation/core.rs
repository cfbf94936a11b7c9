use super::*;

#[test]
fn fourcc_formats_display_as_text() {
    assert_eq!(PixelFormat::BGRA32.to_string(), "BGRA");
    assert_eq!(PixelFormat::YUV420_BIPLANAR_VIDEO_RANGE.to_string(), "420v");
    assert_eq!(PixelFormat::from_fourcc(*b"y420"), PixelFormat::YUV420_PLANAR);
}

#[test]
fn numeric_formats_display_as_hex() {
    assert_eq!(PixelFormat::ARGB32.fourcc(), None);
    assert_eq!(PixelFormat::ARGB32.to_string(), "0x00000020");
    assert_eq!(PixelFormat::RGB24.to_string(), "0x00000018");
}

#[test]
fn pixel_format_serializes_as_plain_integer() {
    let s = serde_json::to_string(&PixelFormat::BGRA32).unwrap();
    assert_eq!(s, "1111970369");
    let back: PixelFormat = serde_json::from_str(&s).unwrap();
    assert_eq!(back, PixelFormat::BGRA32);
}

#[test]
fn plane_geometry_byte_len_checks_overflow() {
    let g = PlaneGeometry {
        width: 3,
        height: 4,
        bytes_per_row: 16,
    };
    assert_eq!(g.byte_len(), Some(64));

    let huge = PlaneGeometry {
        width: 1,
        height: usize::MAX,
        bytes_per_row: 2,
    };
    assert_eq!(huge.byte_len(), None);
}

#[test]
fn lock_mode_read_only_flag() {
    assert!(LockMode::ReadOnly.is_read_only());
    assert!(!LockMode::ReadWrite.is_read_only());
}
