use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BufferError::allocation("x")
            .to_string()
            .contains("allocation error:")
    );
    assert!(
        BufferError::corrupt("x")
            .to_string()
            .contains("corrupt data:")
    );
    assert!(BufferError::lock("x").to_string().contains("lock error:"));
    assert_eq!(
        BufferError::missing_key("planeData0").to_string(),
        "missing key 'planeData0'"
    );
    assert_eq!(
        BufferError::MissingPlaneData { plane: 2 }.to_string(),
        "missing data for plane 2"
    );
}

#[test]
fn format_errors_pass_through_verbatim() {
    let src = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
    let expected = src.to_string();
    let err = BufferError::from(src);
    assert!(matches!(err, BufferError::Format(_)));
    assert_eq!(err.to_string(), expected);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BufferError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
