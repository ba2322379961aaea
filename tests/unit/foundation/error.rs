use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SlideError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        SlideError::invalid_image("x")
            .to_string()
            .contains("invalid image:")
    );
    assert!(
        SlideError::rasterize("x")
            .to_string()
            .contains("rasterize error:")
    );
    assert!(
        SlideError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(
        SlideError::cleanup("x")
            .to_string()
            .contains("cleanup error:")
    );
    assert!(
        SlideError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SlideError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
