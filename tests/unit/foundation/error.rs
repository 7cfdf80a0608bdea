use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PosterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PosterError::fetch("x").to_string().contains("fetch error:"));
    assert!(PosterError::render("x").to_string().contains("render error:"));
    assert_eq!(
        PosterError::NotFound(7).to_string(),
        "no person record at index 7"
    );
    assert_eq!(PosterError::Timeout(250).to_string(), "timed out after 250 ms");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PosterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn duplicate_keeps_variant_and_message() {
    assert!(matches!(
        PosterError::Timeout(9).duplicate(),
        PosterError::Timeout(9)
    ));
    let other = PosterError::Other(anyhow::anyhow!("disk full"));
    assert_eq!(other.duplicate().to_string(), "disk full");
}
