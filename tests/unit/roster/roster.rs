use super::*;

fn person(name: &str) -> PersonRecord {
    PersonRecord {
        name: name.to_string(),
        ..PersonRecord::default()
    }
}

#[test]
fn json_uses_roster_column_names() {
    let roster = Roster::from_json_str(
        r#"[
            { "Name": "Jane Doe", "Email": "jane@uni.edu", "Photo": "jane.jpg",
              "Research": "Optics; Lasers", "Profile URL": "https://uni.edu/jane" },
            { "Name": "Bo" }
        ]"#,
    )
    .unwrap();
    assert_eq!(roster.len(), 2);
    let jane = roster.get(0).unwrap();
    assert_eq!(jane.email, "jane@uni.edu");
    assert_eq!(jane.photo.as_deref(), Some("jane.jpg"));
    assert_eq!(jane.research, "Optics; Lasers");
    assert_eq!(roster.get(1).unwrap().papers, "");
}

#[test]
fn out_of_range_index_is_not_found() {
    let roster = Roster::new(vec![person("A")]);
    assert!(matches!(roster.get(1), Err(PosterError::NotFound(1))));
    assert!(!roster.is_empty());
    assert!(Roster::default().is_empty());
}

#[test]
fn malformed_json_is_a_validation_error() {
    assert!(matches!(
        Roster::from_json_str(r#"{"Name": "x"}"#),
        Err(PosterError::Validation(_))
    ));
}

#[test]
fn photo_ref_prefers_local_then_remote_then_placeholder() {
    let mut p = person("Jane Doe");
    p.photo = Some("jane.jpg".to_string());
    p.photo_url = Some("https://cdn/jane.png".to_string());
    assert_eq!(p.photo_ref(), "images/jane.jpg");

    p.photo = Some("  ".to_string());
    assert_eq!(p.photo_ref(), "https://cdn/jane.png");

    p.photo_url = None;
    let placeholder = p.photo_ref();
    assert!(placeholder.starts_with("https://via.placeholder.com/420x420?text="));
    assert!(placeholder.contains("Jane"));
}

#[test]
fn profile_ref_falls_back_to_index_page() {
    let mut p = person("A");
    assert_eq!(
        p.profile_ref("https://uni.edu/staff/", 4),
        "https://uni.edu/staff/profile.html?id=4"
    );
    p.profile_url = Some("https://uni.edu/a".to_string());
    assert_eq!(p.profile_ref("ignored/", 4), "https://uni.edu/a");
}

#[test]
fn poster_filename_embeds_sanitized_name() {
    assert_eq!(person("Jane Doe").poster_filename(), "poster_Jane Doe.png");
    assert_eq!(person("a/b\\c").poster_filename(), "poster_a_b_c.png");
    assert_eq!(person("  ").poster_filename(), "poster_staff.png");
}
