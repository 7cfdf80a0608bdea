use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "staff_poster_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("images/a.png").unwrap(), "images/a.png");
    assert_eq!(normalize_rel_path("./images\\a.png").unwrap(), "images/a.png");
    assert_eq!(normalize_rel_path("images//a.png").unwrap(), "images/a.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("../a.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[tokio::test]
async fn local_paths_resolve_under_root() {
    let tmp = temp_dir("fetch_local");
    std::fs::create_dir_all(tmp.join("images")).unwrap();
    std::fs::write(tmp.join("images/a.bin"), [1u8, 2, 3]).unwrap();

    let fetcher = DefaultFetcher::new(&tmp);
    assert_eq!(fetcher.root(), tmp.as_path());
    assert_eq!(fetcher.fetch_bytes("images/a.bin").await.unwrap(), vec![1, 2, 3]);
    assert_eq!(
        fetcher.fetch_bytes("file://images/a.bin").await.unwrap(),
        vec![1, 2, 3]
    );
    assert!(fetcher.fetch_bytes("images/missing.bin").await.is_err());
    assert!(fetcher.fetch_bytes("../outside.bin").await.is_err());

    std::fs::remove_dir_all(&tmp).ok();
}

#[tokio::test]
async fn unknown_schemes_are_rejected_without_io() {
    let fetcher = DefaultFetcher::new(".");
    assert!(matches!(
        fetcher.fetch_bytes("ftp://host/a.png").await,
        Err(PosterError::Fetch(_))
    ));
}
