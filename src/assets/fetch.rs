use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{PosterError, PosterResult};

/// Transport seam: turn a URL string into encoded image bytes.
///
/// Implementations report failures; substituting a placeholder is the loader's job.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw bytes addressed by `url`.
    async fn fetch_bytes(&self, url: &str) -> PosterResult<Vec<u8>>;
}

/// Fetcher for `http(s)://` URLs and paths relative to a local asset root.
pub struct DefaultFetcher {
    client: reqwest::Client,
    root: PathBuf,
}

impl DefaultFetcher {
    /// Resolve relative references against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            root: root.into(),
        }
    }

    /// Root directory for relative references.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn fetch_http(&self, url: &str) -> PosterResult<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PosterError::fetch(format!("GET {url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PosterError::fetch(format!("GET {url}: status {status}")));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PosterError::fetch(format!("read body of {url}: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_local(&self, source: &str) -> PosterResult<Vec<u8>> {
        let norm = normalize_rel_path(source)?;
        let path = self.root.join(Path::new(&norm));
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(PosterError::from)
    }
}

#[async_trait::async_trait]
impl ImageFetcher for DefaultFetcher {
    async fn fetch_bytes(&self, url: &str) -> PosterResult<Vec<u8>> {
        let lower = url.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            self.fetch_http(url).await
        } else if let Some(rest) = url.strip_prefix("file:") {
            self.fetch_local(rest.trim_start_matches("//")).await
        } else if lower.contains("://") {
            Err(PosterError::fetch(format!("unsupported url scheme in '{url}'")))
        } else {
            self.fetch_local(url).await
        }
    }
}

/// Normalize and validate asset-root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PosterResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PosterError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(PosterError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PosterError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PosterError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
