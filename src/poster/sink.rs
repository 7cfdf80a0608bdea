use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{foundation::error::PosterResult, render::compositor::PosterArtifact};

/// Destination for downloaded posters.
#[async_trait::async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `artifact` under `filename`; returns where it went.
    async fn save(&self, filename: &str, artifact: &PosterArtifact) -> PosterResult<PathBuf>;
}

/// Writes posters into a directory, creating it on first save.
#[derive(Clone, Debug)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    /// Sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait::async_trait]
impl ArtifactSink for DirSink {
    async fn save(&self, filename: &str, artifact: &PosterArtifact) -> PosterResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, artifact.as_bytes())
            .await
            .with_context(|| format!("write poster '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = artifact.as_bytes().len(), "poster written");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/poster/sink.rs"]
mod tests;
