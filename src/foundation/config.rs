use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::foundation::{
    core::Rgba8,
    error::{PosterError, PosterResult},
};

/// Fallback image used whenever a reference is empty or cannot be loaded.
pub const DEFAULT_PLACEHOLDER_URL: &str = "https://via.placeholder.com/420x420?text=No+Image";

/// Runtime configuration of the poster pipeline.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    /// Directory that relative image references (such as `images/<Photo>`) resolve against.
    pub asset_root: PathBuf,
    /// Image substituted for empty references and failed loads.
    pub placeholder_url: String,
    /// Base URL of the QR rendering endpoint.
    pub qr_endpoint: String,
    /// Base used to derive a profile URL for records without one.
    pub profile_base_url: String,
    /// Footer line of the high-resolution poster.
    pub footer_text: String,
    /// Header band and heading colour, `#rrggbb`.
    pub accent_color: String,
    /// TTF/OTF font used for all text. Probed from system locations when unset.
    pub font_path: Option<PathBuf>,
    /// Upper bound for one image fetch before falling back to the placeholder.
    pub fetch_timeout_ms: u64,
    /// Upper bound for one high-resolution generation.
    pub render_timeout_ms: u64,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            qr_endpoint: "https://chart.googleapis.com/chart".to_string(),
            profile_base_url: "./".to_string(),
            footer_text: "Generated by Academy Staff Directory".to_string(),
            accent_color: "#0b4f6c".to_string(),
            font_path: None,
            fetch_timeout_ms: 10_000,
            render_timeout_ms: 30_000,
        }
    }
}

impl PosterConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> PosterResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| PosterError::validation(format!("invalid poster config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: &Path) -> PosterResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read poster config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Check field invariants.
    pub fn validate(&self) -> PosterResult<()> {
        if self.fetch_timeout_ms == 0 {
            return Err(PosterError::validation("fetch_timeout_ms must be > 0"));
        }
        if self.render_timeout_ms == 0 {
            return Err(PosterError::validation("render_timeout_ms must be > 0"));
        }
        if self.placeholder_url.trim().is_empty() {
            return Err(PosterError::validation("placeholder_url must be non-empty"));
        }
        if self.qr_endpoint.trim().is_empty() {
            return Err(PosterError::validation("qr_endpoint must be non-empty"));
        }
        self.accent()?;
        Ok(())
    }

    /// Parsed [`PosterConfig::accent_color`].
    pub fn accent(&self) -> PosterResult<Rgba8> {
        Rgba8::from_hex(&self.accent_color)
    }

    /// [`PosterConfig::fetch_timeout_ms`] as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// [`PosterConfig::render_timeout_ms`] as a [`Duration`].
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
