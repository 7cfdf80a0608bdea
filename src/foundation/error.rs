/// Convenience result type used across the poster pipeline.
pub type PosterResult<T> = Result<T, PosterError>;

/// Top-level error taxonomy used by poster APIs.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// Invalid roster data, configuration, or caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// No person record exists at the requested roster index.
    #[error("no person record at index {0}")]
    NotFound(usize),

    /// An asset could not be fetched or decoded.
    ///
    /// The asset loader absorbs these and substitutes a placeholder; they never reach the
    /// orchestrator.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The poster layout could not be produced, rasterized, or encoded.
    #[error("render error: {0}")]
    Render(String),

    /// A bounded wait elapsed.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`PosterError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Owned copy of an error observed by several waiters of one shared result.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Self::Validation(m) => Self::Validation(m.clone()),
            Self::NotFound(i) => Self::NotFound(*i),
            Self::Fetch(m) => Self::Fetch(m.clone()),
            Self::Render(m) => Self::Render(m.clone()),
            Self::Timeout(ms) => Self::Timeout(*ms),
            Self::Other(e) => Self::Other(anyhow::anyhow!("{e:#}")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
