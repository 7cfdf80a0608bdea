use std::path::PathBuf;

/// User-visible message raised by the poster view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Download requested with no poster open.
    NothingToDownload,
    /// Download requested before the high-resolution poster exists; it is saved once ready.
    GenerationPending {
        /// Roster index being generated.
        index: usize,
    },
    /// High-resolution generation failed; the view keeps the preview.
    GenerationFailed {
        /// Roster index that failed.
        index: usize,
        /// Error text.
        message: String,
    },
    /// Poster written.
    Saved {
        /// Where it was written.
        path: PathBuf,
    },
}

/// Delivers [`Notice`]s to the user.
pub trait Notifier: Send + Sync {
    /// Show `notice`.
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::NothingToDownload => tracing::info!("no poster open; nothing to download"),
            Notice::GenerationPending { index } => {
                tracing::info!(index, "poster still generating; it will download when ready")
            }
            Notice::GenerationFailed { index, message } => {
                tracing::warn!(index, %message, "poster generation failed")
            }
            Notice::Saved { path } => tracing::info!(path = %path.display(), "poster saved"),
        }
    }
}
