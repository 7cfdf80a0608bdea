use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::{
    assets::{
        decode::{ImageHandle, decode_image},
        fetch::ImageFetcher,
    },
    foundation::{
        config::PosterConfig,
        core::Rgba8,
        error::{PosterError, PosterResult},
    },
};

type SharedImage = Shared<BoxFuture<'static, ImageHandle>>;

const BUILTIN_PLACEHOLDER_PX: u32 = 420;
const BUILTIN_PLACEHOLDER_COLOR: Rgba8 = Rgba8::opaque(0xdd, 0xdd, 0xdd);

/// Memoizing image loader.
///
/// Each distinct URL is fetched at most once per loader: the first request reserves a shared
/// pending entry before anything is awaited, and every later request for the same URL (pending
/// or finished) receives a clone of that entry. Entries are never evicted.
///
/// The futures it hands out never fail. A failed fetch or decode resolves to the placeholder
/// image, itself a memo entry, and if that cannot be loaded either, to a built-in solid
/// placeholder.
pub struct AssetLoader {
    memo: Arc<Memo>,
}

struct Memo {
    fetcher: Arc<dyn ImageFetcher>,
    placeholder_url: String,
    timeout: Duration,
    entries: Mutex<HashMap<String, SharedImage>>,
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("placeholder_url", &self.memo.placeholder_url)
            .field("timeout", &self.memo.timeout)
            .field("entries", &self.memo.entries.lock().len())
            .finish()
    }
}

impl AssetLoader {
    /// Build a loader around `fetcher`.
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        placeholder_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            memo: Arc::new(Memo {
                fetcher,
                placeholder_url: placeholder_url.into(),
                timeout,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Build a loader using the placeholder and fetch timeout from `cfg`.
    pub fn from_config(fetcher: Arc<dyn ImageFetcher>, cfg: &PosterConfig) -> Self {
        Self::new(fetcher, cfg.placeholder_url.clone(), cfg.fetch_timeout())
    }

    /// URL substituted for empty references and failed loads.
    pub fn placeholder_url(&self) -> &str {
        &self.memo.placeholder_url
    }

    /// Request the image at `url`.
    ///
    /// The cache slot is reserved synchronously, so calling this twice without awaiting still
    /// starts only one fetch.
    pub fn fetch_image(
        &self,
        url: &str,
    ) -> impl Future<Output = ImageHandle> + Send + 'static + use<> {
        let key = if url.trim().is_empty() {
            self.memo.placeholder_url.clone()
        } else {
            url.to_string()
        };
        self.memo.get_or_reserve(key)
    }

    /// Whether `url` already has an entry, pending or resolved.
    pub fn contains(&self, url: &str) -> bool {
        self.memo.entries.lock().contains_key(url)
    }

    /// Number of distinct URLs requested so far.
    pub fn len(&self) -> usize {
        self.memo.entries.lock().len()
    }

    /// Whether nothing has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.memo.entries.lock().is_empty()
    }
}

impl Memo {
    fn get_or_reserve(self: &Arc<Self>, key: String) -> SharedImage {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            tracing::debug!(url = %key, "image cache hit");
            return existing.clone();
        }

        tracing::debug!(url = %key, "image cache miss");
        let pending = if key == self.placeholder_url {
            load_placeholder(self.fetcher.clone(), key.clone(), self.timeout).boxed()
        } else {
            load_with_fallback(self.clone(), key.clone()).boxed()
        }
        .shared();
        entries.insert(key, pending.clone());
        pending
    }
}

async fn load_with_fallback(memo: Arc<Memo>, url: String) -> ImageHandle {
    match fetch_and_decode(memo.fetcher.as_ref(), &url, memo.timeout).await {
        Ok(img) => img,
        Err(err) => {
            tracing::warn!(%url, error = %err, "image load failed; using placeholder");
            let placeholder = memo.get_or_reserve(memo.placeholder_url.clone());
            placeholder.await
        }
    }
}

async fn load_placeholder(
    fetcher: Arc<dyn ImageFetcher>,
    url: String,
    timeout: Duration,
) -> ImageHandle {
    match fetch_and_decode(fetcher.as_ref(), &url, timeout).await {
        Ok(img) => img.into_placeholder(),
        Err(err) => {
            tracing::warn!(%url, error = %err, "placeholder load failed");
            ImageHandle::solid(
                BUILTIN_PLACEHOLDER_PX,
                BUILTIN_PLACEHOLDER_PX,
                BUILTIN_PLACEHOLDER_COLOR,
            )
        }
    }
}

async fn fetch_and_decode(
    fetcher: &dyn ImageFetcher,
    url: &str,
    timeout: Duration,
) -> PosterResult<ImageHandle> {
    let bytes = tokio::time::timeout(timeout, fetcher.fetch_bytes(url))
        .await
        .map_err(|_| PosterError::Timeout(timeout.as_millis() as u64))??;
    decode_image(&bytes).map_err(|e| PosterError::fetch(format!("decode '{url}': {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
