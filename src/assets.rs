//! Fire-and-forget thumbnail loading.
//!
//! A load runs on its own thread. When it settles the loader records the
//! decoded image (or the failure) in the [`AssetStore`] and sends a redraw
//! signal. It never touches the scene, selection or history; the next
//! redraw picks the image up from the store.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::thread;

use egui::ColorImage;
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use log::{debug, warn};
use parking_lot::Mutex;

use crate::error::AssetError;
use crate::render::AssetLookup;
use crate::scene::Scene;

#[derive(Debug, Clone)]
pub enum AssetState {
    Loading,
    Ready(Arc<ColorImage>),
    /// The placeholder is shown for good
    Failed,
}

/// Thread-safe store of thumbnail load states, keyed by URL
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    inner: Arc<Mutex<HashMap<String, AssetState>>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &str) -> Option<AssetState> {
        self.inner.lock().get(key).cloned()
    }

    pub fn image(&self, key: &str) -> Option<Arc<ColorImage>> {
        match self.inner.lock().get(key) {
            Some(AssetState::Ready(image)) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    /// Mark `key` as loading. Returns false when it was already known.
    fn begin(&self, key: &str) -> bool {
        let mut map = self.inner.lock();
        if map.contains_key(key) {
            return false;
        }
        map.insert(key.to_owned(), AssetState::Loading);
        true
    }

    fn settle(&self, key: &str, state: AssetState) {
        self.inner.lock().insert(key.to_owned(), state);
    }
}

impl AssetLookup for AssetStore {
    fn is_ready(&self, key: &str) -> bool {
        matches!(self.inner.lock().get(key), Some(AssetState::Ready(_)))
    }
}

/// Source of thumbnail bytes, supplied by the host application
pub trait ThumbnailFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError>;
}

/// Reads thumbnails from the local filesystem; `file://` prefixes are accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl ThumbnailFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        fs::read(path).map_err(|err| AssetError::Fetch {
            url: url.to_owned(),
            reason: err.to_string(),
        })
    }
}

/// Receiving end of the "asset settled, please redraw" channel
pub struct RedrawSignal {
    rx: UnboundedReceiver<String>,
}

impl RedrawSignal {
    /// Drain pending signals. True when at least one asset settled since
    /// the last call.
    pub fn take(&mut self) -> bool {
        let mut any = false;
        while let Ok(key) = self.rx.try_recv() {
            debug!("Asset settled: {}", key);
            any = true;
        }
        any
    }

    /// Wait for the next asset to settle
    pub async fn next(&mut self) -> Option<String> {
        self.rx.next().await
    }
}

type NotifyFn = Arc<dyn Fn() + Send + Sync>;

/// Starts thumbnail loads in the background
#[derive(Clone)]
pub struct ThumbnailLoader {
    store: AssetStore,
    fetcher: Arc<dyn ThumbnailFetcher>,
    redraw: UnboundedSender<String>,
    notify: Option<NotifyFn>,
}

impl ThumbnailLoader {
    pub fn new(store: AssetStore, fetcher: impl ThumbnailFetcher) -> (Self, RedrawSignal) {
        let (tx, rx) = unbounded();
        let loader = Self {
            store,
            fetcher: Arc::new(fetcher),
            redraw: tx,
            notify: None,
        };
        (loader, RedrawSignal { rx })
    }

    /// Also call `notify` whenever an asset settles, e.g. to wake the UI loop.
    pub fn with_notify(mut self, notify: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify = Some(Arc::new(notify));
        self
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Start loading `url` unless it is already loading or settled.
    pub fn request(&self, url: &str) {
        if !self.store.begin(url) {
            return;
        }

        let url = url.to_owned();
        let store = self.store.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let redraw = self.redraw.clone();
        let notify = self.notify.clone();
        thread::spawn(move || {
            let state = match load(fetcher.as_ref(), &url) {
                Ok(image) => AssetState::Ready(Arc::new(image)),
                Err(err) => {
                    warn!("{}", err);
                    AssetState::Failed
                }
            };
            store.settle(&url, state);
            if redraw.unbounded_send(url).is_err() {
                debug!("Redraw receiver dropped");
            }
            if let Some(notify) = notify {
                notify();
            }
        });
    }

    /// Request the thumbnail of every placed object that has one.
    pub fn request_scene(&self, scene: &Scene) {
        for url in scene
            .placed_objects
            .iter()
            .filter_map(|object| object.thumbnail_url())
        {
            self.request(url);
        }
    }
}

fn load(fetcher: &dyn ThumbnailFetcher, url: &str) -> Result<ColorImage, AssetError> {
    let bytes = fetcher.fetch(url)?;
    let image = image::load_from_memory(&bytes)
        .map_err(|source| AssetError::Decode {
            url: url.to_owned(),
            source,
        })?
        .to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct MemoryFetcher(HashMap<String, Vec<u8>>);

    impl ThumbnailFetcher for MemoryFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
            self.0.get(url).cloned().ok_or_else(|| AssetError::Fetch {
                url: url.to_owned(),
                reason: "not found".into(),
            })
        }
    }

    /// Serves one image, but only after the test opens the gate
    struct GatedFetcher {
        gate: Mutex<std::sync::mpsc::Receiver<()>>,
        bytes: Vec<u8>,
    }

    impl ThumbnailFetcher for GatedFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
            self.gate.lock().recv().map_err(|_| AssetError::Fetch {
                url: url.to_owned(),
                reason: "gate closed".into(),
            })?;
            Ok(self.bytes.clone())
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_load_signals_redraw_and_stores_image() {
        let (open, gate) = std::sync::mpsc::channel();
        let fetcher = GatedFetcher {
            gate: Mutex::new(gate),
            bytes: png_bytes(),
        };
        let store = AssetStore::new();
        let (loader, mut signal) = ThumbnailLoader::new(store.clone(), fetcher);

        loader.request("bench.png");
        assert!(matches!(store.state("bench.png"), Some(AssetState::Loading)));
        assert!(!store.is_ready("bench.png"));
        assert!(store.image("bench.png").is_none());
        assert!(!signal.take());

        open.send(()).unwrap();
        let settled = futures::executor::block_on(signal.next());
        assert_eq!(settled.as_deref(), Some("bench.png"));
        assert!(store.is_ready("bench.png"));
        assert_eq!(store.image("bench.png").unwrap().size, [2, 3]);
    }

    #[test]
    fn test_failed_load_keeps_placeholder() {
        let store = AssetStore::new();
        let (loader, mut signal) = ThumbnailLoader::new(store.clone(), MemoryFetcher(HashMap::new()));

        loader.request("missing.png");
        futures::executor::block_on(signal.next());
        assert!(!store.is_ready("missing.png"));
        assert!(matches!(store.state("missing.png"), Some(AssetState::Failed)));
    }

    #[test]
    fn test_duplicate_requests_load_once() {
        let mut files = HashMap::new();
        files.insert("a.png".to_owned(), png_bytes());
        let store = AssetStore::new();
        let (loader, mut signal) = ThumbnailLoader::new(store.clone(), MemoryFetcher(files));

        loader.request("a.png");
        loader.request("a.png");
        futures::executor::block_on(signal.next());
        assert!(!signal.take());
    }
}
