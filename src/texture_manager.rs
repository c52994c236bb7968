use std::collections::HashMap;

use egui::{Context, TextureHandle, TextureId, TextureOptions};
use log::debug;

use crate::assets::AssetStore;

/// Uploads loaded thumbnails to the GPU on first use and keeps the
/// handles around, evicting the least recently used ones past capacity.
pub struct TextureManager {
    /// Uploaded textures by asset key
    texture_cache: HashMap<String, TextureHandle>,
    /// Frame in which each texture was last drawn
    last_used: HashMap<String, u64>,
    current_frame: u64,
    max_cache_size: usize,
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Texture for `key`, uploading it if the asset has finished loading.
    pub fn texture_for(&mut self, ctx: &Context, assets: &AssetStore, key: &str) -> Option<TextureId> {
        if let Some(handle) = self.texture_cache.get(key) {
            self.last_used.insert(key.to_owned(), self.current_frame);
            return Some(handle.id());
        }

        let image = assets.image(key)?;
        self.prune_cache_if_needed();

        let handle = ctx.load_texture(format!("thumbnail:{key}"), (*image).clone(), TextureOptions::LINEAR);
        let id = handle.id();
        self.texture_cache.insert(key.to_owned(), handle);
        self.last_used.insert(key.to_owned(), self.current_frame);
        debug!("Uploaded thumbnail texture {}", key);
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.texture_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texture_cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    fn prune_cache_if_needed(&mut self) {
        while self.texture_cache.len() >= self.max_cache_size {
            let Some(oldest) = self
                .last_used
                .iter()
                .min_by_key(|(_, frame)| **frame)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            self.texture_cache.remove(&oldest);
            self.last_used.remove(&oldest);
        }
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new(128)
    }
}
