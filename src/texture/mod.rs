//! Procedural pixel synthesis
//!
//! Pure CPU rasters; uploading them is the scene graph's job.

pub mod background;
pub mod board_face;
pub mod raster;

pub use background::{LayerKind, layer_seed, paint_layer, render_layer};
pub use board_face::{board_face, paint_board_face};
pub use raster::{Raster, Rgba};

use crate::consts::BOARD_TEXTURE_SIZE;

/// Board face plus the five background layers, rewritten in place
#[derive(Debug, Clone)]
pub struct TextureCache {
    board: Raster,
    layers: Vec<(LayerKind, Raster)>,
    seed: Option<u32>,
}

impl TextureCache {
    /// Allocate every raster once; layers stay blank until a seed arrives
    pub fn new(layer_size: u32) -> Self {
        Self {
            board: board_face(BOARD_TEXTURE_SIZE),
            layers: LayerKind::ALL
                .iter()
                .map(|&kind| (kind, Raster::new(layer_size, layer_size)))
                .collect(),
            seed: None,
        }
    }

    pub fn board(&self) -> &Raster {
        &self.board
    }

    pub fn layer(&self, kind: LayerKind) -> &Raster {
        let index = kind.id() as usize - 1;
        &self.layers[index].1
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerKind, &Raster)> {
        self.layers.iter().map(|(kind, raster)| (*kind, raster))
    }

    pub fn seed(&self) -> Option<u32> {
        self.seed
    }

    /// Repaint the layers if `seed` differs from the current one.
    /// Returns true when pixels changed.
    pub fn apply_seed(&mut self, seed: u32) -> bool {
        if self.seed == Some(seed) {
            return false;
        }
        for (kind, raster) in &mut self.layers {
            paint_layer(*kind, seed, raster);
        }
        self.seed = Some(seed);
        log::info!("Background re-rastered for seed {seed:#010x}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_seed_only_on_change() {
        let mut cache = TextureCache::new(32);
        assert_eq!(cache.seed(), None);
        assert!(cache.apply_seed(7));
        assert!(!cache.apply_seed(7));
        assert!(cache.apply_seed(8));
        assert_eq!(cache.seed(), Some(8));
    }

    #[test]
    fn test_cache_matches_fresh_layers() {
        let mut cache = TextureCache::new(32);
        cache.apply_seed(1);
        cache.apply_seed(42);
        for kind in LayerKind::ALL {
            assert_eq!(cache.layer(kind), &render_layer(kind, 42, 32));
        }
        assert_eq!(cache.layers().count(), 5);
        assert_eq!(cache.board().width(), BOARD_TEXTURE_SIZE);
    }
}
