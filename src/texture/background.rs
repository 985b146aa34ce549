//! Seeded parallax background layers
//!
//! Each layer draws with its own generator derived from (seed, layer id), so
//! a layer's pixels depend only on that pair.

use std::f32::consts::TAU;

use super::raster::{Raster, Rgba, TRANSPARENT};
use crate::sim::rng::SeededRng;

/// The five background layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Starfield = 1,
    Nebula = 2,
    Ground = 3,
    Banner = 4,
    Vignette = 5,
}

impl LayerKind {
    pub const ALL: [LayerKind; 5] = [
        LayerKind::Starfield,
        LayerKind::Nebula,
        LayerKind::Ground,
        LayerKind::Banner,
        LayerKind::Vignette,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(LayerKind::Starfield),
            2 => Some(LayerKind::Nebula),
            3 => Some(LayerKind::Ground),
            4 => Some(LayerKind::Banner),
            5 => Some(LayerKind::Vignette),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// How far the layer slides relative to the reticle
    pub fn parallax_speed(self) -> f32 {
        match self {
            LayerKind::Starfield => 0.02,
            LayerKind::Nebula => 0.05,
            LayerKind::Ground => 0.09,
            LayerKind::Banner => 0.14,
            LayerKind::Vignette => 0.0,
        }
    }

    /// Scene depth (further layers are more negative)
    pub fn depth(self) -> f32 {
        -6.0 + self.id() as f32
    }
}

/// Generator seed for one layer
pub fn layer_seed(seed: u32, kind: LayerKind) -> u32 {
    seed ^ (kind.id() as u32).wrapping_mul(0x9E37_79B9)
}

const CARNIVAL: [Rgba; 5] = [
    [232, 62, 72, 255],
    [250, 196, 62, 255],
    [60, 170, 220, 255],
    [140, 220, 110, 255],
    [245, 245, 240, 255],
];

const NEBULA: [Rgba; 4] = [
    [200, 60, 180, 255],
    [60, 180, 200, 255],
    [240, 130, 60, 255],
    [120, 90, 230, 255],
];

fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let ch = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8;
    [ch(0), ch(1), ch(2), ch(3)]
}

fn with_alpha(c: Rgba, alpha: u8) -> Rgba {
    [c[0], c[1], c[2], alpha]
}

fn paint_starfield(raster: &mut Raster, rng: &mut SeededRng) {
    let (w, h) = (raster.width() as i32, raster.height() as i32);
    let top = [10, 8, 30, 255];
    let bottom = [52, 18, 70, 255];
    for y in 0..h {
        let color = lerp_color(top, bottom, y as f32 / h as f32);
        for x in 0..w {
            raster.set(x, y, color);
        }
    }

    let area_scale = (w * h) as f32 / (256.0 * 256.0);
    let count = (rng.int_in_range(140, 220) as f32 * area_scale).round() as i32;
    let px = w as f32 / 256.0;
    for _ in 0..count {
        let x = rng.uniform(0.0, w as f32);
        let y = rng.uniform(0.0, h as f32 * 0.85);
        let radius = rng.uniform(0.4, 1.5) * px;
        let brightness = rng.int_in_range(150, 255) as u8;
        raster.fill_circle(x, y, radius.max(0.5), [brightness, brightness, 255, 255], 0.6);
    }
}

fn paint_nebula(raster: &mut Raster, rng: &mut SeededRng) {
    raster.clear(TRANSPARENT);
    let (w, h) = (raster.width() as f32, raster.height() as f32);
    let blobs = rng.int_in_range(5, 9);
    for _ in 0..blobs {
        let cx = rng.uniform(0.0, w);
        let cy = rng.uniform(0.0, h * 0.7);
        let radius = rng.uniform(0.12, 0.35) * w;
        let color = NEBULA[rng.int_in_range(0, NEBULA.len() as i32 - 1) as usize];
        let alpha = rng.int_in_range(40, 90) as u8;
        raster.fill_circle(cx, cy, radius, with_alpha(color, alpha), 1.0);
    }
}

fn paint_ground(raster: &mut Raster, rng: &mut SeededRng) {
    raster.clear(TRANSPARENT);
    let (w, h) = (raster.width() as i32, raster.height() as i32);
    let px = w as f32 / 256.0;

    let horizon = h as f32 * rng.uniform(0.68, 0.74);
    let waves: Vec<(f32, f32, f32)> = (0..3)
        .map(|_| {
            (
                rng.uniform(2.0, 10.0) * px,
                rng.uniform(1.0, 3.5),
                rng.uniform(0.0, TAU),
            )
        })
        .collect();

    // Tents sit behind the hill line
    let tents = rng.int_in_range(2, 4);
    for _ in 0..tents {
        let cx = rng.uniform(0.1, 0.9) * w as f32;
        let half = rng.uniform(0.06, 0.1) * w as f32;
        let height = rng.uniform(0.15, 0.25) * h as f32;
        let stripe = (rng.uniform(4.0, 8.0) * px).max(1.0);
        let accent = CARNIVAL[rng.int_in_range(0, 2) as usize];
        let base = horizon + 4.0 * px;
        let left = cx - half;
        raster.fill_triangle_with((cx, base - height), (cx + half, base), (left, base), |x, _| {
            if (((x as f32 - left) / stripe) as i32) % 2 == 0 {
                accent
            } else {
                CARNIVAL[4]
            }
        });
    }

    let hill = [22, 14, 34, 255];
    let deep = [8, 4, 14, 255];
    for x in 0..w {
        let u = x as f32 / w as f32 * TAU;
        let offset: f32 = waves.iter().map(|(amp, freq, phase)| amp * (u * freq + phase).sin()).sum();
        let top = (horizon + offset).max(0.0) as i32;
        for y in top..h {
            let t = (y - top) as f32 / (h - top).max(1) as f32;
            raster.set(x, y, lerp_color(hill, deep, t));
        }
    }
}

fn paint_banner(raster: &mut Raster, rng: &mut SeededRng) {
    raster.clear(TRANSPARENT);
    let (w, h) = (raster.width() as f32, raster.height() as f32);
    let px = w / 256.0;

    let y0 = rng.uniform(0.08, 0.14) * h;
    let y1 = rng.uniform(0.08, 0.14) * h;
    let sag = rng.uniform(0.05, 0.1) * h;
    let rope_y = |u: f32| y0 + (y1 - y0) * u + sag * 4.0 * u * (1.0 - u);

    let rope = [60, 44, 36, 255];
    let thickness = px.max(1.0);
    for x in 0..raster.width() as i32 {
        let y = rope_y(x as f32 / w);
        raster.fill_rect(x, y as i32, 1, thickness as i32, rope);
    }

    let flags = rng.int_in_range(9, 14);
    let slot = w / flags as f32;
    for i in 0..flags {
        let u = (i as f32 + 0.5) / flags as f32;
        let cx = u * w;
        let top = rope_y(u);
        let half = slot * 0.4;
        let drop = rng.uniform(0.06, 0.09) * h;
        let color = CARNIVAL[rng.int_in_range(0, CARNIVAL.len() as i32 - 1) as usize];
        raster.fill_triangle((cx - half, top), (cx + half, top), (cx, top + drop), color);
    }
}

fn paint_vignette(raster: &mut Raster, rng: &mut SeededRng) {
    let (w, h) = (raster.width() as i32, raster.height() as i32);
    let max_alpha = rng.uniform(170.0, 220.0);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let corner = (cx * cx + cy * cy).sqrt();
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt() / corner;
            let grain = rng.int_in_range(0, 18) as f32;
            let alpha = (d.powf(2.2) * max_alpha + grain).min(255.0) as u8;
            raster.set(x, y, [5, 2, 12, alpha]);
        }
    }
}

/// Repaint one layer in place
pub fn paint_layer(kind: LayerKind, seed: u32, raster: &mut Raster) {
    let mut rng = SeededRng::new(layer_seed(seed, kind));
    match kind {
        LayerKind::Starfield => paint_starfield(raster, &mut rng),
        LayerKind::Nebula => paint_nebula(raster, &mut rng),
        LayerKind::Ground => paint_ground(raster, &mut rng),
        LayerKind::Banner => paint_banner(raster, &mut rng),
        LayerKind::Vignette => paint_vignette(raster, &mut rng),
    }
}

/// Fresh layer raster of `size` x `size`
pub fn render_layer(kind: LayerKind, seed: u32, size: u32) -> Raster {
    let mut raster = Raster::new(size, size);
    paint_layer(kind, seed, &mut raster);
    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_layer_ids_round_trip() {
        for kind in LayerKind::ALL {
            assert_eq!(LayerKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(LayerKind::from_id(0), None);
        assert_eq!(LayerKind::from_id(6), None);
    }

    #[test]
    fn test_seed_changes_every_layer() {
        for kind in LayerKind::ALL {
            assert_ne!(render_layer(kind, 1, 64), render_layer(kind, 2, 64), "{kind:?}");
        }
    }

    #[test]
    fn test_in_place_repaint_matches_fresh() {
        let mut raster = render_layer(LayerKind::Banner, 99, 64);
        for kind in LayerKind::ALL {
            paint_layer(kind, 1234, &mut raster);
            assert_eq!(raster, render_layer(kind, 1234, 64), "{kind:?}");
        }
    }

    #[test]
    fn test_layers_are_distinct() {
        let a = render_layer(LayerKind::Nebula, 5, 64);
        let b = render_layer(LayerKind::Banner, 5, 64);
        assert_ne!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_layer_is_deterministic(id in 1u8..=5, seed in any::<u32>()) {
            let kind = LayerKind::from_id(id).unwrap();
            let a = render_layer(kind, seed, 48);
            let b = render_layer(kind, seed, 48);
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }
    }
}
