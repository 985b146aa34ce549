//! Dartboard face painter (seed-independent)

use super::raster::{Raster, Rgba, TRANSPARENT};
use crate::sim::board::{self, Ring, WEDGE_ANGLE, WEDGE_COUNT, WEDGE_ORDER};
use crate::wrap_angle;

const BOARD_RED: Rgba = [206, 42, 46, 255];
const BOARD_GREEN: Rgba = [28, 132, 66, 255];
const SINGLE_DARK: Rgba = [28, 26, 28, 255];
const SINGLE_CREAM: Rgba = [236, 224, 190, 255];
const NUMBER_RING: Rgba = [22, 20, 24, 255];
const RIM: Rgba = [74, 44, 28, 255];
const WIRE: Rgba = [186, 188, 194, 255];
const NUMERAL: Rgba = [245, 245, 240, 255];

/// Half-width of spider wires in board units
const WIRE_HALF_WIDTH: f32 = 0.0035;
/// Outer wooden rim starts here
const RIM_INNER: f32 = 0.985;

const BAND_RADII: [f32; 6] = [
    board::DOUBLE_OUTER,
    board::DOUBLE_INNER,
    board::TREBLE_OUTER,
    board::TREBLE_INNER,
    board::SINGLE_BULL_RADIUS,
    board::DOUBLE_BULL_RADIUS,
];

fn region_color(ring: Ring, wedge: usize) -> Rgba {
    let even = wedge % 2 == 0;
    match ring {
        Ring::DoubleBull => BOARD_RED,
        Ring::SingleBull => BOARD_GREEN,
        Ring::InnerSingle | Ring::OuterSingle => {
            if even {
                SINGLE_DARK
            } else {
                SINGLE_CREAM
            }
        }
        Ring::Treble | Ring::Double => {
            if even {
                BOARD_RED
            } else {
                BOARD_GREEN
            }
        }
        Ring::Miss => NUMBER_RING,
    }
}

fn on_wire(x: f32, y: f32, r: f32) -> bool {
    if BAND_RADII.iter().any(|b| (r - b).abs() < WIRE_HALF_WIDTH) {
        return true;
    }
    if r < board::SINGLE_BULL_RADIUS || r > board::DOUBLE_OUTER {
        return false;
    }
    let from_start = wrap_angle((-y).atan2(x) - board::FIRST_WEDGE_START);
    let into_wedge = from_start % WEDGE_ANGLE;
    into_wedge.min(WEDGE_ANGLE - into_wedge) * r < WIRE_HALF_WIDTH
}

/// Paint the board face into `raster`, overwriting it
pub fn paint_board_face(raster: &mut Raster) {
    let w = raster.width();
    let h = raster.height();
    let size = w.min(h) as f32;

    for py in 0..h {
        for px in 0..w {
            let x = (px as f32 + 0.5) / size * 2.0 - 1.0;
            let y = 1.0 - (py as f32 + 0.5) / size * 2.0;
            let r = x.hypot(y);
            let color = if r > 1.0 {
                TRANSPARENT
            } else if r >= RIM_INNER {
                RIM
            } else if on_wire(x, y, r) {
                WIRE
            } else {
                region_color(Ring::at_radius(r), board::wedge_index(x, y))
            };
            raster.set(px as i32, py as i32, color);
        }
    }

    let scale = ((size / 128.0).round() as i32).max(1);
    for (i, number) in WEDGE_ORDER.iter().enumerate().take(WEDGE_COUNT) {
        let angle = board::wedge_center_angle(i);
        let bx = board::NUMBER_RADIUS * angle.cos();
        let by = board::NUMBER_RADIUS * angle.sin();
        let cx = (bx + 1.0) / 2.0 * size;
        let cy = (1.0 - by) / 2.0 * size;
        raster.draw_number_centered(&number.to_string(), cx, cy, scale, NUMERAL);
    }
}

/// Fresh board face texture of `size` x `size`
pub fn board_face(size: u32) -> Raster {
    let mut raster = Raster::new(size, size);
    paint_board_face(&mut raster);
    raster
}
