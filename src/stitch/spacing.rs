//! Step-size spacing between accepted vias
//!
//! ```text
//! Standard                 Star
//!   O   O   O   O            O   O   O   O
//!                              O   O   O
//!   O   O   O   O            O   O   O   O
//!                              O   O   O
//!   O   O   O   O            O   O   O   O
//! ```

use crate::board::Coord;

use super::cells::{CellGrid, RejectReason};

/// Neighbourhood radius in cells for a step; 0 means no spacing
pub fn clear_distance(step: Coord, pitch: Coord) -> usize {
    if step == 0 || pitch <= 0 {
        return 0;
    }
    ((step + pitch) as f64 / pitch as f64).ceil() as usize
}

/// Reject candidates around `(x, y)` within `distance` cells. The
/// neighbourhood is a square, or a diamond when `star` is set.
pub fn clear_via_in_step_size(grid: &mut CellGrid, x: usize, y: usize, distance: usize, star: bool) -> usize {
    let mut cleared = 0;
    let x_lo = x.saturating_sub(distance);
    let x_hi = (x + distance).min(grid.width().saturating_sub(1));

    for x_pos in x_lo..=x_hi {
        let distance_y = if star { distance - x.abs_diff(x_pos) } else { distance };
        let y_lo = y.saturating_sub(distance_y);
        let y_hi = (y + distance_y).min(grid.height().saturating_sub(1));
        for y_pos in y_lo..=y_hi {
            if x_pos == x && y_pos == y {
                continue;
            }
            if grid.reject(x_pos, y_pos, RejectReason::Step) {
                cleared += 1;
            }
        }
    }

    cleared
}

/// Walk candidates in scan order; each survivor suppresses its neighbours,
/// so earlier cells win over later ones. Returns the number suppressed.
pub fn enforce_spacing(grid: &mut CellGrid, step: Coord, pitch: Coord, star: bool) -> usize {
    let distance = clear_distance(step, pitch);
    if distance == 0 {
        return 0;
    }

    let mut cleared = 0;
    for i in 0..grid.width() {
        for j in 0..grid.height() {
            if grid.get(i, j).is_candidate() {
                cleared += clear_via_in_step_size(grid, i, j, distance, star);
            }
        }
    }
    cleared
}
