//! Mapping between board coordinates and placement-grid indices

use crate::board::{Coord, Point, Rect};

/// Inclusive index window along both axes, already clipped to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexWindow {
    pub x: (usize, usize),
    pub y: (usize, usize),
}

impl IndexWindow {
    /// Cells in column-outer order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (y0, y1) = self.y;
        (self.x.0..=self.x.1).flat_map(move |i| (y0..=y1).map(move |j| (i, j)))
    }
}

/// Coordinate frame of the placement grid
///
/// Cell `(i, j)` sits at `origin + (i, j) * pitch`. Converting a continuous
/// span to indices rounds outward (floor on the low side, ceil on the high
/// side) so an obstacle never misses a cell its influence touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMapper {
    pub origin: Point,
    pub pitch: Coord,
    pub width_cells: usize,
    pub height_cells: usize,
}

impl GridMapper {
    /// Frame covering `bounds`; `pitch` must be positive
    pub fn new(bounds: &Rect, pitch: Coord) -> Self {
        debug_assert!(pitch > 0, "grid pitch must be positive");
        let cells = |extent: Coord| (extent.max(0) as f64 / pitch as f64).ceil() as usize + 1;
        Self {
            origin: bounds.origin,
            pitch,
            width_cells: cells(bounds.width),
            height_cells: cells(bounds.height),
        }
    }

    pub fn cell_position(&self, i: usize, j: usize) -> Point {
        Point::new(
            self.origin.x + i as Coord * self.pitch,
            self.origin.y + j as Coord * self.pitch,
        )
    }

    fn low_index(&self, coord: Coord, origin: Coord) -> i64 {
        ((coord - origin) as f64 / self.pitch as f64).floor() as i64
    }

    fn high_index(&self, coord: Coord, origin: Coord) -> i64 {
        ((coord - origin) as f64 / self.pitch as f64).ceil() as i64
    }

    fn clip(lo: i64, hi: i64, len: usize) -> Option<(usize, usize)> {
        let lo = lo.max(0);
        let hi = hi.min(len as i64 - 1);
        (len > 0 && lo <= hi).then_some((lo as usize, hi as usize))
    }

    /// Unclipped inclusive x range for `[lo, hi]`
    pub fn x_range(&self, lo: Coord, hi: Coord) -> (i64, i64) {
        (self.low_index(lo, self.origin.x), self.high_index(hi, self.origin.x))
    }

    /// Unclipped inclusive y range for `[lo, hi]`
    pub fn y_range(&self, lo: Coord, hi: Coord) -> (i64, i64) {
        (self.low_index(lo, self.origin.y), self.high_index(hi, self.origin.y))
    }

    /// Window of cells touched by the span `[min, max]`; `None` when it lies
    /// completely off the grid
    pub fn window(&self, min: Point, max: Point) -> Option<IndexWindow> {
        let (x0, x1) = self.x_range(min.x, max.x);
        let (y0, y1) = self.y_range(min.y, max.y);
        Some(IndexWindow {
            x: Self::clip(x0, x1, self.width_cells)?,
            y: Self::clip(y0, y1, self.height_cells)?,
        })
    }

    /// Window of cells within `radius` of `center`
    pub fn window_around(&self, center: Point, radius: Coord) -> Option<IndexWindow> {
        self.window(center.offset(-radius, -radius), center.offset(radius, radius))
    }
}
