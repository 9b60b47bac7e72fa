//! Host board interface consumed by the stitching engine
//!
//! The engine never touches board storage directly. Everything it needs,
//! from feature iteration to hit tests to mutation, goes through
//! [`BoardRegion`], so a different host model can be plugged in.

use super::types::{Coord, Drawing, NewVia, Pad, Point, Rect, Track, Via, ViaId, Zone};
use thiserror::Error;

/// Failure of a single geometric primitive on one board feature
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// The feature's geometry cannot be tested (zero or negative size, etc.)
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The host does not implement this test for the feature
    #[error("unsupported hit test: {0}")]
    Unsupported(String),
}

pub trait BoardRegion {
    /// Bounding box of every item on the board
    fn bounding_box(&self) -> Rect;

    /// True when a net with this exact name exists
    fn has_net(&self, name: &str) -> bool;

    fn zones(&self) -> &[Zone];
    fn pads(&self) -> &[Pad];
    fn tracks(&self) -> &[Track];
    fn drawings(&self) -> &[Drawing];
    fn vias(&self) -> &[Via];

    /// Point lies in poured copper of the zone
    fn zone_hit_filled(&self, zone: &Zone, p: Point) -> bool;

    /// Point lies within `accuracy` of the zone outline
    fn zone_hit_edge(&self, zone: &Zone, p: Point, accuracy: Coord) -> bool;

    /// Whether [`BoardRegion::zone_hit_inside`] is available on this host
    fn supports_zone_inside_test(&self) -> bool {
        true
    }

    /// Point lies inside the zone outline, filled or not
    fn zone_hit_inside(&self, zone: &Zone, p: Point) -> bool;

    /// Pad copper touches the rectangle
    fn pad_hits_rect(&self, pad: &Pad, rect: &Rect) -> Result<bool, GeometryError>;

    /// Track centreline crosses the rectangle
    fn track_hits_rect(&self, track: &Track, rect: &Rect) -> Result<bool, GeometryError>;

    fn add_via(&mut self, via: NewVia) -> ViaId;
    fn remove_via(&mut self, id: ViaId) -> Option<Via>;
    fn add_zone(&mut self, zone: Zone);

    /// Discard and recompute every zone fill
    fn refill_zones(&mut self);
}
