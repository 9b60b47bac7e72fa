//! Board model for via stitching
//!
//! # Submodules
//! - `types` - Board primitives (points, zones, pads, tracks, vias, drawings)
//! - `geometry` - Polygon and segment hit-test math
//! - `region` - The `BoardRegion` host interface used by the stitcher
//! - `model` - In-memory `Board` implementing `BoardRegion`
//! - `document` - XML board document load/save

mod types;
mod geometry;
mod region;
mod model;
mod document;

pub use types::{
    Coord, IU_PER_MM, MAX_LENGTH, OUTER_COPPER_LAYERS,
    from_mm, to_mm, is_outer_copper_layer,
    Point, Rect, Polygon, KeepoutRules, Zone,
    PadShape, Pad, Track, ViaType, ViaId, Via, NewVia,
    DrawingKind, Drawing,
};

pub use geometry::{
    point_segment_distance,
    point_in_ring,
    point_in_polygon,
    point_near_outline,
    segment_intersects_rect,
    segment_rect_distance,
};

pub use region::{BoardRegion, GeometryError};

pub use model::Board;

pub use document::{BoardDocument, load_board, board_from_xml, board_to_xml};
