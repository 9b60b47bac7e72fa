//! Core board types
//!
//! All lengths are integer nanometres, the same internal unit a PCB editor
//! uses, so grid arithmetic never accumulates float drift across a board.

use serde::Serialize;

/// Internal length unit (nanometres)
pub type Coord = i64;

/// Internal units per millimetre
pub const IU_PER_MM: f64 = 1_000_000.0;

/// Outer copper layers; drawings are only obstacles on these
pub const OUTER_COPPER_LAYERS: &[&str] = &["F.Cu", "B.Cu"];

/// Largest length accepted from user input (about 2.1 m). Keeps sums of a
/// few lengths and board coordinates far from `i64` overflow.
pub const MAX_LENGTH: Coord = i32::MAX as Coord;

/// Convert millimetres to internal units
pub fn from_mm(mm: f64) -> Coord {
    (mm * IU_PER_MM).round() as Coord
}

/// Convert internal units to millimetres
pub fn to_mm(value: Coord) -> f64 {
    value as f64 / IU_PER_MM
}

/// Check if a layer is an outer copper layer
pub fn is_outer_copper_layer(layer: &str) -> bool {
    OUTER_COPPER_LAYERS.iter().any(|&l| l.eq_ignore_ascii_case(layer))
}

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: Coord, dy: Coord) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub origin: Point,
    pub width: Coord,
    pub height: Coord,
}

impl Rect {
    pub fn new(origin: Point, width: Coord, height: Coord) -> Self {
        Self { origin, width, height }
    }

    /// Square of side `2 * half` centred on `center`
    pub fn centered_square(center: Point, half: Coord) -> Self {
        Self::new(center.offset(-half, -half), 2 * half, 2 * half)
    }

    /// Smallest rectangle containing every point; `None` when empty
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(min, max.x - min.x, max.y - min.y))
    }

    pub fn right(&self) -> Coord {
        self.origin.x + self.width
    }

    pub fn bottom(&self) -> Coord {
        self.origin.y + self.height
    }

    /// Union of two rectangles
    pub fn merge(&self, other: &Rect) -> Rect {
        let min = Point::new(self.origin.x.min(other.origin.x), self.origin.y.min(other.origin.y));
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Rect::new(min, max_x - min.x, max_y - min.y)
    }

    /// Closed-interval overlap test
    pub fn intersects(&self, other: &Rect) -> bool {
        self.origin.x <= other.right()
            && other.origin.x <= self.right()
            && self.origin.y <= other.bottom()
            && other.origin.y <= self.bottom()
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x && p.x <= self.right() && p.y >= self.origin.y && p.y <= self.bottom()
    }
}

/// A polygon outline with optional holes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub outer_ring: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

impl Polygon {
    pub fn new(outer_ring: Vec<Point>) -> Self {
        Self { outer_ring, holes: Vec::new() }
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.outer_ring.iter().copied())
    }
}

/// What a keepout zone forbids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepoutRules {
    pub no_copper_pour: bool,
    pub no_vias: bool,
    pub no_tracks: bool,
}

impl Default for KeepoutRules {
    fn default() -> Self {
        Self {
            no_copper_pour: true,
            no_vias: true,
            no_tracks: true,
        }
    }
}

/// A copper area (zone) or keepout region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Zone {
    /// Empty for keepouts
    pub net_name: String,
    pub layer: String,
    pub priority: u32,
    pub clearance: Coord,
    /// `Some` marks the zone as a keepout
    pub keepout: Option<KeepoutRules>,
    pub selected: bool,
    pub outline: Polygon,
    /// Copper actually poured; empty until the zone is filled
    pub filled_polygons: Vec<Polygon>,
}

impl Zone {
    pub fn is_keepout(&self) -> bool {
        self.keepout.is_some()
    }
}

/// Pad outline shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadShape {
    Circle,
    #[default]
    Rect,
    Oval,
}

/// Component pad
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pad {
    pub position: Point,
    pub width: Coord,
    pub height: Coord,
    pub shape: PadShape,
    pub clearance: Coord,
    pub layers: Vec<String>,
    pub net_name: Option<String>,
}

impl Pad {
    pub fn max_size(&self) -> Coord {
        self.width.max(self.height)
    }
}

/// Straight track segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub start: Point,
    pub end: Point,
    pub width: Coord,
    pub clearance: Coord,
    pub layer: String,
    pub net_name: Option<String>,
    pub selected: bool,
}

/// Via drilling type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViaType {
    #[default]
    Through,
    Blind,
    Micro,
}

impl ViaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViaType::Through => "through",
            ViaType::Blind => "blind",
            ViaType::Micro => "micro",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "through" => Some(ViaType::Through),
            "blind" | "buried" => Some(ViaType::Blind),
            "micro" => Some(ViaType::Micro),
            _ => None,
        }
    }
}

/// Board-assigned via identifier
pub type ViaId = u64;

/// Via record as stored on the board
#[derive(Debug, Clone, PartialEq)]
pub struct Via {
    pub id: ViaId,
    pub position: Point,
    pub diameter: Coord,
    pub drill: Coord,
    pub via_type: ViaType,
    pub net_name: String,
    /// Tool marker; stitched vias carry `STITCH_VIA_MARKER`
    pub marker: Option<u32>,
}

/// Via record handed to the board, which assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewVia {
    pub position: Point,
    pub diameter: Coord,
    pub drill: Coord,
    pub via_type: ViaType,
    pub net_name: String,
    pub marker: Option<u32>,
}

/// Drawing item category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingKind {
    Text,
    Graphic,
}

/// Text or graphic item; only its bounding box matters here
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub kind: DrawingKind,
    pub layer: String,
    pub bbox: Rect,
    pub text: Option<String>,
}
