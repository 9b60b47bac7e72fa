//! In-memory board backing the command-line tool and the tests

use super::geometry::{point_in_polygon, point_near_outline, segment_intersects_rect, segment_rect_distance};
use super::region::{BoardRegion, GeometryError};
use super::types::*;
use tracing::debug;

/// Board contents as loaded from a board document
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub nets: Vec<String>,
    pub zones: Vec<Zone>,
    pub pads: Vec<Pad>,
    pub tracks: Vec<Track>,
    pub drawings: Vec<Drawing>,
    pub vias: Vec<Via>,
    next_via_id: ViaId,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a net name; duplicates are ignored
    pub fn add_net(&mut self, name: &str) {
        if !self.nets.iter().any(|n| n == name) {
            self.nets.push(name.to_string());
        }
    }

    /// Insert a via that already has an id (document load)
    pub fn push_via(&mut self, via: Via) {
        self.next_via_id = self.next_via_id.max(via.id + 1);
        self.vias.push(via);
    }

    /// Vias on `net` carrying `marker`
    pub fn vias_with_marker<'a>(&'a self, net: &'a str, marker: u32) -> impl Iterator<Item = &'a Via> + 'a {
        self.vias
            .iter()
            .filter(move |v| v.net_name == net && v.marker == Some(marker))
    }
}

fn pad_bounds(pad: &Pad) -> Rect {
    Rect::new(
        pad.position.offset(-pad.width / 2, -pad.height / 2),
        pad.width,
        pad.height,
    )
}

fn track_bounds(track: &Track) -> Option<Rect> {
    let half = track.width / 2;
    Rect::bounding([track.start, track.end]).map(|r| {
        Rect::new(r.origin.offset(-half, -half), r.width + track.width, r.height + track.width)
    })
}

impl BoardRegion for Board {
    fn bounding_box(&self) -> Rect {
        let rects = self
            .zones
            .iter()
            .filter_map(|z| z.outline.bounds())
            .chain(self.pads.iter().map(pad_bounds))
            .chain(self.tracks.iter().filter_map(track_bounds))
            .chain(self.drawings.iter().map(|d| d.bbox))
            .chain(self.vias.iter().map(|v| Rect::centered_square(v.position, v.diameter / 2)));

        rects.reduce(|acc, r| acc.merge(&r)).unwrap_or_default()
    }

    fn has_net(&self, name: &str) -> bool {
        self.nets.iter().any(|n| n == name)
    }

    fn zones(&self) -> &[Zone] {
        &self.zones
    }

    fn pads(&self) -> &[Pad] {
        &self.pads
    }

    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    fn vias(&self) -> &[Via] {
        &self.vias
    }

    fn zone_hit_filled(&self, zone: &Zone, p: Point) -> bool {
        zone.filled_polygons.iter().any(|poly| point_in_polygon(p, poly))
    }

    fn zone_hit_edge(&self, zone: &Zone, p: Point, accuracy: Coord) -> bool {
        point_near_outline(p, &zone.outline, accuracy as f64)
    }

    fn zone_hit_inside(&self, zone: &Zone, p: Point) -> bool {
        point_in_polygon(p, &zone.outline)
    }

    fn pad_hits_rect(&self, pad: &Pad, rect: &Rect) -> Result<bool, GeometryError> {
        if pad.width <= 0 || pad.height <= 0 {
            return Err(GeometryError::DegenerateGeometry(format!(
                "pad at ({}, {}) has size {}x{}",
                pad.position.x, pad.position.y, pad.width, pad.height
            )));
        }

        let hit = match pad.shape {
            PadShape::Rect => pad_bounds(pad).intersects(rect),
            PadShape::Circle => {
                let radius = pad.max_size() as f64 / 2.0;
                segment_rect_distance(pad.position, pad.position, rect) <= radius
            }
            PadShape::Oval => {
                // Stadium along the long axis
                let radius = pad.width.min(pad.height) / 2;
                let (a, b) = if pad.width >= pad.height {
                    let half = pad.width / 2 - radius;
                    (pad.position.offset(-half, 0), pad.position.offset(half, 0))
                } else {
                    let half = pad.height / 2 - radius;
                    (pad.position.offset(0, -half), pad.position.offset(0, half))
                };
                segment_rect_distance(a, b, rect) <= radius as f64
            }
        };
        Ok(hit)
    }

    fn track_hits_rect(&self, track: &Track, rect: &Rect) -> Result<bool, GeometryError> {
        if track.width < 0 {
            return Err(GeometryError::DegenerateGeometry(format!(
                "track ({}, {})-({}, {}) has negative width {}",
                track.start.x, track.start.y, track.end.x, track.end.y, track.width
            )));
        }
        Ok(segment_intersects_rect(track.start, track.end, rect))
    }

    fn add_via(&mut self, via: NewVia) -> ViaId {
        let id = self.next_via_id;
        self.next_via_id += 1;
        self.vias.push(Via {
            id,
            position: via.position,
            diameter: via.diameter,
            drill: via.drill,
            via_type: via.via_type,
            net_name: via.net_name,
            marker: via.marker,
        });
        id
    }

    fn remove_via(&mut self, id: ViaId) -> Option<Via> {
        let index = self.vias.iter().position(|v| v.id == id)?;
        Some(self.vias.remove(index))
    }

    fn add_zone(&mut self, zone: Zone) {
        self.zones.push(zone);
    }

    /// Pours each copper zone over its whole outline; keepouts stay empty.
    /// Clearance knockouts are not computed.
    fn refill_zones(&mut self) {
        for zone in &mut self.zones {
            zone.filled_polygons.clear();
            if !zone.is_keepout() && zone.outline.outer_ring.len() >= 3 {
                zone.filled_polygons.push(zone.outline.clone());
            }
        }
        debug!("Refilled {} zones", self.zones.len());
    }
}
