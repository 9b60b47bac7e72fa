//! Obstacle classification passes
//!
//! The passes run in a fixed order and each one only narrows the set of
//! candidates:
//! 1. target areas accept `Empty` cells,
//! 2. foreign areas and keepouts reject candidates,
//! 3. pads, 4. tracks reject candidates by exact hit test in a local window,
//! 5. text on outer copper marks whole windows without a hit test,
//!    overwriting whatever state the cells had.

use crate::board::{is_outer_copper_layer, BoardRegion, Coord, DrawingKind, GeometryError, Point, Rect, Zone};
use tracing::{debug, warn};

use super::cells::{CellGrid, CellState, RejectReason};
use super::config::StitchConfig;
use super::grid::{GridMapper, IndexWindow};

/// The four corners tested for a via footprint; the centre is never tested
fn corners(center: Point, offset: Coord) -> [Point; 4] {
    [
        center.offset(-offset, -offset),
        center.offset(-offset, offset),
        center.offset(offset, -offset),
        center.offset(offset, offset),
    ]
}

pub fn is_target_area(zone: &Zone, net: &str) -> bool {
    zone.net_name == net
}

/// Largest clearance of any area on the target net, selected or not
pub fn max_target_area_clearance(zones: &[Zone], net: &str) -> Coord {
    zones
        .iter()
        .filter(|z| is_target_area(z, net))
        .map(|z| z.clearance)
        .max()
        .unwrap_or(0)
        .max(0)
}

/// Pass 1: accept every empty cell whose via footprint sits fully inside
/// poured copper of a target area, clear of the area edge
pub fn accept_target_areas<B: BoardRegion + ?Sized>(
    board: &B,
    config: &StitchConfig,
    mapper: &GridMapper,
    grid: &mut CellGrid,
) -> usize {
    let mut accepted = 0;

    for area in board.zones() {
        if !is_target_area(area, &config.net_name) {
            continue;
        }
        if config.only_selected_area && !area.selected {
            continue;
        }
        debug!("Processing target area: net {}, layer {}", area.net_name, area.layer);

        let offset = config.clearance.max(area.clearance) + config.via_diameter / 2;
        for i in 0..grid.width() {
            for j in 0..grid.height() {
                if grid.get(i, j) != CellState::Empty {
                    continue;
                }
                let center = mapper.cell_position(i, j);
                let inside = corners(center, offset).iter().all(|&p| {
                    board.zone_hit_filled(area, p) && !board.zone_hit_edge(area, p, area.clearance)
                });
                if inside && grid.accept(i, j, center) {
                    accepted += 1;
                }
            }
        }
    }

    accepted
}

fn hit_inside<B: BoardRegion + ?Sized>(board: &B, zone: &Zone, p: Point, supported: bool) -> bool {
    supported && board.zone_hit_inside(zone, p)
}

/// Collision of one candidate position with every non-target area.
///
/// Keepouts are checked first and win over any other collision. A foreign
/// zone that merely contains a corner (without poured copper there) loses to
/// a strictly higher-priority target-net zone on the same layer that also
/// contains that corner.
///
/// # Arguments
/// * `board` - Board whose zones are tested
/// * `config` - Run configuration (target net, via size, clearance)
/// * `position` - Candidate via centre
/// * `inside_supported` - Whether the board can answer inside-zone queries
///
/// # Returns
/// * `Option<RejectReason>` - `Keepout` or `OtherArea` on a collision, `None` when clear
pub fn check_via_in_all_areas<B: BoardRegion + ?Sized>(
    board: &B,
    config: &StitchConfig,
    position: Point,
    inside_supported: bool,
) -> Option<RejectReason> {
    let zones = board.zones();
    let net = config.net_name.as_str();
    let offset_for = |area: &Zone| config.clearance.max(area.clearance) + config.via_diameter / 2;

    for area in zones.iter().filter(|z| z.is_keepout() && !is_target_area(z, net)) {
        let hit = corners(position, offset_for(area)).iter().any(|&p| {
            board.zone_hit_filled(area, p)
                || board.zone_hit_edge(area, p, 1)
                || hit_inside(board, area, p, inside_supported)
        });
        if hit {
            return Some(RejectReason::Keepout);
        }
    }

    for area in zones.iter().filter(|z| !z.is_keepout() && !is_target_area(z, net)) {
        for p in corners(position, offset_for(area)) {
            if board.zone_hit_filled(area, p) || board.zone_hit_edge(area, p, 1) {
                return Some(RejectReason::OtherSignal);
            }
            if hit_inside(board, area, p, inside_supported) {
                let shadowed = zones.iter().any(|t| {
                    is_target_area(t, net)
                        && t.priority > area.priority
                        && t.layer == area.layer
                        && hit_inside(board, t, p, inside_supported)
                });
                if !shadowed {
                    return Some(RejectReason::OtherSignal);
                }
            }
        }
    }

    None
}

/// Pass 2: reject candidates colliding with keepouts or other nets' areas
pub fn reject_foreign_areas<B: BoardRegion + ?Sized>(
    board: &B,
    config: &StitchConfig,
    grid: &mut CellGrid,
    inside_supported: bool,
) -> usize {
    let mut rejected = 0;
    for candidate in grid.candidates() {
        if let Some(reason) = check_via_in_all_areas(board, config, candidate.position, inside_supported) {
            if grid.reject(candidate.i, candidate.j, reason) {
                rejected += 1;
            }
        }
    }
    rejected
}

/// Candidate cells in `window` whose clearance square hits the feature.
/// Any hit-test failure discards the whole feature.
fn windowed_hits<F>(
    mapper: &GridMapper,
    grid: &CellGrid,
    window: Option<IndexWindow>,
    half: Coord,
    mut hit: F,
) -> Result<Vec<(usize, usize)>, GeometryError>
where
    F: FnMut(&Rect) -> Result<bool, GeometryError>,
{
    let window = match window {
        Some(w) => w,
        None => return Ok(Vec::new()),
    };

    let mut cells = Vec::new();
    for (i, j) in window.cells() {
        if !grid.get(i, j).is_candidate() {
            continue;
        }
        let square = Rect::centered_square(mapper.cell_position(i, j), half);
        if hit(&square)? {
            cells.push((i, j));
        }
    }
    Ok(cells)
}

fn apply_rejections(grid: &mut CellGrid, cells: Vec<(usize, usize)>, reason: RejectReason) -> usize {
    cells
        .into_iter()
        .filter(|&(i, j)| grid.reject(i, j, reason))
        .count()
}

/// Pass 3: reject candidates too close to any pad, on any layer
pub fn reject_pads<B: BoardRegion + ?Sized>(
    board: &B,
    config: &StitchConfig,
    mapper: &GridMapper,
    grid: &mut CellGrid,
    max_target_clearance: Coord,
) -> usize {
    let mut rejected = 0;

    for pad in board.pads() {
        let offset = pad.clearance.max(config.clearance).max(max_target_clearance) + config.via_diameter / 2;
        let window = mapper.window_around(pad.position, pad.max_size() / 2 + offset);

        match windowed_hits(mapper, grid, window, offset, |rect| board.pad_hits_rect(pad, rect)) {
            Ok(cells) => rejected += apply_rejections(grid, cells, RejectReason::Pad),
            Err(e) => warn!(
                "Skipping pad at ({}, {}): {}",
                pad.position.x, pad.position.y, e
            ),
        }
    }

    rejected
}

/// Pass 4: reject candidates too close to any track, on any layer
pub fn reject_tracks<B: BoardRegion + ?Sized>(
    board: &B,
    config: &StitchConfig,
    mapper: &GridMapper,
    grid: &mut CellGrid,
    max_target_clearance: Coord,
) -> usize {
    let mut rejected = 0;

    for track in board.tracks() {
        let offset = track.clearance.max(config.clearance).max(max_target_clearance)
            + config.via_diameter / 2
            + track.width / 2;
        let min = Point::new(
            track.start.x.min(track.end.x) - offset,
            track.start.y.min(track.end.y) - offset,
        );
        let max = Point::new(
            track.start.x.max(track.end.x) + offset,
            track.start.y.max(track.end.y) + offset,
        );

        let window = mapper.window(min, max);

        match windowed_hits(mapper, grid, window, offset, |rect| board.track_hits_rect(track, rect)) {
            Ok(cells) => rejected += apply_rejections(grid, cells, RejectReason::Track),
            Err(e) => warn!(
                "Skipping track ({}, {})-({}, {}): {}",
                track.start.x, track.start.y, track.end.x, track.end.y, e
            ),
        }
    }

    rejected
}

/// Pass 5: mark every cell under text on outer copper, inflated by one
/// pitch, as `Drawing`. Earlier rejection reasons are overwritten.
pub fn block_drawings<B: BoardRegion + ?Sized>(
    board: &B,
    config: &StitchConfig,
    mapper: &GridMapper,
    grid: &mut CellGrid,
) -> usize {
    let inter = config.clearance + config.via_diameter;
    let mut blocked = 0;

    let texts = board
        .drawings()
        .iter()
        .filter(|d| d.kind == DrawingKind::Text && is_outer_copper_layer(&d.layer));
    for drawing in texts {
        let bbox = &drawing.bbox;
        let min = bbox.origin.offset(-inter, -inter);
        let max = Point::new(bbox.right() + inter, bbox.bottom() + inter);
        if let Some(window) = mapper.window(min, max) {
            blocked += window
                .cells()
                .filter(|&(i, j)| grid.mark(i, j, RejectReason::Drawing))
                .count();
        }
    }

    blocked
}
