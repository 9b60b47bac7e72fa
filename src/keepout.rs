//! Track clearance keepouts
//!
//! Wraps each selected track in a stadium-shaped keepout (two semicircular
//! caps joined by straight sides) that forbids copper pour but still allows
//! tracks and vias. Used to hold back ground fill from RF lines.

use crate::board::{BoardRegion, Coord, KeepoutRules, Point, Polygon, Track, Zone, MAX_LENGTH};
use crate::stitch::StitchError;
use std::f64::consts::PI;
use tracing::{debug, info};

/// Points approximating each semicircular end cap
pub const ARC_POINTS: usize = 20;

fn cap_points(center: (f64, f64), delta: f64, theta: f64, is_start: bool) -> impl Iterator<Item = Point> {
    // Evenly spaced angles strictly between theta + pi/2 and theta + 3pi/2
    let base = if is_start { theta } else { theta + PI };
    let step = PI / (ARC_POINTS + 1) as f64;
    (1..=ARC_POINTS).map(move |k| {
        let angle = base + PI / 2.0 + step * k as f64;
        Point::new(
            (center.0 + delta * angle.cos()).round() as Coord,
            (center.1 + delta * angle.sin()).round() as Coord,
        )
    })
}

/// Outline of the clearance area around a track segment, or `None` when the
/// segment has zero length
pub fn stadium_points(start: Point, end: Point, width: Coord, clearance: Coord) -> Option<Vec<Point>> {
    let dx = (end.x - start.x) as f64;
    let dy = (end.y - start.y) as f64;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return None;
    }

    let delta = width as f64 / 2.0 + clearance as f64;
    let nx = (-dy / len * delta).round() as Coord;
    let ny = (dx / len * delta).round() as Coord;
    let theta = dy.atan2(dx);
    let s = (start.x as f64, start.y as f64);
    let e = (end.x as f64, end.y as f64);

    let mut points = Vec::with_capacity(2 * ARC_POINTS + 4);
    points.push(start.offset(nx, ny));
    points.extend(cap_points(s, delta, theta, true));
    points.push(start.offset(-nx, -ny));
    points.push(end.offset(-nx, -ny));
    points.extend(cap_points(e, delta, theta, false));
    points.push(end.offset(nx, ny));
    Some(points)
}

/// Keepout zone for one track, on the track's layer
pub fn track_keepout_zone(track: &Track, clearance: Coord) -> Option<Zone> {
    let outline = stadium_points(track.start, track.end, track.width, clearance)?;
    Some(Zone {
        net_name: String::new(),
        layer: track.layer.clone(),
        keepout: Some(KeepoutRules {
            no_copper_pour: true,
            no_vias: false,
            no_tracks: false,
        }),
        outline: Polygon::new(outline),
        ..Default::default()
    })
}

/// Add a clearance keepout around every selected track. Zero-length tracks
/// are skipped.
///
/// # Arguments
/// * `board` - Board whose selected tracks are wrapped
/// * `clearance` - Gap kept around each track edge, in nanometres
///
/// # Returns
/// * `Result<usize>` - Number of keepouts added; `NoTracksSelected` when no
///   track is selected, `InvalidParameter` for an out-of-range clearance
pub fn add_track_keepouts<B: BoardRegion + ?Sized>(board: &mut B, clearance: Coord) -> Result<usize, StitchError> {
    if clearance <= 0 {
        return Err(StitchError::invalid("clearance", format!("must be positive, got {}", clearance)));
    }
    if clearance >= MAX_LENGTH {
        return Err(StitchError::invalid("clearance", format!("{} exceeds the maximum length", clearance)));
    }

    let selected: Vec<Track> = board.tracks().iter().filter(|t| t.selected).cloned().collect();
    if selected.is_empty() {
        return Err(StitchError::NoTracksSelected);
    }

    let mut added = 0;
    for track in &selected {
        match track_keepout_zone(track, clearance) {
            Some(zone) => {
                board.add_zone(zone);
                added += 1;
            }
            None => debug!("Skipping zero-length track at ({}, {})", track.start.x, track.start.y),
        }
    }

    info!("Added {} track clearance keepouts", added);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{point_in_polygon, Board};

    const MM: Coord = 1_000_000;

    fn track(x1: Coord, y1: Coord, x2: Coord, y2: Coord, selected: bool) -> Track {
        Track {
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
            width: MM / 2,
            layer: "F.Cu".to_string(),
            net_name: Some("RF".to_string()),
            selected,
            ..Default::default()
        }
    }

    #[test]
    fn test_stadium_shape() {
        let points = stadium_points(Point::new(0, 0), Point::new(10 * MM, 0), MM / 2, MM).unwrap();
        assert_eq!(points.len(), 2 * ARC_POINTS + 4);

        // delta = 0.25 + 1 mm
        let delta = MM + MM / 4;
        assert_eq!(points[0], Point::new(0, delta));
        assert_eq!(points[ARC_POINTS + 1], Point::new(0, -delta));
        assert_eq!(points[ARC_POINTS + 2], Point::new(10 * MM, -delta));
        assert_eq!(points[2 * ARC_POINTS + 3], Point::new(10 * MM, delta));

        // Start cap bulges away from the end, end cap bulges past it
        assert!(points[1..=ARC_POINTS].iter().all(|p| p.x < 0));
        assert!(points[ARC_POINTS + 3..2 * ARC_POINTS + 3].iter().all(|p| p.x > 10 * MM));
        let tip = points[1..=ARC_POINTS].iter().map(|p| p.x).min().unwrap();
        assert!((tip + delta).abs() < MM / 50);
    }

    #[test]
    fn test_stadium_covers_track_neighbourhood() {
        let points = stadium_points(Point::new(MM, MM), Point::new(5 * MM, 4 * MM), MM / 2, MM / 2).unwrap();
        let poly = Polygon::new(points);
        assert!(point_in_polygon(Point::new(3 * MM, 5 * MM / 2), &poly));
        assert!(point_in_polygon(Point::new(MM, MM), &poly));
        assert!(!point_in_polygon(Point::new(5 * MM, MM), &poly));
    }

    #[test]
    fn test_zero_length_track() {
        assert!(stadium_points(Point::new(MM, MM), Point::new(MM, MM), MM, MM).is_none());
    }

    #[test]
    fn test_add_track_keepouts() {
        let mut board = Board::new();
        board.tracks.push(track(0, 0, 5 * MM, 0, true));
        board.tracks.push(track(0, MM, 5 * MM, MM, false));
        board.tracks.push(track(2 * MM, 2 * MM, 2 * MM, 2 * MM, true));

        assert_eq!(add_track_keepouts(&mut board, MM), Ok(1));
        assert_eq!(board.zones.len(), 1);
        let zone = &board.zones[0];
        assert_eq!(zone.layer, "F.Cu");
        assert!(zone.net_name.is_empty());
        assert_eq!(zone.keepout, Some(KeepoutRules { no_copper_pour: true, no_vias: false, no_tracks: false }));
    }

    #[test]
    fn test_requires_selection_and_clearance() {
        let mut board = Board::new();
        board.tracks.push(track(0, 0, 5 * MM, 0, false));
        assert_eq!(add_track_keepouts(&mut board, MM), Err(StitchError::NoTracksSelected));
        assert!(matches!(
            add_track_keepouts(&mut board, 0),
            Err(StitchError::InvalidParameter { field: "clearance", .. })
        ));
        board.tracks[0].selected = true;
        assert!(matches!(
            add_track_keepouts(&mut board, i64::MAX),
            Err(StitchError::InvalidParameter { field: "clearance", .. })
        ));
        assert!(board.zones.is_empty());
    }
}
