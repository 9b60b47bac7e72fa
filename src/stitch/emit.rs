//! Via emission and removal

use crate::board::{BoardRegion, Coord, NewVia, ViaType};
use rand::Rng;
use tracing::debug;

use super::cells::CellGrid;
use super::config::{StitchConfig, STITCH_VIA_MARKER};

/// Uniform offset in `[-pitch/4, pitch/4]`
fn jitter<R: Rng + ?Sized>(rng: &mut R, pitch: Coord) -> Coord {
    let quarter = pitch as f64 / 4.0;
    rng.random_range(-quarter..=quarter).round() as Coord
}

/// Add a marked through via on the target net for every remaining candidate
///
/// # Arguments
/// * `board` - Board that receives the vias
/// * `config` - Via size, drill and whether to jitter positions
/// * `grid` - Classified grid after spacing
/// * `rng` - Jitter source, unused unless `config.randomize` is set
///
/// # Returns
/// * `usize` - Number of vias placed
pub fn emit_vias<B, R>(board: &mut B, config: &StitchConfig, grid: &CellGrid, rng: &mut R) -> usize
where
    B: BoardRegion + ?Sized,
    R: Rng + ?Sized,
{
    let pitch = config.pitch();
    let mut placed = 0;

    for candidate in grid.candidates() {
        let mut position = candidate.position;
        if config.randomize {
            let dx = jitter(rng, pitch);
            let dy = jitter(rng, pitch);
            position = position.offset(dx, dy);
        }

        let id = board.add_via(NewVia {
            position,
            diameter: config.via_diameter,
            drill: config.drill,
            via_type: ViaType::Through,
            net_name: config.net_name.clone(),
            marker: Some(STITCH_VIA_MARKER),
        });
        debug!("Added via {} at cell ({}, {})", id, candidate.i, candidate.j);
        placed += 1;
    }

    placed
}

/// Remove every via on the target net that this tool placed
pub fn delete_stitched_vias<B: BoardRegion + ?Sized>(board: &mut B, config: &StitchConfig) -> usize {
    let ids: Vec<_> = board
        .vias()
        .iter()
        .filter(|v| v.net_name == config.net_name && v.marker == Some(STITCH_VIA_MARKER))
        .map(|v| v.id)
        .collect();

    ids.into_iter().filter(|&id| board.remove_via(id).is_some()).count()
}
