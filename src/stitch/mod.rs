//! Via stitching engine
//!
//! Fills the copper areas of one net with a grid of vias, keeping clear of
//! keepouts, other nets, pads, tracks and copper text.
//!
//! # Submodules
//! - `config` - User parameters and the validated run configuration
//! - `error` - Errors that abort a run
//! - `grid` - Board coordinate to grid index mapping
//! - `cells` - Per-cell placement state
//! - `classify` - Obstacle classification passes
//! - `spacing` - Step-size enforcement (standard and star patterns)
//! - `emit` - Via emission and removal of previously stitched vias
//! - `render` - ASCII grid dump for debugging
//! - `report` - Run summary

mod config;
mod error;
mod grid;
mod cells;
mod classify;
mod spacing;
mod emit;
mod render;
mod report;

pub use config::{
    StitchParams, StitchConfig, parse_length_mm,
    STITCH_VIA_MARKER, DEFAULT_NET_CANDIDATES,
};
pub use error::StitchError;
pub use grid::{GridMapper, IndexWindow};
pub use cells::{CellGrid, CellState, CellCounts, RejectReason, ViaCandidate};
pub use classify::{
    accept_target_areas,
    reject_foreign_areas,
    check_via_in_all_areas,
    reject_pads,
    reject_tracks,
    block_drawings,
    max_target_area_clearance,
};
pub use spacing::{clear_distance, clear_via_in_step_size, enforce_spacing};
pub use emit::{emit_vias, delete_stitched_vias};
pub use render::{cell_symbol, render_grid, log_grid};
pub use report::{PlacementReport, RunMode};

use crate::board::BoardRegion;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// Classified grid ready for emission
#[derive(Debug, Clone)]
pub struct PlacementPlan {
    pub mapper: GridMapper,
    pub grid: CellGrid,
}

/// Run every classification pass and the spacing pass without touching
/// the board
///
/// # Arguments
/// * `board` - Board to classify
/// * `config` - Validated run configuration
///
/// # Returns
/// * `Result<PlacementPlan>` - Grid mapping and final cell states, or
///   `InvalidParameter` when the pitch is not positive
pub fn plan_placement<B: BoardRegion + ?Sized>(board: &B, config: &StitchConfig) -> Result<PlacementPlan, StitchError> {
    let pitch = config.pitch();
    if pitch <= 0 {
        return Err(StitchError::invalid(
            "clearance",
            format!("clearance plus via size must be positive, got {}", pitch),
        ));
    }

    let mapper = GridMapper::new(&board.bounding_box(), pitch);
    let mut grid = CellGrid::new(mapper.width_cells, mapper.height_cells);
    let show = |stage: &str, grid: &CellGrid| {
        if config.debug {
            log_grid(stage, grid);
        }
    };

    let inside_supported = board.supports_zone_inside_test();
    if !inside_supported {
        warn!("Board has no inside-zone hit test; zone containment is treated as no hit");
    }
    let max_clearance = max_target_area_clearance(board.zones(), &config.net_name);

    info!("Processing target areas...");
    let accepted = accept_target_areas(board, config, &mapper, &mut grid);
    info!("{} candidate positions on a {}x{} grid", accepted, mapper.width_cells, mapper.height_cells);
    show("Post target areas", &grid);

    info!("Processing all vias of target area...");
    reject_foreign_areas(board, config, &mut grid, inside_supported);
    show("Post areas", &grid);

    info!("Processing all pads...");
    reject_pads(board, config, &mapper, &mut grid, max_clearance);
    show("Post pads", &grid);

    info!("Processing all tracks...");
    reject_tracks(board, config, &mapper, &mut grid, max_clearance);
    show("Post tracks", &grid);

    info!("Processing all existing drawings...");
    block_drawings(board, config, &mapper, &mut grid);
    show("Post drawings", &grid);

    info!("Remove vias to guarantee step size...");
    enforce_spacing(&mut grid, config.step, pitch, config.star);

    Ok(PlacementPlan { mapper, grid })
}

/// Place (or, in delete mode, remove) stitching vias, then refill zones.
/// Jitter is seeded from `config.seed` when set.
pub fn run<B: BoardRegion + ?Sized>(config: &StitchConfig, board: &mut B) -> Result<PlacementReport, StitchError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    run_with_rng(config, board, &mut rng)
}

/// [`run`] with an explicit random source for position jitter
///
/// # Returns
/// * `Result<PlacementReport>` - Counts for the run, or `NetNotFound` when
///   the board has no such net
pub fn run_with_rng<B, R>(config: &StitchConfig, board: &mut B, rng: &mut R) -> Result<PlacementReport, StitchError>
where
    B: BoardRegion + ?Sized,
    R: Rng + ?Sized,
{
    if !board.has_net(&config.net_name) {
        return Err(StitchError::NetNotFound(config.net_name.clone()));
    }

    if config.delete_vias {
        let removed = delete_stitched_vias(board, config);
        board.refill_zones();
        info!("{} vias removed from net {}", removed, config.net_name);
        return Ok(PlacementReport {
            mode: RunMode::Delete,
            net_name: config.net_name.clone(),
            vias_placed: 0,
            vias_removed: removed,
            grid_width: 0,
            grid_height: 0,
            cells: None,
        });
    }

    let plan = plan_placement(&*board, config)?;
    let placed = emit_vias(board, config, &plan.grid, rng);
    if config.debug {
        log_grid("Final result", &plan.grid);
    }

    board.refill_zones();
    info!("{} vias placed on net {}", placed, config.net_name);

    Ok(PlacementReport {
        mode: RunMode::Place,
        net_name: config.net_name.clone(),
        vias_placed: placed,
        vias_removed: 0,
        grid_width: plan.mapper.width_cells,
        grid_height: plan.mapper.height_cells,
        cells: Some(plan.grid.counts()),
    })
}
