//! ASCII rendering of the cell grid for debugging

use super::cells::{CellGrid, CellState, RejectReason};
use tracing::info;

const LEGEND: &str = "\
OK           = 'X'
NO_SIGNAL    = ' '
OTHER_SIGNAL = 'O'
KEEPOUT      = 'K'
TRACK        = 'T'
PAD          = 'P'
DRAWING      = 'D'
STEP         = '-'";

pub fn cell_symbol(cell: &CellState) -> char {
    match cell {
        CellState::Empty => ' ',
        CellState::Candidate(_) => 'X',
        CellState::Rejected(reason) => match reason {
            RejectReason::OtherSignal => 'O',
            RejectReason::Keepout => 'K',
            RejectReason::Track => 'T',
            RejectReason::Pad => 'P',
            RejectReason::Drawing => 'D',
            RejectReason::Step => '-',
        },
    }
}

/// One text row per grid row, framed, without the legend
pub fn render_grid(grid: &CellGrid) -> String {
    let frame = "_".repeat(grid.width() + 2);
    let mut out = String::with_capacity((grid.width() + 3) * (grid.height() + 2));
    out.push_str(&frame);
    out.push('\n');
    for j in 0..grid.height() {
        out.push('|');
        for i in 0..grid.width() {
            out.push(cell_symbol(&grid.get(i, j)));
        }
        out.push_str("|\n");
    }
    out.push_str(&frame);
    out
}

/// Send the framed grid and legend to the log sink
pub fn log_grid(stage: &str, grid: &CellGrid) {
    info!(target: "via_stitch::grid", "{}:\n{}\n{}", stage, render_grid(grid), LEGEND);
}
