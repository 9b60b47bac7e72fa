use serde::Serialize;

use super::cells::CellCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Place,
    Delete,
}

/// Outcome of one stitching run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementReport {
    pub mode: RunMode,
    pub net_name: String,
    pub vias_placed: usize,
    pub vias_removed: usize,
    /// Grid size in cells; zero in delete mode
    pub grid_width: usize,
    pub grid_height: usize,
    /// Final cell states; `None` in delete mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells: Option<CellCounts>,
}
