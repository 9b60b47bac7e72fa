//! Dense cell-state grid
//!
//! Cells only move forward: `Empty` → `Candidate` → `Rejected`, or straight
//! from `Empty` to `Rejected` for coarse obstacles. A rejected cell keeps
//! its first reason, except that a forced `mark` replaces it.

use crate::board::Point;
use serde::Serialize;

/// Why a cell cannot hold a via
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectReason {
    Keepout,
    OtherSignal,
    Track,
    Pad,
    Drawing,
    Step,
}

/// A cell accepted by a target area, waiting for emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViaCandidate {
    pub i: usize,
    pub j: usize,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Empty,
    Candidate(ViaCandidate),
    Rejected(RejectReason),
}

impl CellState {
    pub fn is_candidate(&self) -> bool {
        matches!(self, CellState::Candidate(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, CellState::Rejected(_))
    }
}

/// Number of cells in each state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CellCounts {
    pub empty: usize,
    pub candidate: usize,
    pub keepout: usize,
    pub other_signal: usize,
    pub track: usize,
    pub pad: usize,
    pub drawing: usize,
    pub step: usize,
}

/// Column-major storage: cell `(i, j)` lives at `i * height + j`
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl CellGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![CellState::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, i: usize, j: usize) -> Option<usize> {
        (i < self.width && j < self.height).then(|| i * self.height + j)
    }

    /// State of a cell; out-of-range reads as `Empty`
    pub fn get(&self, i: usize, j: usize) -> CellState {
        self.index(i, j).map(|idx| self.cells[idx]).unwrap_or_default()
    }

    /// Accept an `Empty` cell; returns false if the cell was not empty
    pub fn accept(&mut self, i: usize, j: usize, position: Point) -> bool {
        match self.index(i, j) {
            Some(idx) if self.cells[idx] == CellState::Empty => {
                self.cells[idx] = CellState::Candidate(ViaCandidate { i, j, position });
                true
            }
            _ => false,
        }
    }

    /// Reject a `Candidate` cell; other states are left alone
    pub fn reject(&mut self, i: usize, j: usize, reason: RejectReason) -> bool {
        match self.index(i, j) {
            Some(idx) if self.cells[idx].is_candidate() => {
                self.cells[idx] = CellState::Rejected(reason);
                true
            }
            _ => false,
        }
    }

    /// Force a cell to `Rejected(reason)` whatever its state, overwriting an
    /// earlier reason. Returns false only when out of range.
    pub fn mark(&mut self, i: usize, j: usize, reason: RejectReason) -> bool {
        match self.index(i, j) {
            Some(idx) => {
                self.cells[idx] = CellState::Rejected(reason);
                true
            }
            None => false,
        }
    }

    /// Current candidates in scan order (column index outer)
    pub fn candidates(&self) -> Vec<ViaCandidate> {
        self.cells
            .iter()
            .filter_map(|c| match c {
                CellState::Candidate(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn counts(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for cell in &self.cells {
            match cell {
                CellState::Empty => counts.empty += 1,
                CellState::Candidate(_) => counts.candidate += 1,
                CellState::Rejected(reason) => match reason {
                    RejectReason::Keepout => counts.keepout += 1,
                    RejectReason::OtherSignal => counts.other_signal += 1,
                    RejectReason::Track => counts.track += 1,
                    RejectReason::Pad => counts.pad += 1,
                    RejectReason::Drawing => counts.drawing += 1,
                    RejectReason::Step => counts.step += 1,
                },
            }
        }
        counts
    }
}
