//! Aggregate statistics and display projections of a colony.

use crate::grid::Grid;
use colony_core::Antibiotic;
use serde::{Deserialize, Serialize};

/// Brightness matrix, row-major, values in `[0, 1]` (darker = more resistant)
pub type Snapshot = Vec<Vec<f64>>;

/// Truncate to three decimal digits
pub fn truncate3(value: f64) -> f64 {
    (value * 1000.0).floor() / 1000.0
}

/// Mean expression as displayed by the driver.
///
/// The numerator sums every slot's expression while the denominator counts
/// only living cells, so residual expression on a dead slot still counts.
/// Returns `None` when nothing is alive.
pub fn average_expression(grid: &Grid) -> Option<f64> {
    let mut sum = 0.0;
    let mut alive = 0usize;
    for (_, cell) in grid.iter() {
        if cell.is_alive() {
            alive += 1;
        }
        sum += cell.expression;
    }

    if alive == 0 {
        return None;
    }
    Some(truncate3(sum / alive as f64))
}

pub fn snapshot(grid: &Grid) -> Snapshot {
    let dimension = grid.dimension();
    let mut rows = vec![Vec::with_capacity(dimension); dimension];
    for (pos, cell) in grid.iter() {
        rows[pos.row].push(1.0 - truncate3(cell.expression));
    }
    rows
}

/// Point-in-time summary of the colony
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyStats {
    pub tick: u64,
    /// Living cells
    pub alive: usize,
    /// Fraction of the grid occupied
    pub occupancy: f64,
    pub average_expression: Option<f64>,
    pub min_expression: Option<f64>,
    pub max_expression: Option<f64>,
}

impl ColonyStats {
    pub fn collect(grid: &Grid, tick: u64) -> Self {
        let alive = grid.alive_count();
        let slots = grid.dimension() * grid.dimension();
        let expressions = grid.alive().map(|(_, cell)| cell.expression);
        let (min, max) = expressions.fold((None, None), |(min, max): (Option<f64>, Option<f64>), e| {
            (
                Some(min.map_or(e, |m| m.min(e))),
                Some(max.map_or(e, |m| m.max(e))),
            )
        });

        Self {
            tick,
            alive,
            occupancy: alive as f64 / slots as f64,
            average_expression: average_expression(grid),
            min_expression: min,
            max_expression: max,
        }
    }

    pub fn is_extinct(&self) -> bool {
        self.alive == 0
    }
}

/// Result of one dosing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseReport {
    pub antibiotic: Antibiotic,
    /// Living cells exposed to the dose
    pub exposed: usize,
    pub killed: usize,
}

impl DoseReport {
    pub fn survivors(&self) -> usize {
        self.exposed - self.killed
    }
}
