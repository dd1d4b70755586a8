//! Bounded square grid of cells.

use colony_core::{Cell, Error, Position, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Von Neumann offsets: up, down, left, right
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A square grid with hard edges (no wrapping), stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    dimension: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            cells: vec![Cell::empty(); dimension * dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.dimension && pos.col < self.dimension
    }

    /// Get cell at an in-range position
    pub fn get(&self, pos: Position) -> &Cell {
        &self.cells[self.pos_to_index(pos)]
    }

    pub fn get_mut(&mut self, pos: Position) -> &mut Cell {
        let index = self.pos_to_index(pos);
        &mut self.cells[index]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        let index = self.pos_to_index(pos);
        self.cells[index] = cell;
    }

    /// Checked access for positions coming from outside the engine
    pub fn try_get(&self, pos: Position) -> Result<&Cell> {
        if self.contains(pos) {
            Ok(self.get(pos))
        } else {
            Err(self.out_of_bounds(pos))
        }
    }

    pub(crate) fn out_of_bounds(&self, pos: Position) -> Error {
        Error::OutOfBounds {
            row: pos.row,
            col: pos.col,
            dimension: self.dimension,
        }
    }

    /// Mark every slot unoccupied
    pub fn clear(&mut self) {
        self.cells.fill(Cell::empty());
    }

    /// In-bounds orthogonal neighbors: 4 inside, 3 on an edge, 2 in a corner
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let row = pos.row.checked_add_signed(dr)?;
                let col = pos.col.checked_add_signed(dc)?;
                let candidate = Position::new(row, col);
                self.contains(candidate).then_some(candidate)
            })
            .collect()
    }

    /// Pick one valid neighbor uniformly. `None` only on a 1x1 grid.
    pub fn random_neighbor<R: Rng + ?Sized>(&self, pos: Position, rng: &mut R) -> Option<Position> {
        self.neighbors(pos).choose(rng).copied()
    }

    /// Uniformly chosen position anywhere on the grid
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(
            rng.gen_range(0..self.dimension),
            rng.gen_range(0..self.dimension),
        )
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Iterator over living cells with positions
    pub fn alive(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.iter().filter(|(_, cell)| cell.is_alive())
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "position {} outside grid", pos);
        pos.row * self.dimension + pos.col
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        Position::new(index / self.dimension, index % self.dimension)
    }

    /// Iterator over all positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all cells with positions, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), cell))
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut()
    }
}
