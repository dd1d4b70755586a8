//! Core type definitions for the simulation.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for one driver session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grid coordinate, `(row, col)` with the origin in the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another position
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One grid slot: either a living bacterium or empty.
///
/// `age == 0` marks an empty slot and carries `expression == 0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Resistance gene expression level
    pub expression: f64,
    /// Ticks survived, zero when unoccupied
    pub age: u64,
}

impl Cell {
    pub const fn empty() -> Self {
        Self {
            expression: 0.0,
            age: 0,
        }
    }

    /// A founding organism placed by reset or inoculation
    pub const fn seed(expression: f64) -> Self {
        Self { expression, age: 1 }
    }

    /// A newborn placed next to its parent during a tick
    pub const fn daughter(expression: f64) -> Self {
        Self { expression, age: 1 }
    }

    pub fn is_alive(&self) -> bool {
        self.age > 0
    }

    /// The same organism one tick older
    pub fn aged(&self) -> Self {
        Self {
            expression: self.expression,
            age: self.age + 1,
        }
    }

    pub fn kill(&mut self) {
        *self = Self::empty();
    }
}

/// Antibiotic solution applied by a dosing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Antibiotic {
    /// Penalizes low expression: survival chance equals the expression level
    A,
    /// Penalizes high expression: survival chance is `1 - (expression - floor)`
    B,
}

impl Antibiotic {
    /// Probability that an organism with `expression` survives one dose.
    ///
    /// `floor` is the minimum viable expression level.
    pub fn survival_probability(&self, expression: f64, floor: f64) -> f64 {
        match self {
            Antibiotic::A => expression,
            Antibiotic::B => 1.0 - (expression - floor),
        }
    }

    /// Whether a uniform draw `roll` in `[0, 1)` kills the organism
    pub fn kills(&self, roll: f64, expression: f64, floor: f64) -> bool {
        roll > self.survival_probability(expression, floor)
    }
}

impl fmt::Display for Antibiotic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Antibiotic::A => write!(f, "A"),
            Antibiotic::B => write!(f, "B"),
        }
    }
}

impl FromStr for Antibiotic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "1" => Ok(Antibiotic::A),
            "b" | "2" => Ok(Antibiotic::B),
            other => Err(Error::Validation(format!("unknown antibiotic '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cell_is_dead() {
        let cell = Cell::empty();
        assert!(!cell.is_alive());
        assert_eq!(cell.expression, 0.0);
        assert_eq!(Cell::default(), cell);
    }

    #[test]
    fn test_aged_keeps_expression() {
        let cell = Cell::seed(0.35).aged().aged();
        assert_eq!(cell.age, 3);
        assert_eq!(cell.expression, 0.35);
    }

    #[test]
    fn test_kill_clears_both_fields() {
        let mut cell = Cell::daughter(0.6);
        assert!(cell.is_alive());
        cell.kill();
        assert_eq!(cell, Cell::empty());
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.manhattan_distance(&b), 7);
        assert_eq!(b.manhattan_distance(&a), 7);
    }

    #[test]
    fn test_survival_probability() {
        assert_eq!(Antibiotic::A.survival_probability(0.1, 0.1), 0.1);
        assert_eq!(Antibiotic::A.survival_probability(1.0, 0.1), 1.0);
        assert_eq!(Antibiotic::B.survival_probability(0.1, 0.1), 1.0);
        assert!((Antibiotic::B.survival_probability(1.0, 0.1) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_kills_compares_strictly() {
        // A roll equal to the survival probability is a survival.
        assert!(!Antibiotic::A.kills(0.5, 0.5, 0.1));
        assert!(Antibiotic::A.kills(0.51, 0.5, 0.1));
        // Fully resistant to A never dies, minimum expression never dies to B.
        assert!(!Antibiotic::A.kills(0.999, 1.0, 0.1));
        assert!(!Antibiotic::B.kills(0.999, 0.1, 0.1));
    }

    #[test]
    fn test_antibiotic_parsing() {
        assert_eq!("a".parse::<Antibiotic>().unwrap(), Antibiotic::A);
        assert_eq!(" B ".parse::<Antibiotic>().unwrap(), Antibiotic::B);
        assert_eq!("1".parse::<Antibiotic>().unwrap(), Antibiotic::A);
        assert_eq!("2".parse::<Antibiotic>().unwrap(), Antibiotic::B);
        assert!(matches!(
            "penicillin".parse::<Antibiotic>(),
            Err(Error::Validation(_))
        ));
    }
}
