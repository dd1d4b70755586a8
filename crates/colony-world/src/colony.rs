//! Colony engine: double-buffered growth, mutation and antibiotic selection.

use crate::grid::Grid;
use crate::mutation;
use crate::stats::{self, ColonyStats, DoseReport, Snapshot};
use colony_core::{Antibiotic, Cell, ColonyConfig, Error, Position, Result, SeedStrategy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, event, info, instrument, trace, Level};

/// A bacteria colony on a square grid.
///
/// `current` is the visible state. `next` is scratch space written during
/// [`Colony::advance`] and swapped in at the end of the tick; it is always
/// empty between calls.
#[derive(Debug, Clone)]
pub struct Colony<R = ChaCha8Rng> {
    config: ColonyConfig,
    current: Grid,
    next: Grid,
    rng: R,
    tick: u64,
}

impl Colony<ChaCha8Rng> {
    /// Empty colony driven by a ChaCha8 generator seeded with `seed`
    pub fn new(config: ColonyConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Colony<R> {
    /// Empty colony drawing all randomness from `rng`
    pub fn with_rng(config: ColonyConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let dimension = config.dimension;
        Ok(Self {
            config,
            current: Grid::new(dimension),
            next: Grid::new(dimension),
            rng,
            tick: 0,
        })
    }

    /// Clear the grid and place a founding organism
    #[instrument(skip(self), fields(strategy = ?self.config.seed_strategy))]
    pub fn reset(&mut self) {
        self.current.clear();
        self.next.clear();
        self.tick = 0;

        let seed_expression = self.config.seed_expression;
        match self.config.seed_strategy {
            SeedStrategy::Coherent => {
                let pos = self.current.random_position(&mut self.rng);
                self.current.set(pos, Cell::seed(seed_expression));
                info!(
                    event = "colony_reset",
                    row = pos.row,
                    col = pos.col,
                    expression = seed_expression,
                    "Colony reseeded"
                );
            }
            SeedStrategy::Legacy => {
                // Independent draws; the two slots coincide only by chance.
                let expression_pos = self.current.random_position(&mut self.rng);
                self.current.get_mut(expression_pos).expression = seed_expression;
                let age_pos = self.current.random_position(&mut self.rng);
                self.current.get_mut(age_pos).age = 1;

                if expression_pos != age_pos {
                    debug!(
                        expression_pos = %expression_pos,
                        age_pos = %age_pos,
                        "Legacy seeding split the founder across two slots"
                    );
                }
                info!(
                    event = "colony_reset",
                    row = age_pos.row,
                    col = age_pos.col,
                    expression = self.current.get(age_pos).expression,
                    "Colony reseeded"
                );
            }
        }
    }

    /// Run one tick: every living cell ages in place and places one daughter
    /// on a random neighbor.
    ///
    /// Positions are visited in row-major order. A slot of `next` that is
    /// already occupied is never overwritten: a parent whose slot was taken
    /// by an earlier daughter yields to it, and a daughter aimed at an
    /// occupied slot is discarded.
    pub fn advance(&mut self) {
        let mut births = 0usize;
        let mut collisions = 0usize;

        for index in 0..self.current.dimension().pow(2) {
            let pos = self.current.index_to_pos(index);
            if self.next.get(pos).is_alive() {
                continue;
            }

            let cell = *self.current.get(pos);
            if !cell.is_alive() {
                self.next.set(pos, Cell::empty());
                continue;
            }

            self.next.set(pos, cell.aged());
            let Some(target) = self.current.random_neighbor(pos, &mut self.rng) else {
                continue;
            };
            let expression = mutation::spawn(cell.expression, &self.config, &mut self.rng);
            if self.next.get(target).is_alive() {
                collisions += 1;
            } else {
                self.next.set(target, Cell::daughter(expression));
                births += 1;
            }
        }

        std::mem::swap(&mut self.current, &mut self.next);
        self.next.clear();
        self.tick += 1;

        trace!(
            tick = self.tick,
            births = births,
            collisions = collisions,
            alive = self.current.alive_count(),
            "Tick advanced"
        );
    }

    /// Expose every living cell to `antibiotic`; each dies independently
    #[instrument(skip(self), fields(tick = self.tick))]
    pub fn dose(&mut self, antibiotic: Antibiotic) -> DoseReport {
        let floor = self.config.min_expression;
        let mut exposed = 0usize;
        let mut killed = 0usize;

        for cell in self.current.cells_mut() {
            if !cell.is_alive() {
                continue;
            }
            exposed += 1;
            let roll: f64 = self.rng.gen();
            if antibiotic.kills(roll, cell.expression, floor) {
                cell.kill();
                killed += 1;
            }
        }

        let report = DoseReport {
            antibiotic,
            exposed,
            killed,
        };

        info!(
            event = "antibiotic_dose",
            antibiotic = %antibiotic,
            exposed = exposed,
            killed = killed,
            survivors = report.survivors(),
            "Antibiotic dose applied"
        );
        event!(
            Level::INFO,
            counter_name = "organisms_killed",
            counter_value = killed,
            antibiotic = %antibiotic,
            "Dose kill metric"
        );

        report
    }

    /// Place a living organism at `pos` with the given expression
    pub fn inoculate(&mut self, pos: Position, expression: f64) -> Result<()> {
        if !self.current.contains(pos) {
            return Err(self.current.out_of_bounds(pos));
        }
        if !self.config.is_viable(expression) {
            return Err(Error::Validation(format!(
                "expression {} outside viable range [{}, {}]",
                expression, self.config.min_expression, self.config.max_expression
            )));
        }

        self.current.set(pos, Cell::seed(expression));
        debug!(row = pos.row, col = pos.col, expression = expression, "Inoculated cell");
        Ok(())
    }

    /// Mean expression truncated to three decimals, `None` when extinct
    pub fn average_expression(&self) -> Option<f64> {
        stats::average_expression(&self.current)
    }

    /// Brightness matrix for rendering
    pub fn snapshot(&self) -> Snapshot {
        stats::snapshot(&self.current)
    }

    pub fn stats(&self) -> ColonyStats {
        ColonyStats::collect(&self.current, self.tick)
    }

    pub fn is_extinct(&self) -> bool {
        self.current.alive_count() == 0
    }

    pub fn grid(&self) -> &Grid {
        &self.current
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn dimension(&self) -> usize {
        self.current.dimension()
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }
}
