//! Configuration types for the simulation.

use crate::{Antibiotic, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming a JSON runner configuration file
pub const CONFIG_PATH_ENV: &str = "COLONY_CONFIG";

/// Largest accepted grid side length
pub const MAX_DIMENSION: usize = 4096;

/// How `reset` places the founding organism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// One living cell carrying the seed expression
    #[default]
    Coherent,
    /// Two independent draws: one slot gets the seed expression, another gets `age = 1`.
    /// The two may differ, leaving an expressionless living cell.
    Legacy,
}

/// Colony engine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Side length of the square grid
    pub dimension: usize,
    /// Expression level of the founding organism
    pub seed_expression: f64,
    /// Minimum viable expression level (mutation floor)
    pub min_expression: f64,
    /// Maximum expression level (mutation ceiling)
    pub max_expression: f64,
    /// Expression change applied by an increase/decrease mutation
    pub mutation_step: f64,
    /// Founding organism placement
    pub seed_strategy: SeedStrategy,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            dimension: 25,
            seed_expression: 0.1,
            min_expression: 0.1,
            max_expression: 1.0,
            mutation_step: 0.05,
            seed_strategy: SeedStrategy::Coherent,
        }
    }
}

impl ColonyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::Config("dimension must be at least 1".to_string()));
        }
        if self.dimension > MAX_DIMENSION || self.dimension.checked_mul(self.dimension).is_none() {
            return Err(Error::Config(format!(
                "dimension {} exceeds the maximum of {}",
                self.dimension, MAX_DIMENSION
            )));
        }
        if !(self.min_expression > 0.0 && self.min_expression <= self.max_expression) {
            return Err(Error::Config(format!(
                "expression range [{}, {}] is empty or not positive",
                self.min_expression, self.max_expression
            )));
        }
        if self.max_expression > 1.0 {
            return Err(Error::Config(format!(
                "max_expression {} exceeds 1.0",
                self.max_expression
            )));
        }
        if !(self.min_expression..=self.max_expression).contains(&self.seed_expression) {
            return Err(Error::Config(format!(
                "seed_expression {} outside [{}, {}]",
                self.seed_expression, self.min_expression, self.max_expression
            )));
        }
        if !(self.mutation_step >= 0.0) {
            return Err(Error::Config(format!(
                "mutation_step {} must be non-negative",
                self.mutation_step
            )));
        }
        Ok(())
    }

    /// Whether `expression` is a legal value for a living organism
    pub fn is_viable(&self, expression: f64) -> bool {
        (self.min_expression..=self.max_expression).contains(&expression)
    }
}

/// A dose applied automatically when the driver reaches `frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDose {
    pub frame: u64,
    pub antibiotic: Antibiotic,
}

/// Headless driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Engine parameters
    pub colony: ColonyConfig,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Wall-clock time between frames (milliseconds)
    pub frame_interval_ms: u64,
    /// Ticks advanced per frame
    pub ticks_per_frame: u32,
    /// Stop after this many frames; run until shutdown when unset
    pub max_frames: Option<u64>,
    /// Doses applied at fixed frames
    pub dose_schedule: Vec<ScheduledDose>,
    /// Reseed the colony automatically when it dies out
    pub restart_on_extinction: bool,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            colony: ColonyConfig::default(),
            seed: 0,
            frame_interval_ms: 1000,
            ticks_per_frame: 2,
            max_frames: None,
            dose_schedule: Vec::new(),
            restart_on_extinction: false,
            log_filter: "info,colony_world=debug,colony_runner=debug".to_string(),
            otel_endpoint: None,
        }
    }
}

impl RunnerConfig {
    /// Load a JSON configuration file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: RunnerConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded runner configuration");
        Ok(config)
    }

    /// Load from the file named by `COLONY_CONFIG`, or fall back to defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => {
                debug!("{} not set, using default configuration", CONFIG_PATH_ENV);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.colony.validate()?;
        if self.ticks_per_frame == 0 {
            return Err(Error::Config("ticks_per_frame must be at least 1".to_string()));
        }
        if self.frame_interval_ms == 0 {
            return Err(Error::Config("frame_interval_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Antibiotics scheduled for `frame`, in declaration order
    pub fn doses_at(&self, frame: u64) -> impl Iterator<Item = Antibiotic> + '_ {
        self.dose_schedule
            .iter()
            .filter(move |dose| dose.frame == frame)
            .map(|dose| dose.antibiotic)
    }
}
