//! Frame-driven session around a single colony.

use crate::command::Command;
use chrono::{DateTime, Utc};
use colony_core::{Antibiotic, RunId, RunnerConfig};
use colony_world::{Colony, ColonyStats, DoseReport};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Mutable session state; every engine call goes through this lock
struct Session {
    colony: Colony,
    frame: u64,
    restarts: u32,
    doses: Vec<DoseReport>,
}

/// What the frame loop should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Finished,
}

/// Owns one colony and serializes access to it from the frame timer and
/// the command reader.
pub struct Driver {
    run_id: RunId,
    config: RunnerConfig,
    started_at: DateTime<Utc>,
    session: Mutex<Session>,
}

impl Driver {
    pub fn new(run_id: RunId, config: RunnerConfig) -> colony_core::Result<Self> {
        config.validate()?;
        let colony = Colony::new(config.colony.clone(), config.seed)?;
        Ok(Self {
            run_id,
            config,
            started_at: Utc::now(),
            session: Mutex::new(Session {
                colony,
                frame: 0,
                restarts: 0,
                doses: Vec::new(),
            }),
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Place the founding organism at startup; not counted as a restart
    pub fn start(&self) {
        let mut session = self.session.lock();
        session.colony.reset();
        info!(run_id = %self.run_id, "Colony seeded");
    }

    /// Reseed the colony; the frame counter keeps running
    pub fn restart(&self) {
        let mut session = self.session.lock();
        session.colony.reset();
        session.restarts += 1;
        info!(run_id = %self.run_id, frame = session.frame, restarts = session.restarts, "Colony restarted");
    }

    /// Advance one display frame: `ticks_per_frame` ticks, then scheduled doses
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn frame(&self) -> FrameOutcome {
        let mut session = self.session.lock();
        session.frame += 1;
        let frame = session.frame;

        for _ in 0..self.config.ticks_per_frame {
            session.colony.advance();
        }
        for antibiotic in self.config.doses_at(frame) {
            let report = session.colony.dose(antibiotic);
            session.doses.push(report);
        }

        if session.colony.is_extinct() && self.config.restart_on_extinction {
            warn!(frame = frame, "Colony went extinct, reseeding");
            session.colony.reset();
            session.restarts += 1;
        }

        let stats = session.colony.stats();
        log_stats(frame, &stats);

        match self.config.max_frames {
            Some(max) if frame >= max => FrameOutcome::Finished,
            _ => FrameOutcome::Continue,
        }
    }

    /// Apply an operator command. `Quit` is left to the caller.
    pub fn apply(&self, command: Command) {
        match command {
            Command::Restart => self.restart(),
            Command::Dose(antibiotic) => {
                self.dose(antibiotic);
            }
            Command::Stats => {
                let session = self.session.lock();
                log_stats(session.frame, &session.colony.stats());
            }
            Command::Quit => debug!("Quit is handled by the command reader"),
        }
    }

    pub fn dose(&self, antibiotic: Antibiotic) -> DoseReport {
        let mut session = self.session.lock();
        let report = session.colony.dose(antibiotic);
        session.doses.push(report);
        report
    }

    pub fn stats(&self) -> ColonyStats {
        self.session.lock().colony.stats()
    }

    pub fn summary(&self) -> RunSummary {
        let session = self.session.lock();
        RunSummary {
            run_id: self.run_id,
            seed: self.config.seed,
            started_at: self.started_at,
            finished_at: Utc::now(),
            frames: session.frame,
            ticks: session.frame * u64::from(self.config.ticks_per_frame),
            restarts: session.restarts,
            doses: session.doses.clone(),
            final_stats: session.colony.stats(),
        }
    }
}

fn log_stats(frame: u64, stats: &ColonyStats) {
    match stats.average_expression {
        Some(average) => info!(
            event = "frame",
            frame = frame,
            tick = stats.tick,
            alive = stats.alive,
            occupancy = stats.occupancy,
            average = average,
            "Average: {:.3}",
            average
        ),
        None => info!(
            event = "frame",
            frame = frame,
            tick = stats.tick,
            alive = 0,
            "Average: no population"
        ),
    }
}

/// End-of-run report logged on shutdown
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub frames: u64,
    /// Ticks driven by the frame timer, across restarts
    pub ticks: u64,
    pub restarts: u32,
    pub doses: Vec<DoseReport>,
    pub final_stats: ColonyStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_core::{ColonyConfig, ScheduledDose};

    fn test_config() -> RunnerConfig {
        RunnerConfig {
            colony: ColonyConfig {
                dimension: 10,
                ..Default::default()
            },
            seed: 42,
            ..Default::default()
        }
    }

    #[test]
    fn test_frame_advances_configured_ticks() {
        let driver = Driver::new(RunId::new(), test_config()).unwrap();
        driver.start();
        assert_eq!(driver.frame(), FrameOutcome::Continue);
        assert_eq!(driver.frame(), FrameOutcome::Continue);

        let stats = driver.stats();
        assert_eq!(stats.tick, 4);
        assert!(stats.alive >= 2);
    }

    #[test]
    fn test_max_frames_finishes() {
        let config = RunnerConfig {
            max_frames: Some(3),
            ..test_config()
        };
        let driver = Driver::new(RunId::new(), config).unwrap();
        driver.start();
        assert_eq!(driver.frame(), FrameOutcome::Continue);
        assert_eq!(driver.frame(), FrameOutcome::Continue);
        assert_eq!(driver.frame(), FrameOutcome::Finished);
    }

    #[test]
    fn test_scheduled_dose_is_recorded() {
        let config = RunnerConfig {
            dose_schedule: vec![ScheduledDose {
                frame: 2,
                antibiotic: Antibiotic::B,
            }],
            ..test_config()
        };
        let driver = Driver::new(RunId::new(), config).unwrap();
        driver.start();
        driver.frame();
        assert!(driver.summary().doses.is_empty());
        driver.frame();

        let summary = driver.summary();
        assert_eq!(summary.doses.len(), 1);
        assert_eq!(summary.doses[0].antibiotic, Antibiotic::B);
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.ticks, 4);
    }

    #[test]
    fn test_restart_on_extinction() {
        let config = RunnerConfig {
            restart_on_extinction: true,
            ..test_config()
        };
        let driver = Driver::new(RunId::new(), config).unwrap();
        // never seeded, so the first frame finds an empty grid
        driver.frame();
        assert_eq!(driver.stats().alive, 1);
        assert_eq!(driver.summary().restarts, 1);
    }

    #[test]
    fn test_startup_seeding_is_not_a_restart() {
        let driver = Driver::new(RunId::new(), test_config()).unwrap();
        driver.start();
        driver.frame();
        assert_eq!(driver.summary().restarts, 0);
        assert!(driver.stats().alive >= 1);

        driver.apply(Command::Restart);
        assert_eq!(driver.summary().restarts, 1);
        assert_eq!(driver.stats().alive, 1);
    }

    #[test]
    fn test_commands_drive_colony() {
        let driver = Driver::new(RunId::new(), test_config()).unwrap();
        driver.apply(Command::Restart);
        assert_eq!(driver.stats().alive, 1);

        while driver.stats().alive > 0 {
            driver.apply(Command::Dose(Antibiotic::A));
        }
        driver.apply(Command::Stats);
        assert!(driver.stats().is_extinct());
        assert!(!driver.summary().doses.is_empty());
    }

    #[test]
    fn test_summary_serializes() {
        let driver = Driver::new(RunId::new(), test_config()).unwrap();
        driver.start();
        driver.frame();
        let json = serde_json::to_string(&driver.summary()).unwrap();
        assert!(json.contains("\"frames\":1"));
        assert!(json.contains("\"final_stats\""));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RunnerConfig {
            ticks_per_frame: 0,
            ..test_config()
        };
        assert!(Driver::new(RunId::new(), config).is_err());
    }
}
