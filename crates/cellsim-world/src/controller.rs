//! Generation controller: load, start, stop, step and timer ticks.

use crate::grid::Grid;
use crate::observer::{GenerationObserver, GenerationView};
use crate::session::Session;
use cellsim_core::{Error, PopulationCounts, Result, RuleFamily, Scenario};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Steps per second used until `set_rate` is called
pub const DEFAULT_RATE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    /// No scenario loaded
    Idle,
    /// Scenario loaded, not advancing
    Ready,
    /// Advancing on every tick
    Running,
    /// Advancing a single generation
    Stepping,
}

/// Text shown in the info panel next to the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub name: String,
    pub family: RuleFamily,
    pub rows: i32,
    pub cols: i32,
    pub generation: u64,
    pub rate: f64,
    pub headline: String,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Simulation name: {} ({})\nNumber of rows: {} | Number of columns: {} | Step speed: {} | \nStep: {} | {}",
            self.name, self.family, self.rows, self.cols, self.rate, self.generation, self.headline
        )
    }
}

pub struct GenerationController {
    state: ControllerState,
    session: Option<Session>,
    rate: f64,
    delay: Duration,
    observers: Vec<Box<dyn GenerationObserver>>,
}

impl GenerationController {
    pub fn new() -> Self {
        Self {
            state: ControllerState::Idle,
            session: None,
            rate: DEFAULT_RATE,
            delay: Duration::from_secs_f64(1.0 / DEFAULT_RATE),
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn GenerationObserver>) {
        self.observers.push(observer);
    }

    /// Replace the current scenario. A rejected scenario leaves the previous
    /// session, state and counter untouched.
    #[instrument(skip(self, scenario), fields(name = %scenario.name))]
    pub fn load(&mut self, scenario: Scenario) -> Result<()> {
        match Session::new(scenario) {
            Ok(session) => {
                self.load_session(session);
                Ok(())
            }
            Err(e) => {
                warn!(event = "load_rejected", error = %e, "Scenario rejected");
                Err(e)
            }
        }
    }

    /// Install an already built session and reset to `Ready`
    pub fn load_session(&mut self, session: Session) {
        info!(
            event = "scenario_loaded",
            family = %session.family(),
            cols = session.grid().cols(),
            rows = session.grid().rows(),
            seed = session.scenario().seed,
            "Scenario loaded"
        );

        let view = GenerationView {
            scenario: session.scenario(),
            grid: session.grid(),
            generation: session.generation(),
            population: session.population(),
        };
        for observer in &mut self.observers {
            observer.on_load(&view);
        }

        self.session = Some(session);
        self.state = ControllerState::Ready;
    }

    /// Begin continuous play
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            ControllerState::Idle => Err(Error::InvalidState(
                "no scenario loaded; load one before starting".to_string(),
            )),
            ControllerState::Running => Ok(()),
            ControllerState::Ready | ControllerState::Stepping => {
                info!(rate = self.rate, "Simulation started");
                self.state = ControllerState::Running;
                Ok(())
            }
        }
    }

    /// Halt continuous play at the next generation boundary
    pub fn stop(&mut self) {
        if matches!(self.state, ControllerState::Running | ControllerState::Stepping) {
            info!(generation = self.generation(), "Simulation stopped");
            self.state = ControllerState::Ready;
        }
    }

    /// Advance exactly one generation and return to `Ready`. Called while
    /// running, this switches back to step mode first.
    pub fn step(&mut self) -> Result<u64> {
        match self.state {
            ControllerState::Idle => {
                return Err(Error::InvalidState(
                    "no scenario loaded; load one before stepping".to_string(),
                ))
            }
            ControllerState::Running => self.stop(),
            ControllerState::Ready | ControllerState::Stepping => {}
        }

        self.state = ControllerState::Stepping;
        let result = self.advance();
        self.state = ControllerState::Ready;
        result
    }

    /// Timer callback. Advances only while running; returns the new
    /// generation when one was committed.
    pub fn tick(&mut self) -> Result<Option<u64>> {
        if self.state != ControllerState::Running {
            return Ok(None);
        }
        self.advance().map(Some)
    }

    /// Set the running speed in steps per second. The resulting delay must
    /// be a representable, non-zero `Duration`.
    pub fn set_rate(&mut self, steps_per_second: f64) -> Result<()> {
        if !steps_per_second.is_finite() || steps_per_second <= 0.0 {
            return Err(Error::config(format!(
                "rate must be a positive number of steps per second, got {}",
                steps_per_second
            )));
        }
        let delay = match Duration::try_from_secs_f64(1.0 / steps_per_second) {
            Ok(delay) if !delay.is_zero() => delay,
            _ => {
                return Err(Error::config(format!(
                    "rate {} steps per second gives no usable tick interval",
                    steps_per_second
                )))
            }
        };

        self.rate = steps_per_second;
        self.delay = delay;
        debug!(rate = steps_per_second, delay_ms = delay.as_millis() as u64, "Rate changed");
        Ok(())
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Interval between ticks in running mode
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ControllerState::Running
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.session.as_ref().map(Session::grid)
    }

    pub fn population(&self) -> Option<&PopulationCounts> {
        self.session.as_ref().map(Session::population)
    }

    pub fn generation(&self) -> u64 {
        self.session.as_ref().map(Session::generation).unwrap_or(0)
    }

    pub fn summary(&self) -> Option<Summary> {
        self.session.as_ref().map(|session| {
            let scenario = session.scenario();
            Summary {
                name: scenario.name.clone(),
                family: session.family(),
                rows: session.grid().rows(),
                cols: session.grid().cols(),
                generation: session.generation(),
                rate: self.rate,
                headline: scenario.params.rule.headline(),
            }
        })
    }

    fn advance(&mut self) -> Result<u64> {
        let Some(session) = self.session.as_mut() else {
            return Err(Error::InvalidState("no scenario loaded".to_string()));
        };

        match session.advance() {
            Ok(generation) => {
                debug!(generation, occupied = session.population().occupied(), "Generation committed");
                let view = GenerationView {
                    scenario: session.scenario(),
                    grid: session.grid(),
                    generation,
                    population: session.population(),
                };
                for observer in &mut self.observers {
                    observer.on_generation(&view);
                }
                Ok(generation)
            }
            Err(e) => {
                warn!(
                    event = "generation_failed",
                    generation = session.generation(),
                    error = %e,
                    "Generation failed, keeping last committed grid"
                );
                self.state = ControllerState::Ready;
                for observer in &mut self.observers {
                    observer.on_failure(&e);
                }
                Err(e)
            }
        }
    }
}

impl Default for GenerationController {
    fn default() -> Self {
        Self::new()
    }
}
