//! Collaborators notified after every committed generation.

use crate::grid::Grid;
use cellsim_core::{Error, PopulationCounts, RuleFamily, Scenario};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{event, info, warn, Level};

/// Read-only view of a committed generation
pub struct GenerationView<'a> {
    pub scenario: &'a Scenario,
    pub grid: &'a Grid,
    pub generation: u64,
    pub population: &'a PopulationCounts,
}

impl GenerationView<'_> {
    pub fn family(&self) -> RuleFamily {
        self.scenario.params.family()
    }
}

pub trait GenerationObserver: Send {
    /// A scenario was loaded; `view` is generation 0
    fn on_load(&mut self, _view: &GenerationView<'_>) {}

    fn on_generation(&mut self, view: &GenerationView<'_>);

    /// An advance failed and the previous generation is still current
    fn on_failure(&mut self, _error: &Error) {}
}

/// Logs population metrics every `interval` generations
pub struct MetricsObserver {
    interval: u64,
}

impl MetricsObserver {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
        }
    }

    fn emit(&self, view: &GenerationView<'_>) {
        let family = view.family();
        info!(
            event = "population_metrics",
            scenario = %view.scenario.name,
            family = %family,
            generation = view.generation,
            occupied = view.population.occupied(),
            population = ?view.population.labelled(family),
            "Population metrics snapshot"
        );

        for (status, count) in view.population.iter() {
            event!(
                Level::DEBUG,
                gauge_name = "population",
                gauge_value = count,
                status = family.status_name(status).unwrap_or("unknown"),
                generation = view.generation,
                "Population gauge"
            );
        }
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new(1)
    }
}

impl GenerationObserver for MetricsObserver {
    fn on_load(&mut self, view: &GenerationView<'_>) {
        self.emit(view);
    }

    fn on_generation(&mut self, view: &GenerationView<'_>) {
        if view.generation % self.interval == 0 {
            self.emit(view);
        }
    }

    fn on_failure(&mut self, error: &Error) {
        warn!(event = "generation_failed", error = %error, "Generation failed");
    }
}

/// One point of the population chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationSample {
    pub generation: u64,
    pub population: PopulationCounts,
}

/// Keeps the most recent population counts for charting. Clone the handle
/// from [`PopulationHistory::handle`] before registering the observer.
pub struct PopulationHistory {
    capacity: usize,
    samples: Arc<Mutex<VecDeque<PopulationSample>>>,
}

impl PopulationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn handle(&self) -> Arc<Mutex<VecDeque<PopulationSample>>> {
        self.samples.clone()
    }

    fn push(&self, view: &GenerationView<'_>) {
        let mut samples = self.samples.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(PopulationSample {
            generation: view.generation,
            population: view.population.clone(),
        });
    }
}

impl GenerationObserver for PopulationHistory {
    fn on_load(&mut self, view: &GenerationView<'_>) {
        self.samples.lock().clear();
        self.push(view);
    }

    fn on_generation(&mut self, view: &GenerationView<'_>) {
        self.push(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn view_of(session: &Session) -> GenerationView<'_> {
        GenerationView {
            scenario: session.scenario(),
            grid: session.grid(),
            generation: session.generation(),
            population: session.population(),
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = Session::new(Scenario::demo(RuleFamily::Fire)).unwrap();
        let mut history = PopulationHistory::new(3);
        let handle = history.handle();

        history.on_load(&view_of(&session));
        for _ in 0..5 {
            session.advance().unwrap();
            history.on_generation(&view_of(&session));
        }

        let samples = handle.lock();
        let generations: Vec<u64> = samples.iter().map(|s| s.generation).collect();
        assert_eq!(generations, vec![3, 4, 5]);
    }

    #[test]
    fn test_history_resets_on_load() {
        let session = Session::new(Scenario::demo(RuleFamily::Life)).unwrap();
        let mut history = PopulationHistory::new(10);
        let handle = history.handle();

        history.on_load(&view_of(&session));
        history.on_generation(&view_of(&session));
        history.on_load(&view_of(&session));

        assert_eq!(handle.lock().len(), 1);
    }
}
