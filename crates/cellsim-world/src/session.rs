//! A loaded scenario and its committed state.

use crate::grid::Grid;
use crate::layout::build_grid;
use crate::rules::{Engine, RuleEngine};
use crate::topology::Topology;
use cellsim_core::{Error, ParameterSet, PopulationCounts, Result, RuleFamily, Scenario};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Everything that belongs to one run: scenario, engine, the committed grid,
/// the generation counter and the random stream.
pub struct Session {
    scenario: Arc<Scenario>,
    engine: Box<dyn RuleEngine + Send>,
    topology: Topology,
    grid: Grid,
    population: PopulationCounts,
    generation: u64,
    rng: ChaCha8Rng,
}

impl Session {
    /// Validate the scenario and lay out generation 0
    pub fn new(scenario: Scenario) -> Result<Self> {
        let engine = Engine::from_params(&scenario.params.rule);
        Self::with_engine(scenario, Box::new(engine))
    }

    /// Like [`Session::new`] but with a caller-supplied engine for the
    /// scenario's family
    #[instrument(skip(scenario, engine), fields(name = %scenario.name, family = %scenario.params.family()))]
    pub fn with_engine(scenario: Scenario, engine: Box<dyn RuleEngine + Send>) -> Result<Self> {
        scenario.validate()?;
        if engine.family() != scenario.params.family() {
            return Err(Error::config(format!(
                "a {} engine cannot run a {} scenario",
                engine.family(),
                scenario.params.family()
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(scenario.seed);
        let topology = Topology::from_params(&scenario.params);

        let mut grid = build_grid(&scenario, &mut rng)?;
        engine.prepare(&mut grid);
        let population = grid.population(engine.family());

        debug!(
            cols = grid.cols(),
            rows = grid.rows(),
            adjacency = ?topology.adjacency,
            edges = ?topology.edges,
            "Session created"
        );

        Ok(Self {
            scenario: Arc::new(scenario),
            engine,
            topology,
            grid,
            population,
            generation: 0,
            rng,
        })
    }

    /// Evaluate one generation and commit it.
    ///
    /// On error nothing changes: grid, counter and random stream stay at the
    /// last committed generation.
    pub fn advance(&mut self) -> Result<u64> {
        let mut rng = self.rng.clone();
        let next = self.engine.evaluate(&self.grid, &self.topology, &mut rng)?;

        if next.cols() != self.grid.cols() || next.rows() != self.grid.rows() {
            return Err(Error::Evaluation(format!(
                "engine produced a {}x{} grid for a {}x{} scenario",
                next.cols(),
                next.rows(),
                self.grid.cols(),
                self.grid.rows()
            )));
        }

        self.population = next.population(self.engine.family());
        self.grid = next;
        self.rng = rng;
        self.generation += 1;
        Ok(self.generation)
    }

    pub fn scenario(&self) -> &Arc<Scenario> {
        &self.scenario
    }

    pub fn params(&self) -> &ParameterSet {
        &self.scenario.params
    }

    pub fn family(&self) -> RuleFamily {
        self.engine.family()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn population(&self) -> &PopulationCounts {
        &self.population
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsim_core::Status;

    #[test]
    fn test_session_creation() {
        let session = Session::new(Scenario::demo(RuleFamily::Life)).unwrap();
        assert_eq!(session.generation(), 0);
        assert_eq!(session.population().get(Status(1)), 8);
        assert_eq!(session.family(), RuleFamily::Life);
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        let mut scenario = Scenario::demo(RuleFamily::Fire);
        scenario.params.grid.rows = -3;
        assert!(matches!(Session::new(scenario), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_engine_family_must_match() {
        let engine = Engine::from_params(&cellsim_core::RuleParams::defaults(RuleFamily::Fire));
        let result = Session::with_engine(Scenario::demo(RuleFamily::Life), Box::new(engine));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_advance_counts_generations() {
        let mut session = Session::new(Scenario::demo(RuleFamily::Slime)).unwrap();
        for expected in 1..=5 {
            assert_eq!(session.advance().unwrap(), expected);
        }
        assert_eq!(session.generation(), 5);
    }

    #[test]
    fn test_same_seed_same_history() {
        for family in RuleFamily::all() {
            let history = |seed: u64| {
                let mut scenario = Scenario::demo(family);
                scenario.seed = seed;
                let mut session = Session::new(scenario).unwrap();
                let mut frames = vec![session.grid().to_bytes().unwrap()];
                for _ in 0..8 {
                    session.advance().unwrap();
                    frames.push(session.grid().to_bytes().unwrap());
                }
                frames
            };
            assert_eq!(history(11), history(11), "{} is not deterministic", family);
        }
    }

    #[test]
    fn test_every_family_on_single_cell() {
        for family in RuleFamily::all() {
            for status in 0..family.status_count() {
                let mut scenario = Scenario::demo(family);
                scenario.params.grid = cellsim_core::GridConfig::new(1, 1);
                scenario.layout = cellsim_core::InitialLayout::Explicit {
                    rows: vec![vec![Status(status)]],
                };
                let mut session = Session::new(scenario).unwrap();
                for _ in 0..20 {
                    session.advance().unwrap();
                }
                assert_eq!(session.population().total(), 1);
            }
        }
    }
}
