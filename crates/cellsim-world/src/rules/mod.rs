//! Rule engines, one per family.
//!
//! Every engine reads only the snapshot it is handed and returns a new grid.
//! Engines with ordered sub-phases build a complete intermediate grid per
//! sub-phase; the next sub-phase reads only that.

pub mod fire;
pub mod life;
pub mod predator;
pub mod segregation;
pub mod slime;

pub use fire::Fire;
pub use life::Life;
pub use predator::PredatorPrey;
pub use segregation::Segregation;
pub use slime::Slime;

use crate::grid::Grid;
use crate::topology::Topology;
use cellsim_core::{Coordinate, Result, RuleFamily, RuleParams, Status};
use rand_chacha::ChaCha8Rng;

/// One generation of one automaton family
pub trait RuleEngine {
    fn family(&self) -> RuleFamily;

    /// Fill in per-rule attributes on a freshly laid out grid
    fn prepare(&self, _grid: &mut Grid) {}

    /// Produce the next generation from `current`
    fn evaluate(&self, current: &Grid, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Grid>;
}

/// The closed set of engines, selected by the parameter tag
#[derive(Debug, Clone)]
pub enum Engine {
    Life(Life),
    Segregation(Segregation),
    Fire(Fire),
    PredatorPrey(PredatorPrey),
    Slime(Slime),
}

impl Engine {
    pub fn from_params(params: &RuleParams) -> Self {
        match params {
            RuleParams::Life(p) => Engine::Life(Life::new(p.clone())),
            RuleParams::Segregation(p) => Engine::Segregation(Segregation::new(p.clone())),
            RuleParams::Fire(p) => Engine::Fire(Fire::new(p.clone())),
            RuleParams::PredatorPrey(p) => Engine::PredatorPrey(PredatorPrey::new(p.clone())),
            RuleParams::Slime(p) => Engine::Slime(Slime::new(p.clone())),
        }
    }

    fn inner(&self) -> &dyn RuleEngine {
        match self {
            Engine::Life(e) => e,
            Engine::Segregation(e) => e,
            Engine::Fire(e) => e,
            Engine::PredatorPrey(e) => e,
            Engine::Slime(e) => e,
        }
    }
}

impl RuleEngine for Engine {
    fn family(&self) -> RuleFamily {
        self.inner().family()
    }

    fn prepare(&self, grid: &mut Grid) {
        self.inner().prepare(grid)
    }

    fn evaluate(&self, current: &Grid, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Grid> {
        self.inner().evaluate(current, topology, rng)
    }
}

/// Number of neighbors of `at` holding `status`
pub(crate) fn count_neighbors(
    grid: &Grid,
    topology: &Topology,
    at: Coordinate,
    status: Status,
) -> Result<usize> {
    let mut count = 0;
    for n in grid.neighbors(at, topology)? {
        if grid.status(n)? == status {
            count += 1;
        }
    }
    Ok(count)
}

/// Neighbors of `at` that were empty in `input` and have not been claimed in
/// the buffer being filled
pub(crate) fn free_neighbors(
    input: &Grid,
    claimed: &[bool],
    topology: &Topology,
    at: Coordinate,
) -> Result<Vec<Coordinate>> {
    let mut free = Vec::new();
    for n in input.neighbors(at, topology)? {
        if input.cell(n)?.is_empty() && !claimed[input.index_of(n)?] {
            free.push(n);
        }
    }
    Ok(free)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_engine_matches_family() {
        for family in RuleFamily::all() {
            let engine = Engine::from_params(&RuleParams::defaults(family));
            assert_eq!(engine.family(), family);
        }
    }

    #[test]
    fn test_count_neighbors() {
        let grid = grid_from(&["110", "010", "001"]);
        let n = count_neighbors(&grid, &moore(), Coordinate::new(1, 1), Status(1)).unwrap();
        assert_eq!(n, 3);
        let n = count_neighbors(&grid, &orthogonal(), Coordinate::new(1, 1), Status(1)).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn test_free_neighbors_skip_claimed() {
        let grid = grid_from(&["000", "010", "000"]);
        let mut claimed = vec![false; grid.len()];
        claimed[1] = true;
        let free = free_neighbors(&grid, &claimed, &orthogonal(), Coordinate::new(1, 1)).unwrap();
        assert_eq!(
            free,
            vec![Coordinate::new(0, 1), Coordinate::new(2, 1), Coordinate::new(1, 2)]
        );
    }
}
