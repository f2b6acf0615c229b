//! Wolf/sheep predator-prey dynamics.
//!
//! A generation runs in two sub-phases. Sheep move first, reading the
//! snapshot and writing an intermediate grid; wolves then move, reading that
//! intermediate grid and writing the result. Within a sub-phase agents are
//! visited in row-major order of the grid they are read from, so each agent
//! is handled exactly once no matter where it ends up.

use super::{free_neighbors, RuleEngine};
use crate::grid::{Cell, Grid};
use crate::topology::Topology;
use cellsim_core::{Coordinate, PredatorPreyParams, Result, RuleFamily, SpeciesParams, Status};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

pub const EMPTY: Status = Status(0);
pub const SHEEP: Status = Status(1);
pub const WOLF: Status = Status(2);

#[derive(Debug, Clone)]
pub struct PredatorPrey {
    params: PredatorPreyParams,
}

/// Output buffer of one sub-phase plus the cells already spoken for in it
struct Phase<'a> {
    input: &'a Grid,
    next: Grid,
    claimed: Vec<bool>,
}

impl<'a> Phase<'a> {
    /// Start from `input` with every agent of `species` lifted off the board
    fn new(input: &'a Grid, species: Status) -> Self {
        let mut next = input.clone();
        for cell in next.cells_mut() {
            if cell.status == species {
                *cell = Cell::with_status(EMPTY);
            }
        }
        Self {
            input,
            next,
            claimed: vec![false; input.len()],
        }
    }

    fn claim(&mut self, at: Coordinate) -> Result<()> {
        let index = self.input.index_of(at)?;
        self.claimed[index] = true;
        Ok(())
    }

    fn free_neighbors(&self, topology: &Topology, at: Coordinate) -> Result<Vec<Coordinate>> {
        free_neighbors(self.input, &self.claimed, topology, at)
    }

    /// Metabolism, death and breeding for an agent that has arrived at `dest`
    fn settle(
        &mut self,
        topology: &Topology,
        rng: &mut ChaCha8Rng,
        origin: Coordinate,
        dest: Coordinate,
        mut agent: Cell,
        species: &SpeciesParams,
    ) -> Result<()> {
        agent.energy -= species.metabolism;
        if agent.energy <= 0 {
            trace!(at = %dest, status = %agent.status, "Agent starved");
            return Ok(());
        }

        agent.breed_timer += 1;
        if agent.breed_timer >= species.breed_threshold && agent.energy - species.breed_cost > 0 {
            // A mover leaves its young behind; a stayer needs a free neighbor
            let nursery = if dest != origin {
                Some(origin)
            } else {
                self.free_neighbors(topology, dest)?.choose(rng).copied()
            };

            if let Some(spot) = nursery {
                self.claim(spot)?;
                self.next.set(
                    spot,
                    Cell {
                        status: agent.status,
                        energy: species.initial_energy,
                        ..Default::default()
                    },
                )?;
                agent.energy -= species.breed_cost;
                agent.breed_timer = 0;
            }
        }

        self.next.set(dest, agent)
    }
}

impl PredatorPrey {
    pub fn new(params: PredatorPreyParams) -> Self {
        Self { params }
    }

    fn move_sheep(&self, current: &Grid, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Grid> {
        let mut phase = Phase::new(current, SHEEP);

        for (at, cell) in current.iter().filter(|(_, c)| c.status == SHEEP) {
            let dest = phase.free_neighbors(topology, at)?.choose(rng).copied().unwrap_or(at);
            phase.claim(dest)?;
            phase.settle(topology, rng, at, dest, cell.clone(), &self.params.sheep)?;
        }

        Ok(phase.next)
    }

    fn move_wolves(&self, grazed: &Grid, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Grid> {
        let mut phase = Phase::new(grazed, WOLF);
        let mut eaten = vec![false; grazed.len()];

        for (at, cell) in grazed.iter().filter(|(_, c)| c.status == WOLF) {
            let mut agent = cell.clone();

            let mut prey = Vec::new();
            for n in grazed.neighbors(at, topology)? {
                if grazed.status(n)? == SHEEP && !eaten[grazed.index_of(n)?] {
                    prey.push(n);
                }
            }

            let dest = match prey.choose(rng).copied() {
                Some(target) => {
                    eaten[grazed.index_of(target)?] = true;
                    phase.next.set(target, Cell::with_status(EMPTY))?;
                    agent.energy += self.params.wolf_food_gain;
                    trace!(wolf = %at, sheep = %target, "Sheep eaten");
                    target
                }
                None => phase.free_neighbors(topology, at)?.choose(rng).copied().unwrap_or(at),
            };

            phase.claim(dest)?;
            phase.settle(topology, rng, at, dest, agent, &self.params.wolf)?;
        }

        Ok(phase.next)
    }
}

impl RuleEngine for PredatorPrey {
    fn family(&self) -> RuleFamily {
        RuleFamily::PredatorPrey
    }

    fn prepare(&self, grid: &mut Grid) {
        for cell in grid.cells_mut() {
            let energy = match cell.status {
                SHEEP => self.params.sheep.initial_energy,
                WOLF => self.params.wolf.initial_energy,
                _ => 0,
            };
            if cell.energy == 0 {
                cell.energy = energy;
            }
        }
    }

    fn evaluate(&self, current: &Grid, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Grid> {
        let grazed = self.move_sheep(current, topology, rng)?;
        self.move_wolves(&grazed, topology, rng)
    }
}
