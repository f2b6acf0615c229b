//! Schelling segregation.

use super::RuleEngine;
use crate::grid::{Cell, Grid};
use crate::topology::Topology;
use cellsim_core::{Coordinate, RelocationPolicy, Result, RuleFamily, SegregationParams, Status};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

pub const EMPTY: Status = Status(0);
pub const GROUP_A: Status = Status(1);
pub const GROUP_B: Status = Status(2);

#[derive(Debug, Clone)]
pub struct Segregation {
    params: SegregationParams,
}

impl Segregation {
    pub fn new(params: SegregationParams) -> Self {
        Self { params }
    }

    /// An occupant with no occupied neighbors has nobody to object to
    fn is_satisfied(&self, grid: &Grid, topology: &Topology, at: Coordinate, group: Status) -> Result<bool> {
        let mut like = 0usize;
        let mut occupied = 0usize;
        for n in grid.neighbors(at, topology)? {
            let status = grid.status(n)?;
            if status != EMPTY {
                occupied += 1;
                if status == group {
                    like += 1;
                }
            }
        }

        if occupied == 0 {
            return Ok(true);
        }
        Ok(like as f64 / occupied as f64 >= self.params.satisfaction)
    }
}

impl RuleEngine for Segregation {
    fn family(&self) -> RuleFamily {
        RuleFamily::Segregation
    }

    fn evaluate(&self, current: &Grid, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Grid> {
        let mut next = current.clone();
        let mut vacancies = Vec::new();
        let mut unsatisfied = Vec::new();

        for (at, cell) in current.iter() {
            if cell.status == EMPTY {
                vacancies.push(at);
                continue;
            }
            let satisfied = self.is_satisfied(current, topology, at, cell.status)?;
            next.cell_mut(at)?.satisfied = satisfied;
            if !satisfied {
                unsatisfied.push(at);
            }
        }

        // Only cells empty in the snapshot are offered, each at most once
        for from in unsatisfied {
            if vacancies.is_empty() {
                break;
            }
            let to = match self.params.relocation {
                RelocationPolicy::Random => {
                    let pick = rng.gen_range(0..vacancies.len());
                    vacancies.swap_remove(pick)
                }
                RelocationPolicy::FirstVacant => vacancies.remove(0),
            };

            trace!(from = %from, to = %to, "Relocating unsatisfied resident");
            let mover = Cell {
                satisfied: false,
                ..current.cell(from)?.clone()
            };
            next.set(to, mover)?;
            next.set(from, Cell::with_status(EMPTY))?;
        }

        Ok(next)
    }
}
