//! Fire spreading through a forest.

use super::{count_neighbors, RuleEngine};
use crate::grid::{Cell, Grid};
use crate::topology::Topology;
use cellsim_core::{FireParams, Result, RuleFamily, Status};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub const EMPTY: Status = Status(0);
pub const TREE: Status = Status(1);
pub const BURNING: Status = Status(2);
pub const BURNED: Status = Status(3);

#[derive(Debug, Clone)]
pub struct Fire {
    params: FireParams,
}

impl Fire {
    pub fn new(params: FireParams) -> Self {
        Self { params }
    }

    fn ignited(&self) -> Cell {
        Cell {
            status: BURNING,
            burn_remaining: self.params.burn_duration,
            ..Default::default()
        }
    }
}

impl RuleEngine for Fire {
    fn family(&self) -> RuleFamily {
        RuleFamily::Fire
    }

    fn prepare(&self, grid: &mut Grid) {
        for cell in grid.cells_mut() {
            if cell.status == BURNING && cell.burn_remaining == 0 {
                cell.burn_remaining = self.params.burn_duration;
            }
        }
    }

    fn evaluate(&self, current: &Grid, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Grid> {
        let mut next = current.clone();

        // One draw per candidate tree in row-major order, whatever the
        // outcome, so no cell's result shifts another cell's draw
        for (at, cell) in current.iter() {
            match cell.status {
                TREE => {
                    if count_neighbors(current, topology, at, BURNING)? > 0 {
                        let draw: f64 = rng.gen();
                        if draw < self.params.probability {
                            next.set(at, self.ignited())?;
                        }
                    }
                }
                BURNING => {
                    let left = cell.burn_remaining.saturating_sub(1);
                    if left == 0 {
                        next.set(at, Cell::with_status(BURNED))?;
                    } else {
                        next.cell_mut(at)?.burn_remaining = left;
                    }
                }
                BURNED if self.params.regrow_probability > 0.0 => {
                    let draw: f64 = rng.gen();
                    if draw < self.params.regrow_probability {
                        next.set(at, Cell::with_status(TREE))?;
                    }
                }
                _ => {}
            }
        }

        Ok(next)
    }
}
