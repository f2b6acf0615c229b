//! Life-like growth.

use super::{count_neighbors, RuleEngine};
use crate::grid::{Cell, Grid};
use crate::topology::Topology;
use cellsim_core::{LifeParams, Result, RuleFamily, Status};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

pub const DEAD: Status = Status(0);
pub const ALIVE: Status = Status(1);

#[derive(Debug, Clone)]
pub struct Life {
    params: LifeParams,
}

impl Life {
    pub fn new(params: LifeParams) -> Self {
        Self { params }
    }

    fn next_status(&self, status: Status, living: u32) -> Status {
        match status {
            ALIVE if living < self.params.survive_min || living > self.params.survive_max => DEAD,
            DEAD if living == self.params.birth => ALIVE,
            other => other,
        }
    }
}

impl RuleEngine for Life {
    fn family(&self) -> RuleFamily {
        RuleFamily::Life
    }

    fn evaluate(&self, current: &Grid, topology: &Topology, _rng: &mut ChaCha8Rng) -> Result<Grid> {
        // Each cell only reads the snapshot, so cells are independent
        let cells = (0..current.len())
            .into_par_iter()
            .map(|index| -> Result<Cell> {
                let at = current.coordinate_of(index);
                let living = count_neighbors(current, topology, at, ALIVE)? as u32;
                let status = current.cells()[index].status;
                Ok(Cell::with_status(self.next_status(status, living)))
            })
            .collect::<Result<Vec<Cell>>>()?;

        Grid::from_cells(current.cols(), current.rows(), cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::*;
    use rand::SeedableRng;

    fn run(grid: &Grid, generations: usize) -> Grid {
        let life = Life::new(LifeParams::default());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut grid = grid.clone();
        for _ in 0..generations {
            grid = life.evaluate(&grid, &moore(), &mut rng).unwrap();
        }
        grid
    }

    #[test]
    fn test_blinker_oscillates() {
        let start = grid_from(&["00000", "00000", "01110", "00000", "00000"]);
        let once = run(&start, 1);
        assert_eq!(rows_of(&once), vec!["00000", "00100", "00100", "00100", "00000"]);
        assert_eq!(run(&start, 2), start);
    }

    #[test]
    fn test_block_is_still() {
        let start = grid_from(&["0000", "0110", "0110", "0000"]);
        assert_eq!(run(&start, 5), start);
    }

    #[test]
    fn test_glider_moves_diagonally() {
        let start = grid_from(&[
            "01000000", "00100000", "11100000", "00000000", "00000000", "00000000", "00000000",
            "00000000",
        ]);
        let after = run(&start, 4);
        assert_eq!(
            rows_of(&after),
            vec![
                "00000000", "00100000", "00010000", "01110000", "00000000", "00000000",
                "00000000", "00000000",
            ]
        );
    }

    #[test]
    fn test_single_cell_grid() {
        let alive = grid_from(&["1"]);
        assert_eq!(rows_of(&run(&alive, 1)), vec!["0"]);

        let dead = grid_from(&["0"]);
        assert_eq!(rows_of(&run(&dead, 3)), vec!["0"]);
    }

    #[test]
    fn test_custom_thresholds() {
        // B1/S0-8: any dead cell touching life is born, nothing dies
        let life = Life::new(LifeParams {
            birth: 1,
            survive_min: 0,
            survive_max: 8,
        });
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let next = life
            .evaluate(&grid_from(&["000", "010", "000"]), &moore(), &mut rng)
            .unwrap();
        assert_eq!(rows_of(&next), vec!["111", "111", "111"]);
    }
}
