//! Slime mold aggregation over a diffusing attractant field.

use super::{free_neighbors, RuleEngine};
use crate::grid::{Cell, Grid};
use crate::topology::Topology;
use cellsim_core::{Coordinate, Result, RuleFamily, SlimeParams, Status};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

pub const EMPTY: Status = Status(0);
pub const SLIME: Status = Status(1);

#[derive(Debug, Clone)]
pub struct Slime {
    params: SlimeParams,
}

impl Slime {
    pub fn new(params: SlimeParams) -> Self {
        Self { params }
    }

    /// Where the agent at `at` goes, judged on the snapshot's field
    fn choose_destination(
        &self,
        current: &Grid,
        claimed: &[bool],
        topology: &Topology,
        at: Coordinate,
        rng: &mut ChaCha8Rng,
    ) -> Result<Coordinate> {
        let free = free_neighbors(current, claimed, topology, at)?;
        if free.is_empty() {
            return Ok(at);
        }

        let mut scored = Vec::with_capacity(free.len());
        for n in free {
            scored.push((n, current.cell(n)?.chemical));
        }
        let best = scored
            .iter()
            .map(|(_, chemical)| *chemical)
            .fold(f32::NEG_INFINITY, f32::max);

        let candidates: Vec<Coordinate> = if best >= self.params.sniff_threshold {
            scored
                .iter()
                .filter(|(_, chemical)| *chemical == best)
                .map(|(n, _)| *n)
                .collect()
        } else {
            scored.iter().map(|(n, _)| *n).collect()
        };

        Ok(candidates.choose(rng).copied().unwrap_or(at))
    }

    /// Diffuse and evaporate the snapshot field, then add this tick's deposits
    fn diffuse(&self, current: &Grid, topology: &Topology, deposits: &[f32], next: &mut Grid) -> Result<()> {
        let keep = 1.0 - self.params.evaporation;
        let diffusion = self.params.diffusion;

        for (index, cell) in current.cells().iter().enumerate() {
            let at = current.coordinate_of(index);
            let neighbors = current.neighbors(at, topology)?;

            let spread = if neighbors.is_empty() {
                cell.chemical
            } else {
                let mut sum = 0.0f32;
                for n in &neighbors {
                    sum += current.cell(*n)?.chemical;
                }
                let mean = sum / neighbors.len() as f32;
                (1.0 - diffusion) * cell.chemical + diffusion * mean
            };

            next.cells_mut()[index].chemical = keep * spread + deposits[index];
        }
        Ok(())
    }
}

impl RuleEngine for Slime {
    fn family(&self) -> RuleFamily {
        RuleFamily::Slime
    }

    fn evaluate(&self, current: &Grid, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Grid> {
        let mut next = Grid::new(current.cols(), current.rows());
        let mut claimed = vec![false; current.len()];
        let mut deposits = vec![0.0f32; current.len()];

        // Movement: every decision reads the pre-diffusion field
        for (at, cell) in current.iter().filter(|(_, c)| c.status == SLIME) {
            let dest = self.choose_destination(current, &claimed, topology, at, rng)?;
            let index = current.index_of(dest)?;
            claimed[index] = true;
            deposits[index] += self.params.deposit;
            next.set(dest, Cell::with_status(cell.status))?;
        }

        // Field update, only once all moves are final
        self.diffuse(current, topology, &deposits, &mut next)?;

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::*;
    use rand::SeedableRng;

    fn slime(deposit: f32, diffusion: f32, evaporation: f32, sniff_threshold: f32) -> Slime {
        Slime::new(SlimeParams {
            deposit,
            diffusion,
            evaporation,
            sniff_threshold,
        })
    }

    #[test]
    fn test_moves_toward_strongest_signal() {
        let engine = slime(1.0, 0.0, 0.0, 0.0);
        let mut grid = grid_from(&["000", "010", "000"]);
        grid.cell_mut(Coordinate::new(2, 0)).unwrap().chemical = 5.0;
        grid.cell_mut(Coordinate::new(0, 2)).unwrap().chemical = 1.0;

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let next = engine.evaluate(&grid, &moore(), &mut rng).unwrap();
        assert_eq!(rows_of(&next), vec!["001", "000", "000"]);

        // No diffusion or evaporation: old field kept, deposit added
        assert_eq!(next.cell(Coordinate::new(2, 0)).unwrap().chemical, 6.0);
        assert_eq!(next.cell(Coordinate::new(0, 2)).unwrap().chemical, 1.0);
    }

    #[test]
    fn test_agents_do_not_collide() {
        let engine = slime(1.0, 0.0, 0.0, 0.0);
        // Both agents want the single scented cell between them
        let mut grid = grid_from(&["101"]);
        grid.cell_mut(Coordinate::new(1, 0)).unwrap().chemical = 3.0;

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let next = engine.evaluate(&grid, &moore(), &mut rng).unwrap();
        assert_eq!(rows_of(&next), vec!["011"]);
    }

    #[test]
    fn test_field_uses_pre_diffusion_values() {
        let engine = slime(0.0, 1.0, 0.5, 0.0);
        let mut grid = grid_from(&["000"]);
        grid.cell_mut(Coordinate::new(0, 0)).unwrap().chemical = 4.0;

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let next = engine.evaluate(&grid, &moore(), &mut rng).unwrap();
        let field: Vec<f32> = next.cells().iter().map(|c| c.chemical).collect();
        // Full diffusion replaces each cell by its neighbor mean, then halves it
        assert_eq!(field, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_agent_count_is_conserved() {
        let engine = slime(2.0, 0.5, 0.1, 0.5);
        let mut grid = grid_from(&["10010", "01000", "00101", "10000", "00011"]);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let before = grid.population(RuleFamily::Slime).get(SLIME);
        for _ in 0..10 {
            grid = engine.evaluate(&grid, &moore(), &mut rng).unwrap();
            assert_eq!(grid.population(RuleFamily::Slime).get(SLIME), before);
        }
    }

    #[test]
    fn test_single_cell_grid() {
        let engine = slime(1.0, 0.5, 0.5, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut grid = grid_from(&["1"]);
        grid = engine.evaluate(&grid, &moore(), &mut rng).unwrap();
        assert_eq!(rows_of(&grid), vec!["1"]);
        assert_eq!(grid.cells()[0].chemical, 1.0);
        grid = engine.evaluate(&grid, &moore(), &mut rng).unwrap();
        assert_eq!(grid.cells()[0].chemical, 1.5);
    }
}
