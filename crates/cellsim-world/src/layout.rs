//! Building the first generation of a scenario.

use crate::grid::{Cell, Grid};
use cellsim_core::{Coordinate, InitialLayout, Result, Scenario, Status};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Lay out the initial statuses of a validated scenario.
///
/// Random layouts take exactly one draw per cell, row-major.
pub fn build_grid(scenario: &Scenario, rng: &mut ChaCha8Rng) -> Result<Grid> {
    let grid_config = &scenario.params.grid;
    let mut grid = Grid::new(grid_config.cols, grid_config.rows);

    match &scenario.layout {
        InitialLayout::Explicit { rows } => {
            for (r, row) in rows.iter().enumerate() {
                for (c, status) in row.iter().enumerate() {
                    grid.set(Coordinate::new(c as i32, r as i32), Cell::with_status(*status))?;
                }
            }
        }
        InitialLayout::Sparse { fill, cells } => {
            for cell in grid.cells_mut() {
                *cell = Cell::with_status(*fill);
            }
            for placed in cells {
                grid.set(
                    Coordinate::new(placed.col, placed.row),
                    Cell::with_status(placed.status),
                )?;
            }
        }
        InitialLayout::Random { densities } => {
            for cell in grid.cells_mut() {
                let roll = rng.gen::<f64>();
                let mut threshold = 0.0;
                let mut status = Status::EMPTY;
                for (candidate, density) in densities {
                    threshold += density;
                    if roll < threshold {
                        status = *candidate;
                        break;
                    }
                }
                *cell = Cell::with_status(status);
            }
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsim_core::{GridConfig, PlacedCell, RuleFamily};
    use rand::SeedableRng;

    #[test]
    fn test_explicit_layout() {
        let mut scenario = Scenario::demo(RuleFamily::Fire);
        scenario.params.grid = GridConfig::new(3, 2);
        scenario.layout = InitialLayout::Explicit {
            rows: vec![
                vec![Status(0), Status(1), Status(2)],
                vec![Status(3), Status(1), Status(0)],
            ],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let grid = build_grid(&scenario, &mut rng).unwrap();
        assert_eq!(grid.status(Coordinate::new(2, 0)).unwrap(), Status(2));
        assert_eq!(grid.status(Coordinate::new(0, 1)).unwrap(), Status(3));
    }

    #[test]
    fn test_sparse_layout() {
        let mut scenario = Scenario::demo(RuleFamily::Fire);
        scenario.params.grid = GridConfig::new(4, 4);
        scenario.layout = InitialLayout::Sparse {
            fill: Status(1),
            cells: vec![PlacedCell { col: 3, row: 2, status: Status(2) }],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let grid = build_grid(&scenario, &mut rng).unwrap();
        let counts = grid.population(RuleFamily::Fire);
        assert_eq!(counts.get(Status(1)), 15);
        assert_eq!(grid.status(Coordinate::new(3, 2)).unwrap(), Status(2));
    }

    #[test]
    fn test_random_layout_densities() {
        let mut scenario = Scenario::demo(RuleFamily::Segregation);
        scenario.params.grid = GridConfig::new(50, 50);
        scenario.layout = InitialLayout::Random {
            densities: vec![(Status(1), 0.4), (Status(2), 0.2)],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let grid = build_grid(&scenario, &mut rng).unwrap();
        let counts = grid.population(RuleFamily::Segregation);

        let a = counts.get(Status(1)) as f64 / 2500.0;
        let b = counts.get(Status(2)) as f64 / 2500.0;
        assert!((a - 0.4).abs() < 0.05, "group A share {}", a);
        assert!((b - 0.2).abs() < 0.05, "group B share {}", b);
    }

    #[test]
    fn test_random_layout_is_seeded() {
        let scenario = Scenario::demo(RuleFamily::PredatorPrey);
        let grid_a = build_grid(&scenario, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let grid_b = build_grid(&scenario, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assert_eq!(grid_a, grid_b);
    }
}
