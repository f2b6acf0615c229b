//! 2D grid of cells.

use cellsim_core::{Coordinate, Error, PopulationCounts, Result, RuleFamily, Status};
use serde::{Deserialize, Serialize};

use crate::topology::Topology;

/// A single automaton unit. Fields a rule does not use stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub status: Status,
    /// Predator-prey agent energy
    pub energy: i32,
    /// Predator-prey ticks since last birth
    pub breed_timer: u32,
    /// Fire ticks left before a burning cell burns out
    pub burn_remaining: u32,
    /// Segregation verdict from the last evaluation
    pub satisfied: bool,
    /// Slime attractant level
    pub chemical: f32,
}

impl Cell {
    pub fn with_status(status: Status) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status == Status::EMPTY
    }
}

/// A bounded, row-major grid. Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cols: i32,
    rows: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(cols: i32, rows: i32) -> Self {
        let size = (cols.max(0) as usize) * (rows.max(0) as usize);
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); size],
        }
    }

    /// Build a grid from row-major cells
    pub fn from_cells(cols: i32, rows: i32, cells: Vec<Cell>) -> Result<Self> {
        let expected = (cols.max(0) as usize) * (rows.max(0) as usize);
        if cells.len() != expected {
            return Err(Error::Evaluation(format!(
                "{} cells do not fill a {}x{} grid",
                cells.len(),
                cols,
                rows
            )));
        }
        Ok(Self { cols, rows, cells })
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        at.in_bounds(self.cols, self.rows)
    }

    pub fn index_of(&self, at: Coordinate) -> Result<usize> {
        if !self.contains(at) {
            return Err(Error::OutOfBounds {
                coordinate: at,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok((at.row * self.cols + at.col) as usize)
    }

    /// Get coordinate from index
    pub fn coordinate_of(&self, index: usize) -> Coordinate {
        let col = (index as i32) % self.cols;
        let row = (index as i32) / self.cols;
        Coordinate::new(col, row)
    }

    pub fn cell(&self, at: Coordinate) -> Result<&Cell> {
        let index = self.index_of(at)?;
        Ok(&self.cells[index])
    }

    pub fn cell_mut(&mut self, at: Coordinate) -> Result<&mut Cell> {
        let index = self.index_of(at)?;
        Ok(&mut self.cells[index])
    }

    pub fn set(&mut self, at: Coordinate, cell: Cell) -> Result<()> {
        *self.cell_mut(at)? = cell;
        Ok(())
    }

    pub fn status(&self, at: Coordinate) -> Result<Status> {
        Ok(self.cell(at)?.status)
    }

    /// Neighbors of `at` under the given topology
    pub fn neighbors(&self, at: Coordinate, topology: &Topology) -> Result<Vec<Coordinate>> {
        topology.neighbors(at, self.cols, self.rows)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Iterator over all cells with coordinates, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.coordinate_of(i), cell))
    }

    /// Coordinate → status view handed to renderers
    pub fn statuses(&self) -> impl Iterator<Item = (Coordinate, Status)> + '_ {
        self.iter().map(|(at, cell)| (at, cell.status))
    }

    /// Count cells per status, including zero entries for the family's statuses
    pub fn population(&self, family: RuleFamily) -> PopulationCounts {
        let mut counts = PopulationCounts::for_family(family);
        for cell in &self.cells {
            counts.record(cell.status);
        }
        counts
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let grid: Grid = bincode::deserialize(bytes)?;
        Grid::from_cells(grid.cols, grid.rows, grid.cells)
    }
}
