//! Neighbor resolution under an adjacency rule and edge policy.

use cellsim_core::{Adjacency, Coordinate, EdgePolicy, Error, ParameterSet, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub adjacency: Adjacency,
    pub edges: EdgePolicy,
}

impl Topology {
    pub fn new(adjacency: Adjacency, edges: EdgePolicy) -> Self {
        Self { adjacency, edges }
    }

    pub fn from_params(params: &ParameterSet) -> Self {
        Self::new(params.adjacency(), params.edges())
    }

    /// Neighbors of `at` inside a `cols` x `rows` grid, row-major.
    ///
    /// A cell is never its own neighbor, and wrap-around targets that land on
    /// the same cell are reported once, so a 1x1 grid has no neighbors under
    /// either edge policy.
    pub fn neighbors(&self, at: Coordinate, cols: i32, rows: i32) -> Result<Vec<Coordinate>> {
        if cols <= 0 || rows <= 0 {
            return Ok(Vec::new());
        }
        if !at.in_bounds(cols, rows) {
            return Err(Error::OutOfBounds {
                coordinate: at,
                cols,
                rows,
            });
        }

        let offsets = self.adjacency.offsets().iter().map(|&(dc, dr)| at.offset(dc, dr));

        let neighbors = match self.edges {
            // Offsets are already row-major, filtering keeps the order
            EdgePolicy::Bounded => offsets.filter(|n| n.in_bounds(cols, rows)).collect(),
            EdgePolicy::Toroidal => {
                let mut wrapped: Vec<Coordinate> = offsets
                    .map(|n| n.wrap(cols, rows))
                    .filter(|n| *n != at)
                    .collect();
                wrapped.sort();
                wrapped.dedup();
                wrapped
            }
        };

        Ok(neighbors)
    }
}
