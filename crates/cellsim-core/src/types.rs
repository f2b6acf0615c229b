//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Cell position as (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub col: i32,
    pub row: i32,
}

impl Coordinate {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn offset(&self, dc: i32, dr: i32) -> Self {
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }

    /// Apply toroidal wrapping for given grid dimensions
    pub fn wrap(&self, cols: i32, rows: i32) -> Self {
        Self {
            col: ((self.col % cols) + cols) % cols,
            row: ((self.row % rows) + rows) % rows,
        }
    }

    pub fn in_bounds(&self, cols: i32, rows: i32) -> bool {
        self.col >= 0 && self.col < cols && self.row >= 0 && self.row < rows
    }
}

// Row-major: everything that iterates neighbors or agents relies on this order.
impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Discrete cell state. The meaning of each value depends on the rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub u8);

impl Status {
    /// Status 0 is the background state of every family (dead / empty).
    pub const EMPTY: Status = Status(0);
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which neighbors count as adjacent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjacency {
    /// 4-connected: north, west, east, south
    Orthogonal,
    /// 8-connected: orthogonal plus diagonals
    Moore,
}

impl Adjacency {
    /// Neighbor deltas as (dc, dr), in row-major order.
    pub fn offsets(&self) -> &'static [(i32, i32)] {
        match self {
            Adjacency::Orthogonal => &[(0, -1), (-1, 0), (1, 0), (0, 1)],
            Adjacency::Moore => &[
                (-1, -1),
                (0, -1),
                (1, -1),
                (-1, 0),
                (1, 0),
                (-1, 1),
                (0, 1),
                (1, 1),
            ],
        }
    }

    pub fn max_neighbors(&self) -> u32 {
        self.offsets().len() as u32
    }
}

/// How coordinates past the grid edge are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Off-grid neighbors do not exist
    #[default]
    Bounded,
    /// Edges wrap around
    Toroidal,
}

/// The five supported automaton behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    Life,
    Segregation,
    Fire,
    PredatorPrey,
    Slime,
}

impl RuleFamily {
    pub fn all() -> [RuleFamily; 5] {
        [
            RuleFamily::Life,
            RuleFamily::Segregation,
            RuleFamily::Fire,
            RuleFamily::PredatorPrey,
            RuleFamily::Slime,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuleFamily::Life => "Game of Life",
            RuleFamily::Segregation => "Segregation",
            RuleFamily::Fire => "Fire",
            RuleFamily::PredatorPrey => "Predator",
            RuleFamily::Slime => "Slime",
        }
    }

    /// Human readable name of each status, indexed by status value
    pub fn status_names(&self) -> &'static [&'static str] {
        match self {
            RuleFamily::Life => &["dead", "alive"],
            RuleFamily::Segregation => &["empty", "group A", "group B"],
            RuleFamily::Fire => &["empty", "tree", "burning", "burned"],
            RuleFamily::PredatorPrey => &["empty", "sheep", "wolf"],
            RuleFamily::Slime => &["empty", "slime"],
        }
    }

    pub fn status_count(&self) -> u8 {
        self.status_names().len() as u8
    }

    pub fn is_valid_status(&self, status: Status) -> bool {
        status.0 < self.status_count()
    }

    pub fn status_name(&self, status: Status) -> Option<&'static str> {
        self.status_names().get(status.0 as usize).copied()
    }

    pub fn default_adjacency(&self) -> Adjacency {
        match self {
            RuleFamily::Life | RuleFamily::Segregation | RuleFamily::Slime => Adjacency::Moore,
            RuleFamily::Fire | RuleFamily::PredatorPrey => Adjacency::Orthogonal,
        }
    }

    /// Display palette used when a scenario does not supply one
    pub fn default_colors(&self) -> BTreeMap<Status, String> {
        let palette: &[&str] = match self {
            RuleFamily::Life => &["#FFFFFF", "#000000"],
            RuleFamily::Segregation => &["#FFFFFF", "#FF0000", "#0000FF"],
            RuleFamily::Fire => &["#FFFF00", "#008000", "#FF0000", "#5A3A1A"],
            RuleFamily::PredatorPrey => &["#ADD8E6", "#FFFFFF", "#808080"],
            RuleFamily::Slime => &["#000000", "#00FF00"],
        };

        palette
            .iter()
            .enumerate()
            .map(|(i, color)| (Status(i as u8), color.to_string()))
            .collect()
    }
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "life" | "game_of_life" => Ok(RuleFamily::Life),
            "segregation" => Ok(RuleFamily::Segregation),
            "fire" => Ok(RuleFamily::Fire),
            "predator_prey" | "predator" | "wator" => Ok(RuleFamily::PredatorPrey),
            "slime" => Ok(RuleFamily::Slime),
            other => Err(format!("unknown rule family: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_wrap() {
        assert_eq!(Coordinate::new(5, 5).wrap(10, 10), Coordinate::new(5, 5));
        assert_eq!(Coordinate::new(-1, -1).wrap(10, 10), Coordinate::new(9, 9));
        assert_eq!(Coordinate::new(10, 10).wrap(10, 10), Coordinate::new(0, 0));
    }

    #[test]
    fn test_coordinate_order_is_row_major() {
        let mut coords = vec![
            Coordinate::new(0, 1),
            Coordinate::new(2, 0),
            Coordinate::new(1, 0),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![
                Coordinate::new(1, 0),
                Coordinate::new(2, 0),
                Coordinate::new(0, 1),
            ]
        );
    }

    #[test]
    fn test_adjacency_offsets_sorted() {
        for adjacency in [Adjacency::Orthogonal, Adjacency::Moore] {
            let coords: Vec<Coordinate> = adjacency
                .offsets()
                .iter()
                .map(|&(dc, dr)| Coordinate::new(dc, dr))
                .collect();
            let mut sorted = coords.clone();
            sorted.sort();
            assert_eq!(coords, sorted);
        }
        assert_eq!(Adjacency::Orthogonal.max_neighbors(), 4);
        assert_eq!(Adjacency::Moore.max_neighbors(), 8);
    }

    #[test]
    fn test_family_statuses() {
        assert_eq!(RuleFamily::Fire.status_count(), 4);
        assert!(RuleFamily::Life.is_valid_status(Status(1)));
        assert!(!RuleFamily::Life.is_valid_status(Status(2)));
        assert_eq!(RuleFamily::PredatorPrey.status_name(Status(2)), Some("wolf"));
        for family in RuleFamily::all() {
            assert_eq!(family.default_colors().len(), family.status_count() as usize);
        }
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("game-of-life".parse::<RuleFamily>(), Ok(RuleFamily::Life));
        assert_eq!("Predator".parse::<RuleFamily>(), Ok(RuleFamily::PredatorPrey));
        assert!("langton".parse::<RuleFamily>().is_err());
    }
}
