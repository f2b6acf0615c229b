//! Configuration types for the simulation.
//!
//! Everything here is plain serde data. `validate()` is the single gate a
//! scenario passes before the engine sees it; nothing is clamped or repaired.

use crate::error::{Error, Result};
use crate::types::{Adjacency, EdgePolicy, RuleFamily, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on cells per grid
pub const MAX_CELLS: i64 = 4096 * 4096;

/// Grid dimensions and neighbor policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns
    pub cols: i32,
    /// Number of rows
    pub rows: i32,
    /// Neighbor adjacency (family default when absent)
    #[serde(default)]
    pub adjacency: Option<Adjacency>,
    /// Edge handling
    #[serde(default)]
    pub edges: EdgePolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: 20,
            rows: 20,
            adjacency: None,
            edges: EdgePolicy::Bounded,
        }
    }
}

impl GridConfig {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self {
            cols,
            rows,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cols <= 0 || self.rows <= 0 {
            return Err(Error::config(format!(
                "grid dimensions must be positive, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.cols as i64 * self.rows as i64 > MAX_CELLS {
            return Err(Error::config(format!(
                "grid of {}x{} exceeds {} cells",
                self.cols, self.rows, MAX_CELLS
            )));
        }
        Ok(())
    }
}

/// Life-like growth thresholds (B3/S23 by default)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeParams {
    /// Living neighbors that bring a dead cell to life
    pub birth: u32,
    /// Fewer living neighbors than this kills a living cell
    pub survive_min: u32,
    /// More living neighbors than this kills a living cell
    pub survive_max: u32,
}

impl Default for LifeParams {
    fn default() -> Self {
        Self {
            birth: 3,
            survive_min: 2,
            survive_max: 3,
        }
    }
}

impl LifeParams {
    fn validate(&self, adjacency: Adjacency) -> Result<()> {
        let max = adjacency.max_neighbors();
        if self.birth == 0 || self.birth > max {
            return Err(Error::config(format!(
                "life birth threshold must be in 1..={}, got {}",
                max, self.birth
            )));
        }
        if self.survive_min > self.survive_max || self.survive_max > max {
            return Err(Error::config(format!(
                "life survival range {}..={} must be ordered and within 0..={}",
                self.survive_min, self.survive_max, max
            )));
        }
        Ok(())
    }
}

/// Where unsatisfied residents move to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationPolicy {
    /// Uniform pick among the remaining vacancies
    #[default]
    Random,
    /// Lowest row-major vacancy
    FirstVacant,
}

/// Schelling segregation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegregationParams {
    /// Minimum fraction of like neighbors among occupied neighbors (0.0 to 1.0)
    pub satisfaction: f64,
    #[serde(default)]
    pub relocation: RelocationPolicy,
}

impl Default for SegregationParams {
    fn default() -> Self {
        Self {
            satisfaction: 0.3,
            relocation: RelocationPolicy::Random,
        }
    }
}

/// Fire spreading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireParams {
    /// Chance a tree next to fire catches (0.0 to 1.0)
    pub probability: f64,
    /// Ticks a cell stays burning
    #[serde(default = "default_burn_duration")]
    pub burn_duration: u32,
    /// Chance a burned cell grows back into a tree
    #[serde(default)]
    pub regrow_probability: f64,
}

fn default_burn_duration() -> u32 {
    1
}

impl Default for FireParams {
    fn default() -> Self {
        Self {
            probability: 0.5,
            burn_duration: 1,
            regrow_probability: 0.0,
        }
    }
}

impl FireParams {
    fn validate(&self) -> Result<()> {
        check_probability("fire probability", self.probability)?;
        check_probability("fire regrow probability", self.regrow_probability)?;
        if self.burn_duration == 0 {
            return Err(Error::config("fire burn duration must be at least 1"));
        }
        Ok(())
    }
}

/// Energy economy of one predator-prey species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Energy of agents placed at load and of newborns
    pub initial_energy: i32,
    /// Energy lost every tick
    pub metabolism: i32,
    /// Ticks between births
    pub breed_threshold: u32,
    /// Energy the parent pays per birth
    pub breed_cost: i32,
}

impl SpeciesParams {
    fn validate(&self, species: &str) -> Result<()> {
        if self.initial_energy <= 0 {
            return Err(Error::config(format!(
                "{} initial energy must be positive",
                species
            )));
        }
        if self.metabolism < 0 || self.breed_cost < 0 {
            return Err(Error::config(format!(
                "{} metabolism and breed cost must not be negative",
                species
            )));
        }
        if self.breed_threshold == 0 {
            return Err(Error::config(format!(
                "{} breed threshold must be at least 1",
                species
            )));
        }
        Ok(())
    }
}

/// Wolf/sheep parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredatorPreyParams {
    pub sheep: SpeciesParams,
    pub wolf: SpeciesParams,
    /// Energy a wolf gains per sheep eaten
    pub wolf_food_gain: i32,
}

impl Default for PredatorPreyParams {
    fn default() -> Self {
        Self {
            sheep: SpeciesParams {
                initial_energy: 1,
                metabolism: 0,
                breed_threshold: 4,
                breed_cost: 0,
            },
            wolf: SpeciesParams {
                initial_energy: 6,
                metabolism: 1,
                breed_threshold: 12,
                breed_cost: 2,
            },
            wolf_food_gain: 3,
        }
    }
}

/// Slime mold aggregation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlimeParams {
    /// Chemical each agent drops per tick
    pub deposit: f32,
    /// Share of a cell's chemical replaced by the neighbor average (0.0 to 1.0)
    pub diffusion: f32,
    /// Share of chemical lost per tick (0.0 to 1.0)
    pub evaporation: f32,
    /// Weakest signal an agent will follow instead of wandering
    #[serde(default)]
    pub sniff_threshold: f32,
}

impl Default for SlimeParams {
    fn default() -> Self {
        Self {
            deposit: 2.0,
            diffusion: 0.5,
            evaporation: 0.1,
            sniff_threshold: 0.5,
        }
    }
}

impl SlimeParams {
    fn validate(&self) -> Result<()> {
        check_probability("slime diffusion", self.diffusion as f64)?;
        check_probability("slime evaporation", self.evaporation as f64)?;
        if !self.deposit.is_finite() || self.deposit < 0.0 {
            return Err(Error::config("slime deposit must be finite and non-negative"));
        }
        if !self.sniff_threshold.is_finite() || self.sniff_threshold < 0.0 {
            return Err(Error::config(
                "slime sniff threshold must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Rule-specific parameters, tagged by family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum RuleParams {
    Life(LifeParams),
    Segregation(SegregationParams),
    Fire(FireParams),
    PredatorPrey(PredatorPreyParams),
    Slime(SlimeParams),
}

impl RuleParams {
    pub fn family(&self) -> RuleFamily {
        match self {
            RuleParams::Life(_) => RuleFamily::Life,
            RuleParams::Segregation(_) => RuleFamily::Segregation,
            RuleParams::Fire(_) => RuleFamily::Fire,
            RuleParams::PredatorPrey(_) => RuleFamily::PredatorPrey,
            RuleParams::Slime(_) => RuleFamily::Slime,
        }
    }

    /// Default parameters for a family
    pub fn defaults(family: RuleFamily) -> Self {
        match family {
            RuleFamily::Life => RuleParams::Life(LifeParams::default()),
            RuleFamily::Segregation => RuleParams::Segregation(SegregationParams::default()),
            RuleFamily::Fire => RuleParams::Fire(FireParams::default()),
            RuleFamily::PredatorPrey => RuleParams::PredatorPrey(PredatorPreyParams::default()),
            RuleFamily::Slime => RuleParams::Slime(SlimeParams::default()),
        }
    }

    /// The parameter shown next to the step counter in the info panel
    pub fn headline(&self) -> String {
        match self {
            RuleParams::Life(p) => format!("B{}/S{}-{}", p.birth, p.survive_min, p.survive_max),
            RuleParams::Segregation(p) => format!("Satisfaction: {}", p.satisfaction),
            RuleParams::Fire(p) => format!("Probability: {}", p.probability),
            RuleParams::PredatorPrey(p) => format!(
                "Sheep breed: {} | Wolf breed: {} | Wolf gain: {}",
                p.sheep.breed_threshold, p.wolf.breed_threshold, p.wolf_food_gain
            ),
            RuleParams::Slime(p) => format!(
                "Deposit: {} | Diffusion: {} | Evaporation: {}",
                p.deposit, p.diffusion, p.evaporation
            ),
        }
    }
}

/// Validated, immutable configuration consumed by a rule engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub grid: GridConfig,
    pub rule: RuleParams,
    /// Display color per status ("#RRGGBB"); family defaults fill the gaps
    #[serde(default)]
    pub colors: BTreeMap<Status, String>,
}

impl ParameterSet {
    pub fn new(grid: GridConfig, rule: RuleParams) -> Self {
        Self {
            grid,
            rule,
            colors: BTreeMap::new(),
        }
    }

    pub fn family(&self) -> RuleFamily {
        self.rule.family()
    }

    pub fn adjacency(&self) -> Adjacency {
        self.grid
            .adjacency
            .unwrap_or_else(|| self.family().default_adjacency())
    }

    pub fn edges(&self) -> EdgePolicy {
        self.grid.edges
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;

        match &self.rule {
            RuleParams::Life(p) => p.validate(self.adjacency())?,
            RuleParams::Segregation(p) => check_probability("segregation satisfaction", p.satisfaction)?,
            RuleParams::Fire(p) => p.validate()?,
            RuleParams::PredatorPrey(p) => {
                p.sheep.validate("sheep")?;
                p.wolf.validate("wolf")?;
                if p.wolf_food_gain < 0 {
                    return Err(Error::config("wolf food gain must not be negative"));
                }
            }
            RuleParams::Slime(p) => p.validate()?,
        }

        let family = self.family();
        for (status, color) in &self.colors {
            if !family.is_valid_status(*status) {
                return Err(Error::config(format!(
                    "color given for status {} which {} does not have",
                    status, family
                )));
            }
            if !is_hex_color(color) {
                return Err(Error::config(format!(
                    "color {:?} for status {} is not #RRGGBB",
                    color, status
                )));
            }
        }

        Ok(())
    }

    /// Display color of a status
    pub fn color_of(&self, status: Status) -> Option<String> {
        self.colors
            .get(&status)
            .cloned()
            .or_else(|| self.family().default_colors().remove(&status))
    }

    /// Reverse lookup used by chart legends
    pub fn status_of_color(&self, color: &str) -> Option<Status> {
        (0..self.family().status_count())
            .map(Status)
            .find(|s| {
                self.color_of(*s)
                    .map(|c| c.eq_ignore_ascii_case(color))
                    .unwrap_or(false)
            })
    }
}

/// A cell placed by a sparse layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub col: i32,
    pub row: i32,
    pub status: Status,
}

/// How the first generation is populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialLayout {
    /// One status per cell, row-major
    Explicit { rows: Vec<Vec<Status>> },
    /// Background status plus listed cells
    Sparse {
        #[serde(default)]
        fill: Status,
        cells: Vec<PlacedCell>,
    },
    /// `(status, fraction)` pairs; the rest get status 0
    Random { densities: Vec<(Status, f64)> },
}

impl InitialLayout {
    fn validate(&self, family: RuleFamily, grid: &GridConfig) -> Result<()> {
        let check_status = |status: Status| {
            if family.is_valid_status(status) {
                Ok(())
            } else {
                Err(Error::config(format!(
                    "status {} is not valid for {}",
                    status, family
                )))
            }
        };

        match self {
            InitialLayout::Explicit { rows } => {
                if rows.len() != grid.rows as usize {
                    return Err(Error::config(format!(
                        "layout has {} rows, grid has {}",
                        rows.len(),
                        grid.rows
                    )));
                }
                for (r, row) in rows.iter().enumerate() {
                    if row.len() != grid.cols as usize {
                        return Err(Error::config(format!(
                            "layout row {} has {} cells, grid has {} columns",
                            r,
                            row.len(),
                            grid.cols
                        )));
                    }
                    row.iter().try_for_each(|s| check_status(*s))?;
                }
            }
            InitialLayout::Sparse { fill, cells } => {
                check_status(*fill)?;
                for cell in cells {
                    check_status(cell.status)?;
                    if cell.col < 0 || cell.col >= grid.cols || cell.row < 0 || cell.row >= grid.rows {
                        return Err(Error::config(format!(
                            "layout cell ({}, {}) is outside the {}x{} grid",
                            cell.col, cell.row, grid.cols, grid.rows
                        )));
                    }
                }
            }
            InitialLayout::Random { densities } => {
                let mut total = 0.0;
                for (i, (status, density)) in densities.iter().enumerate() {
                    check_status(*status)?;
                    if densities[..i].iter().any(|(seen, _)| seen == status) {
                        return Err(Error::config(format!(
                            "layout density for status {} given twice",
                            status
                        )));
                    }
                    check_probability("layout density", *density)?;
                    total += density;
                }
                if total > 1.0 + 1e-9 {
                    return Err(Error::config(format!(
                        "layout densities sum to {}, more than 1",
                        total
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Everything needed to start a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Random seed for reproducibility
    #[serde(default)]
    pub seed: u64,
    pub params: ParameterSet,
    pub layout: InitialLayout,
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::config("scenario name must not be empty"));
        }
        self.params.validate()?;
        self.layout.validate(self.params.family(), &self.params.grid)
    }

    /// Decode and validate a JSON scenario. Missing or malformed fields are
    /// configuration errors.
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("malformed scenario: {}", e)))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Built-in starting point for each family
    pub fn demo(family: RuleFamily) -> Self {
        let rule = RuleParams::defaults(family);
        let (grid, layout) = match family {
            RuleFamily::Life => {
                // Glider in the top-left, blinker in the middle
                let live = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2), (9, 10), (10, 10), (11, 10)];
                (
                    GridConfig::new(20, 20),
                    InitialLayout::Sparse {
                        fill: Status(0),
                        cells: live
                            .iter()
                            .map(|&(col, row)| PlacedCell { col, row, status: Status(1) })
                            .collect(),
                    },
                )
            }
            RuleFamily::Segregation => (
                GridConfig::new(20, 20),
                InitialLayout::Random {
                    densities: vec![(Status(1), 0.4), (Status(2), 0.4)],
                },
            ),
            RuleFamily::Fire => (
                GridConfig::new(21, 21),
                InitialLayout::Sparse {
                    fill: Status(1),
                    cells: vec![PlacedCell { col: 10, row: 10, status: Status(2) }],
                },
            ),
            RuleFamily::PredatorPrey => (
                GridConfig::new(20, 20),
                InitialLayout::Random {
                    densities: vec![(Status(1), 0.3), (Status(2), 0.05)],
                },
            ),
            RuleFamily::Slime => (
                GridConfig::new(30, 30),
                InitialLayout::Random {
                    densities: vec![(Status(1), 0.15)],
                },
            ),
        };

        Self {
            name: family.name().to_string(),
            seed: 0,
            params: ParameterSet::new(grid, rule),
            layout,
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
