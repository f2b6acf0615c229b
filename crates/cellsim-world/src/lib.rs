//! Simulation engine.
//!
//! The grid and its neighbor topology, one rule engine per automaton family,
//! and the controller that turns timer ticks into committed generations.

pub mod grid;
pub mod topology;
pub mod rules;
pub mod layout;
pub mod session;
pub mod observer;
pub mod controller;

pub use grid::{Cell, Grid};
pub use topology::Topology;
pub use rules::{Engine, RuleEngine};
pub use layout::build_grid;
pub use session::Session;
pub use observer::{GenerationObserver, GenerationView, MetricsObserver, PopulationHistory, PopulationSample};
pub use controller::{ControllerState, GenerationController, Summary, DEFAULT_RATE};
