//! World simulation engines.
//!
//! Two independent simulations share this crate: a double-buffered cellular
//! automaton on a toroidal grid, and a population of network-driven agents on
//! the unit torus that evolves from episode to episode.

pub mod grid;
pub mod automaton;
pub mod agent;
pub mod selection;
pub mod population;
pub mod sketch;

pub use grid::{Grid, Pattern};
pub use automaton::{column_stripes, random_soup, Automaton, GameOfLife, Rule};
pub use agent::Agent;
pub use selection::{policy_for, RankBiasedSelection, SelectionPolicy, UniformSelection};
pub use population::{Elimination, Population, TickReport};
pub use sketch::{LifeSketch, NeuroSketch, Sketch};
