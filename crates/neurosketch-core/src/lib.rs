//! Core types and utilities shared by the neurosketch simulations.

pub mod types;
pub mod config;
pub mod error;
pub mod random;
pub mod stats;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use random::RandomSource;
pub use stats::*;
