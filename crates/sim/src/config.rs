//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::physics::{DEFAULT_HEIGHT, DEFAULT_WIDTH, TICK_HZ};
use crate::simulation::Simulation;
use crate::world::World;

/// Startup configuration for a simulation.
///
/// `seed` pins the master RNG for reproducible runs; `None` seeds from
/// entropy.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: i32,
    pub height: i32,
    pub tick_hz: f64,
    pub seed: Option<u32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_hz: TICK_HZ,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Build the driver and the grid this config describes.
    pub fn build(&self) -> (Simulation, World) {
        let sim = match self.seed {
            Some(seed) => Simulation::with_seed(self.tick_hz, seed),
            None => Simulation::new(self.tick_hz),
        };
        (sim, World::new(self.width, self.height))
    }
}
