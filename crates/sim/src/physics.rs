//! Shared physics and timing constants.
//!
//! All stages read these instead of defining their own copies. Keeping them
//! in one module prevents drift between subsystems and makes tuning easier.

/// Fixed simulation rate in ticks per second.
pub const TICK_HZ: f64 = 120.0;

/// Gravity acceleration in cells/tick², scaled from 9.81 m/s².
///
/// Multiplied by each material's `gravity_scale` and baked into the
/// per-material fixed-point gravity step at table build time.
pub const GRAVITY_ACCEL: f32 = 0.08;

/// Side length of a chunk in cells. Chunks are the unit of idle-region
/// pruning: only cells inside active chunks are visited by the stages.
pub const CHUNK_SIZE: i32 = 32;

/// Default grid dimensions.
pub const DEFAULT_WIDTH: i32 = 512;
pub const DEFAULT_HEIGHT: i32 = 512;

/// How many fixed ticks the accumulator may hold before it is clamped.
/// Prevents the spiral of death after a long frame stall.
pub const MAX_ACCUMULATED_TICKS: f64 = 5.0;

// Thermal constants.

/// Room temperature in °C. Empty cells relax toward this, and every cell
/// leaks toward it at `AMBIENT_COOLING_RATE` per tick.
pub const AMBIENT_TEMP: f32 = 20.0;

/// Fraction of the neighbor heat differential applied per tick.
pub const HEAT_DIFFUSION_RATE: f32 = 0.15;

/// Temperature a burning cell is clamped to.
pub const FIRE_TEMPERATURE: f32 = 800.0;

/// Per-tick pull toward ambient for non-empty cells.
pub const AMBIENT_COOLING_RATE: f32 = 0.001;

/// Temperature clamp range in °C.
pub const MIN_TEMPERATURE: f32 = -100.0;
pub const MAX_TEMPERATURE: f32 = 2000.0;

/// Impact speed (cells/tick) above which a powder landing in fluid splashes.
pub const IMPACT_SPLASH_THRESHOLD: f32 = 1.5;

/// Sentinel for "never melts/boils/ignites" temperatures.
pub const TEMP_NEVER: f32 = 9999.0;
