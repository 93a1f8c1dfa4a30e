//! Falling-sand tick engine.
//!
//! A fixed-size SoA grid of material cells advanced at a fixed tick rate
//! through six ordered stages: powder, fluid, fire, gas, acid, thermal.
//! Chunk activation masks prune idle regions, and all per-tick randomness
//! flows from one seeded stream, so runs are reproducible.
//!
//! This crate is framework-agnostic - it handles simulation only. Frontends
//! plug in through the collaborator seams in [`snapshot`].

pub mod acid;
pub mod behavior;
pub mod config;
pub mod fire;
pub mod fixed;
pub mod fluid;
pub mod gas;
pub mod iter;
pub mod material;
pub mod physics;
pub mod powder;
pub mod rng;
pub mod simulation;
pub mod snapshot;
pub mod thermal;
pub mod world;

pub use config::SimConfig;
pub use material::{materials, Color, Material, MaterialProps, MaterialState};
pub use simulation::{Simulation, TickProfile};
pub use snapshot::{
    apply_event, paint_stroke, FrameSink, FrameSnapshot, InputEvent, InputSource, OverlayMode,
};
pub use world::{World, FLAG_BURNING, FLAG_UPDATED};
