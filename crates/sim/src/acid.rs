//! Acid stage: corrosion of neighboring materials.
//!
//! Acid movement is the fluid stage's job (acid is a fluid); this stage only
//! runs the reaction. Each acid cell reacts with at most one neighbor per
//! tick, and every successful reaction half-consumes the acid with an
//! independent roll.

use crate::behavior;
use crate::iter::{self, NEIGHBORS_8};
use crate::material::Material;
use crate::simulation::Simulation;
use crate::world::{World, FLAG_UPDATED};

/// Chance per corrodible neighbor per tick to react.
pub const ACID_CORRODE_CHANCE: f32 = 0.08;
/// Chance a corroded cell leaves smoke instead of nothing.
pub const ACID_SMOKE_CHANCE: f32 = 0.5;
/// Chance the acid survives its own reaction.
pub const ACID_SURVIVE_CHANCE: f32 = 0.5;

pub fn update(sim: &mut Simulation, world: &mut World) {
    iter::for_each_falling(sim, world, |sim, world, x, y| {
        update_cell(sim, world, x, y);
        true
    });
}

fn update_cell(sim: &mut Simulation, world: &mut World, x: i32, y: i32) -> bool {
    if world.get_mat(x, y) != Material::Acid {
        return false;
    }

    for (dx, dy) in NEIGHBORS_8 {
        let nx = x + dx;
        let ny = y + dy;
        if !world.in_bounds(nx, ny) {
            continue;
        }

        let neighbor = world.get_mat(nx, ny);
        if !behavior::is_corrodible(neighbor) {
            continue;
        }
        if sim.randf() >= ACID_CORRODE_CHANCE {
            continue;
        }

        // The target dissolves into smoke or nothing.
        if sim.randf() < ACID_SMOKE_CHANCE {
            world.set_mat(nx, ny, Material::Smoke);
            let nidx = world.idx(nx, ny);
            world.lifetime[nidx] = 0;
        } else {
            world.set_mat(nx, ny, Material::Empty);
        }

        // Independent roll: the acid is spent half the time.
        if sim.randf() < ACID_SURVIVE_CHANCE {
            world.set_mat(x, y, Material::Empty);
        }

        world.add_flag(x, y, FLAG_UPDATED);
        world.add_flag(nx, ny, FLAG_UPDATED);
        world.cells_updated += 1;

        // One reaction per acid cell per tick.
        return true;
    }

    false
}
