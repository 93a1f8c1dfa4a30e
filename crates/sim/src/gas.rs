//! Gas stage: smoke dissipation, steam condensation, and buoyant movement
//! with horizontal spread and bubble-up through fluids.
//!
//! Fire is also a gas-state material but is handled by its own stage; this
//! one covers smoke and steam.

use crate::iter;
use crate::material::{materials, Material};
use crate::simulation::Simulation;
use crate::world::{World, FLAG_UPDATED};

/// Chance per tick for smoke to vanish, scaled up with age.
pub const SMOKE_DISSIPATE_CHANCE: f32 = 0.006;
/// Chance per tick for smoke to attempt rising.
pub const SMOKE_RISE_CHANCE: f32 = 0.85;
/// Chance to drift sideways when the way up is blocked.
pub const SMOKE_SPREAD_CHANCE: f32 = 0.3;

/// Steam rises more eagerly than smoke.
pub const STEAM_RISE_CHANCE: f32 = 0.9;
/// Base chance per tick for cool steam to condense back to water.
pub const STEAM_CONDENSE_CHANCE: f32 = 0.01;
/// Steam below this temperature may condense.
pub const STEAM_CONDENSE_TEMP: f32 = 80.0;

pub fn update(sim: &mut Simulation, world: &mut World) {
    iter::for_each_rising(sim, world, |sim, world, x, y| {
        update_cell(sim, world, x, y);
        true
    });
}

fn update_cell(sim: &mut Simulation, world: &mut World, x: i32, y: i32) -> bool {
    if world.has_flag(x, y, FLAG_UPDATED) {
        return false;
    }

    let mat = world.get_mat(x, y);
    if !materials().is_gas(mat) || mat == Material::Fire {
        return false;
    }

    let idx = world.idx(x, y);
    world.lifetime[idx] = world.lifetime[idx].saturating_add(1);

    // Smoke thins out, faster with age.
    if mat == Material::Smoke {
        let dissipate_chance =
            SMOKE_DISSIPATE_CHANCE * (1.0 + world.lifetime[idx] as f32 / 100.0);
        if sim.randf() < dissipate_chance {
            world.set_mat(x, y, Material::Empty);
            world.lifetime[idx] = 0;
            world.add_flag(x, y, FLAG_UPDATED);
            world.cells_updated += 1;
            return true;
        }
    }

    // Cool steam condenses back to water.
    if mat == Material::Steam && world.temp[idx] < STEAM_CONDENSE_TEMP {
        let condense_chance = STEAM_CONDENSE_CHANCE
            * (STEAM_CONDENSE_TEMP - world.temp[idx])
            / STEAM_CONDENSE_TEMP;
        if sim.randf() < condense_chance {
            world.set_mat(x, y, Material::Water);
            world.lifetime[idx] = 0;
            world.add_flag(x, y, FLAG_UPDATED);
            world.cells_updated += 1;
            return true;
        }
    }

    let rise_chance = if mat == Material::Steam {
        STEAM_RISE_CHANCE
    } else {
        SMOKE_RISE_CHANCE
    };
    if sim.randf() > rise_chance {
        return false;
    }

    let mut new_x = x;
    let mut new_y = y;
    let mut moved = false;

    // Straight up, then up-diagonal with a coin-flip tie-break.
    if crate::fire::gas_can_move_to(world, x, y - 1) {
        new_y = y - 1;
        moved = true;
    } else {
        let can_ul = crate::fire::gas_can_move_to(world, x - 1, y - 1);
        let can_ur = crate::fire::gas_can_move_to(world, x + 1, y - 1);
        if can_ul && can_ur {
            new_x = if sim.coin_flip() { x - 1 } else { x + 1 };
            new_y = y - 1;
            moved = true;
        } else if can_ul {
            new_x = x - 1;
            new_y = y - 1;
            moved = true;
        } else if can_ur {
            new_x = x + 1;
            new_y = y - 1;
            moved = true;
        }
    }

    // Sideways drift when capped.
    if !moved && sim.randf() < SMOKE_SPREAD_CHANCE {
        let can_l = crate::fire::gas_can_move_to(world, x - 1, y);
        let can_r = crate::fire::gas_can_move_to(world, x + 1, y);
        if can_l && can_r {
            new_x = if sim.coin_flip() { x - 1 } else { x + 1 };
            moved = true;
        } else if can_l {
            new_x = x - 1;
            moved = true;
        } else if can_r {
            new_x = x + 1;
            moved = true;
        }
    }

    // Bubble up through a fluid directly above.
    if !moved && world.in_bounds(x, y - 1) && materials().is_fluid(world.get_mat(x, y - 1)) {
        new_y = y - 1;
        moved = true;
    }

    if moved {
        world.swap_cells(x, y, new_x, new_y);
        world.add_flag(new_x, new_y, FLAG_UPDATED);
        world.add_flag(x, y, FLAG_UPDATED);
        world.cells_updated += 1;
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_rises() {
        let mut sim = Simulation::with_seed(120.0, 5);
        let mut world = World::new(64, 64);
        world.set_mat(32, 50, Material::Smoke);

        for _ in 0..60 {
            sim.tick(&mut world);
        }

        // Either it dissipated or it is higher than it started.
        let found = (0..64)
            .flat_map(|x| (0..64).map(move |y| (x, y)))
            .find(|&(x, y)| world.get_mat(x, y) == Material::Smoke);
        if let Some((_, y)) = found {
            assert!(y < 50, "smoke sank instead of rising: y={}", y);
        }
    }

    #[test]
    fn smoke_eventually_dissipates() {
        let mut sim = Simulation::with_seed(120.0, 5);
        let mut world = World::new(32, 32);
        // Ceiling so the smoke cannot leave the area before fading.
        for x in 0..32 {
            world.set_mat(x, 4, Material::Stone);
        }
        for x in 10..20 {
            world.set_mat(x, 6, Material::Smoke);
        }

        for _ in 0..4000 {
            sim.tick(&mut world);
        }

        let smoke_left = (0..32)
            .flat_map(|x| (0..32).map(move |y| (x, y)))
            .filter(|&(x, y)| world.get_mat(x, y) == Material::Smoke)
            .count();
        assert_eq!(smoke_left, 0, "smoke should fade within a few thousand ticks");
    }

    #[test]
    fn cold_steam_condenses_to_water() {
        let mut sim = Simulation::with_seed(120.0, 5);
        let mut world = World::new(32, 32);
        // Sealed pocket keeps the steam in place while it cools.
        for x in 9..=11 {
            for y in 10..=12 {
                world.set_mat(x, y, Material::Stone);
            }
        }
        world.set_mat(10, 11, Material::Steam);

        let mut became_water = false;
        for _ in 0..3000 {
            sim.tick(&mut world);
            let here = world.get_mat(10, 11);
            if here == Material::Water {
                became_water = true;
                break;
            }
            assert!(
                here == Material::Steam || here == Material::Water,
                "steam turned into {:?}",
                here
            );
        }
        assert!(became_water, "ambient-temperature steam must condense");
    }

    #[test]
    fn gas_bubbles_up_through_water() {
        let mut sim = Simulation::with_seed(120.0, 5);
        let mut world = World::new(32, 32);
        // Water column with smoke trapped at the bottom.
        for x in 14..=16 {
            world.set_mat(x, 25, Material::Stone);
        }
        for y in 18..25 {
            world.set_mat(14, y, Material::Stone);
            world.set_mat(16, y, Material::Stone);
        }
        for y in 18..24 {
            world.set_mat(15, y, Material::Water);
        }
        world.set_mat(15, 24, Material::Smoke);

        for _ in 0..200 {
            sim.tick(&mut world);
        }

        // The smoke is gone or above where it started; it must not be stuck
        // under the water column.
        let smoke_at_bottom = world.get_mat(15, 24) == Material::Smoke;
        assert!(!smoke_at_bottom, "gas failed to bubble up through fluid");
    }
}
