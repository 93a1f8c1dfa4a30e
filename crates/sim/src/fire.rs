//! Fire stage: aging, death into ash/smoke/nothing, 8-neighbor spread,
//! smoke emission, and buoyant gas-style movement.

use crate::behavior;
use crate::iter::{self, NEIGHBORS_8};
use crate::material::{materials, Color, Material};
use crate::simulation::Simulation;
use crate::world::{World, FLAG_BURNING, FLAG_UPDATED};

/// Chance to rise each tick.
pub const FIRE_RISE_CHANCE: f32 = 0.6;
/// Chance to die each tick.
pub const FIRE_DIE_CHANCE: f32 = 0.02;
/// Chance per neighbor per tick to ignite a flammable cell.
pub const FIRE_SPREAD_CHANCE: f32 = 0.03;
/// Chance to emit smoke into the cell above.
pub const FIRE_SMOKE_CHANCE: f32 = 0.15;
/// Forced death age in ticks.
pub const FIRE_MAX_LIFETIME: u8 = 120;

/// Age-indexed flame ramp, hot to cool. One entry per 20 ticks of lifetime.
pub const FIRE_PALETTE: [Color; 6] = [
    Color::rgba(255, 255, 200, 255),
    Color::rgba(255, 220, 100, 255),
    Color::rgba(255, 150, 50, 255),
    Color::rgba(255, 80, 20, 255),
    Color::rgba(200, 50, 20, 255),
    Color::rgba(100, 30, 10, 255),
];

/// Flame color for a fire cell's age.
#[inline]
pub fn color_for_age(lifetime: u8) -> Color {
    let idx = (lifetime / 20).min(5) as usize;
    FIRE_PALETTE[idx]
}

/// Gases (and fire) move only into empty cells.
pub fn gas_can_move_to(world: &World, x: i32, y: i32) -> bool {
    if !world.in_bounds(x, y) {
        return false;
    }
    materials().is_empty(world.get_mat(x, y))
}

/// Ignite a flammable cell.
pub fn try_ignite(world: &mut World, x: i32, y: i32) -> bool {
    if behavior::is_flammable(world.get_mat(x, y)) {
        world.set_mat(x, y, Material::Fire);
        world.add_flag(x, y, FLAG_BURNING);
        return true;
    }
    false
}

pub fn update(sim: &mut Simulation, world: &mut World) {
    iter::for_each_falling(sim, world, |sim, world, x, y| {
        update_cell(sim, world, x, y);
        true
    });
}

fn update_cell(sim: &mut Simulation, world: &mut World, x: i32, y: i32) -> bool {
    if world.has_flag(x, y, FLAG_UPDATED) {
        return false;
    }
    if world.get_mat(x, y) != Material::Fire {
        return false;
    }

    let idx = world.idx(x, y);
    world.lifetime[idx] = world.lifetime[idx].saturating_add(1);

    // Death by chance, or forced at max age.
    let should_die =
        sim.randf() < FIRE_DIE_CHANCE || world.lifetime[idx] >= FIRE_MAX_LIFETIME;
    if should_die {
        let death = behavior::fire_death_products();
        let r = sim.randf();
        let remains = if r < death.ash_chance {
            death.ash
        } else if r < death.ash_chance + death.smoke_chance {
            death.smoke
        } else {
            Material::Empty
        };
        world.set_mat(x, y, remains);
        world.lifetime[idx] = 0;
        world.remove_flag(x, y, FLAG_BURNING);
        world.add_flag(x, y, FLAG_UPDATED);
        world.cells_updated += 1;
        return true;
    }

    // Emit smoke above while burning.
    if sim.randf() < FIRE_SMOKE_CHANCE
        && world.in_bounds(x, y - 1)
        && world.is_empty(x, y - 1)
    {
        world.set_mat(x, y - 1, Material::Smoke);
        world.add_flag(x, y - 1, FLAG_UPDATED);
    }

    // Spread to flammable neighbors, each rolled independently.
    for (dx, dy) in NEIGHBORS_8 {
        if sim.randf() < FIRE_SPREAD_CHANCE {
            try_ignite(world, x + dx, y + dy);
        }
    }

    // Rise with the gas priority order: up, up-diagonal, sideways.
    if sim.randf() < FIRE_RISE_CHANCE {
        let mut new_x = x;
        let mut new_y = y;
        let mut moved = false;

        if gas_can_move_to(world, x, y - 1) {
            new_y = y - 1;
            moved = true;
        } else {
            let can_ul = gas_can_move_to(world, x - 1, y - 1);
            let can_ur = gas_can_move_to(world, x + 1, y - 1);
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

        if !moved {
            let can_l = gas_can_move_to(world, x - 1, y);
            let can_r = gas_can_move_to(world, x + 1, y);
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

        if moved {
            world.swap_cells(x, y, new_x, new_y);
            world.add_flag(new_x, new_y, FLAG_UPDATED);
            world.add_flag(x, y, FLAG_UPDATED);
            world.cells_updated += 1;
            return true;
        }
    }

    // No movement: mark anyway so the cell is not retried this tick.
    world.add_flag(x, y, FLAG_UPDATED);
    true
}
