//! Fluid stage: gravity fall, horizontal flow, and column-height pressure
//! equalization, run as two dispersion passes per tick.
//!
//! "Pressure" here is the cheap proxy: the height of the contiguous
//! same-material column above a cell. Water moves sideways toward a column
//! at least two cells shorter, which levels standing bodies without a
//! real pressure solve.

use crate::fixed;
use crate::iter::{self, HorizontalOrder, VerticalOrder};
use crate::material::{materials, Material, MaterialState};
use crate::simulation::Simulation;
use crate::world::{World, FLAG_UPDATED};

/// Dispersion passes per tick.
const FLUID_PASSES: u32 = 2;

/// Chance an otherwise idle fluid cell tries to equalize columns.
const PRESSURE_EQUALIZE_CHANCE: f32 = 0.3;

/// A fluid can move into empty or gas cells.
pub fn can_move_to(world: &World, x: i32, y: i32) -> bool {
    if !world.in_bounds(x, y) {
        return false;
    }
    matches!(
        materials().state(world.get_mat(x, y)),
        MaterialState::Empty | MaterialState::Gas
    )
}

/// Contiguous same-material column height at `x`, scanning up from
/// `y_start` inclusive.
fn column_height(world: &World, x: i32, y_start: i32, fluid: Material) -> i32 {
    let mut count = 0;
    let mut y = y_start;
    while y >= 0 && world.get_mat(x, y) == fluid {
        count += 1;
        y -= 1;
    }
    count
}

pub fn update(sim: &mut Simulation, world: &mut World) {
    iter::for_each_multipass(
        sim,
        world,
        VerticalOrder::BottomUp,
        HorizontalOrder::Random,
        FLUID_PASSES,
        true,
        |sim, world, x, y| {
            update_cell(sim, world, x, y);
            true
        },
    );
}

fn update_cell(sim: &mut Simulation, world: &mut World, x: i32, y: i32) -> bool {
    if world.has_flag(x, y, FLAG_UPDATED) {
        return false;
    }

    let mat = world.get_mat(x, y);
    if !materials().is_fluid(mat) {
        return false;
    }

    let props = *materials().get(mat);

    // Gravity integration, same scheme as powder.
    let idx = world.idx(x, y);
    world.vel_y[idx] += props.gravity_step_fixed;
    world.vel_y[idx] = fixed::mul(world.vel_y[idx], props.drag_factor_fixed);
    world.vel_y[idx] = world.vel_y[idx].clamp(
        -props.terminal_velocity_fixed,
        props.terminal_velocity_fixed,
    );

    let vy = world.vel_y[idx];
    let mut steps = fixed::whole_cells(vy).clamp(0, 2);
    if steps == 0 {
        steps = 1;
    }

    let mut new_x = x;
    let mut new_y = y;
    let mut moved = false;

    // Fall.
    if vy > 0 {
        for _ in 0..steps {
            if can_move_to(world, new_x, new_y + 1) {
                new_y += 1;
                moved = true;
            } else {
                world.vel_y[idx] = 0;
                break;
            }
        }
    }

    // Horizontal flow when grounded.
    if !moved && sim.randf() < props.flow_rate {
        let can_left = can_move_to(world, x - 1, y);
        let can_right = can_move_to(world, x + 1, y);

        if can_left && can_right {
            new_x = if sim.coin_flip() { x - 1 } else { x + 1 };
            moved = true;
        } else if can_left {
            new_x = x - 1;
            moved = true;
        } else if can_right {
            new_x = x + 1;
            moved = true;
        }
    }

    // Pressure equalization: lean toward the visibly shorter column.
    if !moved && sim.randf() < PRESSURE_EQUALIZE_CHANCE {
        let my_column = column_height(world, x, y, mat);

        if can_move_to(world, x - 1, y) {
            let left_column = column_height(world, x - 1, y, mat);
            if left_column < my_column - 1 {
                new_x = x - 1;
                moved = true;
            }
        }

        if !moved && can_move_to(world, x + 1, y) {
            let right_column = column_height(world, x + 1, y, mat);
            if right_column < my_column - 1 {
                new_x = x + 1;
                moved = true;
            }
        }
    }

    // Horizontal drag applies whether or not the cell moved.
    world.vel_x[idx] = fixed::mul(world.vel_x[idx], props.drag_factor_fixed);

    if moved && (new_x != x || new_y != y) {
        world.swap_cells(x, y, new_x, new_y);
        world.add_flag(new_x, new_y, FLAG_UPDATED);
        world.add_flag(x, y, FLAG_UPDATED);
        world.cells_updated += 1;
        return true;
    }

    false
}
