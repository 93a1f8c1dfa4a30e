//! Thermal stage: two-pass heat diffusion and phase changes on the
//! double-buffered temperature field.
//!
//! Pass 1 writes `temp_next` from a consistent snapshot of `temp`, so
//! diffusion order cannot bias the result. Pass 2 applies phase changes
//! against the freshly written `temp_next`, including latent-heat nudges.
//! Both passes cover the whole grid; the buffers swap at the end. This
//! stage leaves the Updated flag alone.

use crate::iter::NEIGHBORS_4;
use crate::material::{materials, Material};
use crate::physics::{
    AMBIENT_COOLING_RATE, AMBIENT_TEMP, FIRE_TEMPERATURE, HEAT_DIFFUSION_RATE, MAX_TEMPERATURE,
    MIN_TEMPERATURE,
};
use crate::simulation::Simulation;
use crate::world::World;

pub fn update(sim: &mut Simulation, world: &mut World) {
    diffuse(world);
    phase_changes(sim, world);
    std::mem::swap(&mut world.temp, &mut world.temp_next);
}

fn diffuse(world: &mut World) {
    let width = world.width();
    let height = world.height();
    let table = materials();

    for y in 0..height {
        for x in 0..width {
            let idx = world.idx(x, y);
            let mat = world.mat[idx];
            let temp = world.temp[idx];

            // Burning cells hold the flame temperature.
            if mat == Material::Fire {
                world.temp_next[idx] = FIRE_TEMPERATURE;
                continue;
            }

            // Empty space relaxes to ambient quickly.
            if mat == Material::Empty {
                world.temp_next[idx] = temp + (AMBIENT_TEMP - temp) * 0.1;
                continue;
            }

            let conductivity = table.get(mat).conductivity;
            if conductivity <= 0.001 {
                world.temp_next[idx] = temp;
                continue;
            }

            // Heat exchange with cardinal neighbors; effective conductivity
            // is the geometric mean of the pair.
            let mut heat_in = 0.0;
            let mut neighbor_count = 0;
            for (dx, dy) in NEIGHBORS_4 {
                let nx = x + dx;
                let ny = y + dy;
                if !world.in_bounds(nx, ny) {
                    continue;
                }
                let nidx = world.idx(nx, ny);
                let ncond = table.get(world.mat[nidx]).conductivity;
                let eff_cond = if conductivity * ncond > 0.0 {
                    (conductivity * ncond).sqrt()
                } else {
                    0.0
                };
                heat_in += (world.temp[nidx] - temp) * eff_cond;
                neighbor_count += 1;
            }

            if neighbor_count > 0 {
                let delta = heat_in * HEAT_DIFFUSION_RATE / neighbor_count as f32;
                let thermal_mass = table.get(mat).heat_capacity.max(0.1);
                world.temp_next[idx] = temp + delta / thermal_mass;
            } else {
                world.temp_next[idx] = temp;
            }

            world.temp_next[idx] +=
                (AMBIENT_TEMP - world.temp_next[idx]) * AMBIENT_COOLING_RATE;
            world.temp_next[idx] = world.temp_next[idx].clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        }
    }
}

fn phase_changes(sim: &mut Simulation, world: &mut World) {
    let width = world.width();
    let height = world.height();

    for y in 0..height {
        for x in 0..width {
            check_phase_change(sim, world, x, y);
        }
    }
}

fn check_phase_change(sim: &mut Simulation, world: &mut World, x: i32, y: i32) {
    let idx = world.idx(x, y);
    let mat = world.mat[idx];
    let temp = world.temp_next[idx];
    let props = materials().get(mat);

    // Ice melts, faster the hotter it gets. Melting absorbs heat.
    if mat == Material::Ice && temp > props.melting_temp {
        let melt_chance = 0.01 + (temp - props.melting_temp) * 0.002;
        if sim.randf() < melt_chance {
            world.set_mat(x, y, Material::Water);
            world.temp_next[idx] -= 10.0;
        }
    }

    // Water freezes below zero. Freezing releases heat.
    if mat == Material::Water && temp < 0.0 {
        let freeze_chance = 0.005 + (-temp) * 0.001;
        if sim.randf() < freeze_chance {
            world.set_mat(x, y, Material::Ice);
            world.temp_next[idx] += 5.0;
        }
    }

    // Water boils into steam; boiling absorbs a lot of heat.
    if mat == Material::Water && temp > props.boiling_temp {
        let boil_chance = 0.02 + (temp - props.boiling_temp) * 0.005;
        if sim.randf() < boil_chance {
            world.set_mat(x, y, Material::Steam);
            world.lifetime[idx] = 0;
            world.temp_next[idx] -= 50.0;
        }
    }

    // Cool steam condenses; condensation releases heat.
    if mat == Material::Steam && temp < 80.0 {
        let condense_chance = 0.01 + (80.0 - temp) * 0.001;
        if sim.randf() < condense_chance {
            world.set_mat(x, y, Material::Water);
            world.lifetime[idx] = 0;
            world.temp_next[idx] += 20.0;
        }
    }
}
