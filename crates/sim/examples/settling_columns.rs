//! Settling diagnostic: drop one column of each powder and report how long
//! each takes to go quiet.
//!
//! Run with: cargo run --release --example settling_columns -p sim

use sim::{Material, SimConfig};

fn main() {
    let config = SimConfig {
        width: 128,
        height: 128,
        tick_hz: 120.0,
        seed: Some(1),
    };
    let (mut sim, mut world) = config.build();

    for x in 0..world.width() {
        world.set_mat(x, 120, Material::Stone);
    }

    let columns = [
        (20, Material::Sand),
        (60, Material::Soil),
        (100, Material::Ash),
    ];
    for &(x, mat) in &columns {
        for y in 40..80 {
            world.set_mat(x, y, mat);
        }
    }

    let mut quiet_since: Option<u64> = None;
    for _ in 0..5000 {
        sim.tick(&mut world);

        if world.cells_updated == 0 {
            if quiet_since.is_none() {
                quiet_since = Some(sim.tick_count());
            }
        } else {
            quiet_since = None;
        }

        // Ten consecutive quiet ticks counts as settled.
        if let Some(since) = quiet_since {
            if sim.tick_count() - since >= 10 {
                break;
            }
        }
    }

    match quiet_since {
        Some(since) => println!("settled at tick {}", since),
        None => println!("still moving after {} ticks", sim.tick_count()),
    }

    for &(x, mat) in &columns {
        let pile_height = (0..world.height())
            .filter(|&y| world.get_mat(x, y) == mat)
            .count();
        println!("{:<5} column at x={:3}: {} cells remain in column", mat.name(), x, pile_height);
    }
}
