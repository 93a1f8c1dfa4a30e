//! Quick benchmark for profiling the tick engine.
//!
//! Run with: cargo run --release --example bench -p sim
//! Profile with: cargo flamegraph --example bench -p sim

use std::time::Instant;

use sim::{Material, SimConfig};

fn main() {
    const TICKS: u64 = 1200; // 10 seconds at 120 Hz
    const WARMUP: u64 = 120;

    let config = SimConfig {
        seed: Some(1),
        ..SimConfig::default()
    };
    let (mut sim, mut world) = config.build();
    println!(
        "Setting up {}x{} world at {} Hz",
        world.width(),
        world.height(),
        sim.tick_hz()
    );

    // A busy scene: floor, a sand mountain, a water lake, and a bonfire.
    let w = world.width();
    let h = world.height();
    for x in 0..w {
        for y in (h - 12)..h {
            world.set_mat(x, y, Material::Stone);
        }
    }
    world.paint_circle(w / 4, h / 4, 60, Material::Sand);
    world.paint_circle(w / 2, h / 3, 50, Material::Water);
    world.paint_circle(3 * w / 4, h / 2, 30, Material::Soil);
    for x in (w / 2 - 40)..(w / 2 + 40) {
        world.set_mat(x, h - 13, Material::Wood);
    }
    world.set_mat(w / 2, h - 14, Material::Fire);

    println!("Warming up ({} ticks)...", WARMUP);
    for _ in 0..WARMUP {
        sim.tick(&mut world);
    }

    println!("Running {} ticks...", TICKS);
    let start = Instant::now();
    let mut stage_totals = [0.0f64; 6];
    for tick in 0..TICKS {
        sim.tick(&mut world);

        let p = &sim.profile;
        for (total, us) in stage_totals.iter_mut().zip([
            p.powder_us,
            p.fluid_us,
            p.fire_us,
            p.gas_us,
            p.acid_us,
            p.thermal_us,
        ]) {
            *total += us;
        }

        if tick % 240 == 0 {
            println!(
                "  tick {}: {} cells updated, {} active chunks",
                tick, world.cells_updated, world.active_chunks
            );
        }
    }
    let elapsed = start.elapsed();

    let per_tick_ms = elapsed.as_secs_f64() * 1000.0 / TICKS as f64;
    println!("\n=== Results ===");
    println!("Total time: {:.2?}", elapsed);
    println!("Avg tick time: {:.3}ms", per_tick_ms);
    println!("Effective tick rate: {:.0} Hz", 1000.0 / per_tick_ms);
    for (name, total) in ["powder", "fluid", "fire", "gas", "acid", "thermal"]
        .iter()
        .zip(stage_totals)
    {
        println!("  {:<8} {:8.1}us/tick", name, total / TICKS as f64);
    }

    if per_tick_ms > 1000.0 / 120.0 {
        println!("\nBelow the 120 Hz target - optimization needed");
    } else {
        println!("\nMeeting the 120 Hz target");
    }
}
