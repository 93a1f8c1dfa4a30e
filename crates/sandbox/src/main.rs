//! Headless reference frontend.
//!
//! Drives the engine the way a windowed build would - scripted paint
//! strokes through the input seam, fixed-rate updates from a frame loop,
//! stats over `log` - then writes the final frame to a PPM file through the
//! frame sink seam.
//!
//! Run with: cargo run --release -p sandbox [config.json] [frames] [out.ppm]

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use glam::IVec2;
use sim::{
    apply_event, FrameSink, FrameSnapshot, InputEvent, InputSource, Material, SimConfig, World,
};

const FRAME_DT: f64 = 1.0 / 60.0;

/// Scripted input: a queue of (frame, event) pairs replayed in order.
struct ScriptedInput {
    events: VecDeque<(u32, InputEvent)>,
    frame: u32,
}

impl ScriptedInput {
    fn demo_script(world: &World) -> Self {
        let w = world.width();
        let h = world.height();
        let mut events = VecDeque::new();

        // Pour sand onto the platform for two seconds.
        for frame in 0..120 {
            let x = w / 2 - 30 + (frame as i32 % 20);
            events.push_back((
                frame,
                InputEvent::Stroke {
                    prev: IVec2::new(x, h / 8),
                    curr: IVec2::new(x + 1, h / 8),
                    radius: 2,
                    material: Material::Sand,
                },
            ));
        }
        // Then a burst of water from the right.
        for frame in 150..270 {
            events.push_back((
                frame,
                InputEvent::Stroke {
                    prev: IVec2::new(3 * w / 4, h / 8),
                    curr: IVec2::new(3 * w / 4, h / 8),
                    radius: 3,
                    material: Material::Water,
                },
            ));
        }
        // Light the platform near its left edge.
        events.push_back((
            300,
            InputEvent::Stroke {
                prev: IVec2::new(w / 4 + 2, h / 2 - 6),
                curr: IVec2::new(w / 4 + 2, h / 2 - 6),
                radius: 1,
                material: Material::Fire,
            },
        ));

        Self { events, frame: 0 }
    }

    fn advance_frame(&mut self) {
        self.frame += 1;
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Option<InputEvent> {
        match self.events.front() {
            Some(&(frame, event)) if frame <= self.frame => {
                self.events.pop_front();
                Some(event)
            }
            _ => None,
        }
    }
}

/// Frame sink that dumps the snapshot as a binary PPM image.
struct PpmWriter {
    path: String,
    result: std::io::Result<()>,
}

impl PpmWriter {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            result: Ok(()),
        }
    }

    fn write(&self, frame: &FrameSnapshot<'_>) -> std::io::Result<()> {
        let file = File::create(&self.path)?;
        let mut out = BufWriter::new(file);
        writeln!(out, "P6")?;
        writeln!(out, "{} {}", frame.width(), frame.height())?;
        writeln!(out, "255")?;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let c = frame.color(x, y);
                out.write_all(&[c.r, c.g, c.b])?;
            }
        }
        out.flush()
    }
}

impl FrameSink for PpmWriter {
    fn present(&mut self, frame: &FrameSnapshot<'_>) {
        self.result = self.write(frame);
    }
}

/// The demo scene from the desktop build: stone floor, side walls, and a
/// wood platform in the middle of the play area.
fn build_scene(world: &mut World) {
    let w = world.width();
    let h = world.height();

    for x in 0..w {
        for y in (h - 10)..h {
            world.set_mat(x, y, Material::Stone);
        }
    }
    for y in 0..h {
        for x in 0..10 {
            world.set_mat(x, y, Material::Stone);
        }
        for x in (w - 10)..w {
            world.set_mat(x, y, Material::Stone);
        }
    }
    for x in (w / 4)..(w / 2) {
        for y in (h / 2 - 4)..(h / 2) {
            world.set_mat(x, y, Material::Wood);
        }
    }
}

fn load_config(path: Option<&str>) -> SimConfig {
    let Some(path) = path else {
        return SimConfig::default();
    };
    match File::open(path).map_err(|e| e.to_string()).and_then(|f| {
        serde_json::from_reader::<_, SimConfig>(f).map_err(|e| e.to_string())
    }) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("could not load {}: {}; using defaults", path, err);
            SimConfig::default()
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str));
    let frames: u32 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(600);
    let out_path = args.get(3).map(String::as_str).unwrap_or("frame.ppm");

    let (mut sim, mut world) = config.build();
    build_scene(&mut world);
    let mut input = ScriptedInput::demo_script(&world);
    let mut sink = PpmWriter::new(out_path);

    log::info!(
        "sandbox: {}x{} at {} Hz, {} frames",
        world.width(),
        world.height(),
        sim.tick_hz(),
        frames
    );

    let start = Instant::now();
    for frame in 0..frames {
        while let Some(event) = input.poll() {
            apply_event(&mut sim, &mut world, event);
        }
        input.advance_frame();

        sim.update(&mut world, FRAME_DT);

        if frame % 60 == 0 {
            log::info!(
                "frame {}: tick {}, {} cells updated, {} active chunks, stage total {:.0}us",
                frame,
                sim.tick_count(),
                world.cells_updated,
                world.active_chunks,
                sim.profile.total_us
            );
        }
    }
    let elapsed = start.elapsed();

    let snapshot = FrameSnapshot::new(&world);
    sink.present(&snapshot);
    match &sink.result {
        Ok(()) => log::info!("wrote {}", out_path),
        Err(e) => log::error!("failed to write {}: {}", out_path, e),
    }

    let sim_seconds = frames as f64 * FRAME_DT;
    log::info!(
        "simulated {:.1}s in {:.2?} ({} ticks, {:.1}x realtime)",
        sim_seconds,
        elapsed,
        sim.tick_count(),
        sim_seconds / elapsed.as_secs_f64()
    );
}
