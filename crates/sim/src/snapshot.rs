//! Collaborator surface: read-only frame snapshots and the pluggable
//! input/presentation seams.
//!
//! The engine draws nothing and reads no devices. A frontend feeds
//! [`InputEvent`]s in between ticks and pulls a [`FrameSnapshot`] per frame;
//! how pixels reach a screen (or a file, or a test assertion) is its
//! business.

use glam::IVec2;

use crate::fire;
use crate::material::{Color, Material};
use crate::simulation::Simulation;
use crate::world::{World, FLAG_UPDATED};

/// Debug overlay modes a frontend may cycle through. The engine only
/// defines the order; rendering them is external.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum OverlayMode {
    #[default]
    None,
    Chunks,
    Updated,
    Temperature,
}

impl OverlayMode {
    pub fn next(self) -> Self {
        match self {
            OverlayMode::None => OverlayMode::Chunks,
            OverlayMode::Chunks => OverlayMode::Updated,
            OverlayMode::Updated => OverlayMode::Temperature,
            OverlayMode::Temperature => OverlayMode::None,
        }
    }
}

/// Events an input source can emit between ticks.
#[derive(Clone, Copy, Debug)]
pub enum InputEvent {
    /// Paint a stroke from the previous to the current cursor position.
    /// Painting `Material::Empty` erases.
    Stroke {
        prev: IVec2,
        curr: IVec2,
        radius: i32,
        material: Material,
    },
    TogglePause,
    StepOnce,
    ClearWorld,
    /// Renderer-side concern; the core ignores it.
    CycleOverlay,
}

/// Something that produces input events (mouse/keyboard capture, a script,
/// a replay file).
pub trait InputSource {
    fn poll(&mut self) -> Option<InputEvent>;
}

/// Something that consumes finished frames (a window, a PPM writer, a test).
pub trait FrameSink {
    fn present(&mut self, frame: &FrameSnapshot<'_>);
}

/// Apply one event to the simulation. Returns false for events the core
/// does not handle (overlay cycling).
pub fn apply_event(sim: &mut Simulation, world: &mut World, event: InputEvent) -> bool {
    match event {
        InputEvent::Stroke {
            prev,
            curr,
            radius,
            material,
        } => {
            paint_stroke(world, prev, curr, radius, material);
            true
        }
        InputEvent::TogglePause => {
            sim.toggle_pause();
            true
        }
        InputEvent::StepOnce => {
            sim.step_once();
            true
        }
        InputEvent::ClearWorld => {
            world.clear();
            true
        }
        InputEvent::CycleOverlay => false,
    }
}

/// Paint a stroke segment: a Bresenham line of circles between the previous
/// and current cursor positions, so fast mouse movement leaves no gaps.
pub fn paint_stroke(world: &mut World, prev: IVec2, curr: IVec2, radius: i32, material: Material) {
    world.paint_line(prev.x, prev.y, curr.x, curr.y, radius, material);
}

/// Read-only view of one frame's worth of render data.
pub struct FrameSnapshot<'a> {
    world: &'a World,
}

impl<'a> FrameSnapshot<'a> {
    pub fn new(world: &'a World) -> Self {
        Self { world }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.world.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.world.height()
    }

    #[inline]
    pub fn material(&self, x: i32, y: i32) -> Material {
        self.world.get_mat(x, y)
    }

    #[inline]
    pub fn lifetime(&self, x: i32, y: i32) -> u8 {
        if !self.world.in_bounds(x, y) {
            return 0;
        }
        self.world.lifetime[self.world.idx(x, y)]
    }

    #[inline]
    pub fn temperature(&self, x: i32, y: i32) -> f32 {
        if !self.world.in_bounds(x, y) {
            return 0.0;
        }
        self.world.temp[self.world.idx(x, y)]
    }

    #[inline]
    pub fn updated(&self, x: i32, y: i32) -> bool {
        self.world.has_flag(x, y, FLAG_UPDATED)
    }

    /// Display color for a cell. Fire renders from the age palette; every
    /// other material uses its seed-varied base color.
    pub fn color(&self, x: i32, y: i32) -> Color {
        if self.material(x, y) == Material::Fire {
            return fire::color_for_age(self.lifetime(x, y));
        }
        self.world.cell_color(x, y)
    }

    #[inline]
    pub fn chunk_active(&self, chunk_x: i32, chunk_y: i32) -> bool {
        self.world.is_chunk_active(chunk_x, chunk_y)
    }

    #[inline]
    pub fn active_chunks(&self) -> u32 {
        self.world.active_chunks
    }

    #[inline]
    pub fn cells_updated(&self) -> u32 {
        self.world.cells_updated
    }
}
