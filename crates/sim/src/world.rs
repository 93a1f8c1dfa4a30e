//! World - the SoA cell grid, per-cell flags, and chunk activation masks.
//!
//! All per-cell state lives in parallel arrays indexed by `y * width + x`.
//! Update tracking is a flag bit rather than part of the swapped cell data,
//! so a moved cell cannot carry its "already processed" mark along with it.
//! Chunk activation is double-buffered: mutations mark the `next` mask, and
//! the tick driver swaps masks once per tick.

use crate::fixed::Fixed8;
use crate::material::{materials, Color, Material};
use crate::physics::{AMBIENT_TEMP, CHUNK_SIZE};
use crate::rng::xorshift32;

/// Per-cell overlay flags.
pub type CellFlags = u16;

pub const FLAG_NONE: CellFlags = 0x0000;
/// Cell was updated this tick (prevents double-update).
pub const FLAG_UPDATED: CellFlags = 0x0001;
pub const FLAG_STATIC: CellFlags = 0x0002;
pub const FLAG_BURNING: CellFlags = 0x0004;
pub const FLAG_WET: CellFlags = 0x0008;
pub const FLAG_HOT: CellFlags = 0x0010;
pub const FLAG_ACTIVE: CellFlags = 0x0020;
pub const FLAG_CORRODING: CellFlags = 0x0040;
pub const FLAG_FROZEN: CellFlags = 0x0080;

/// Seed for the per-cell color variation stream.
const COLOR_SEED_INIT: u32 = 12345;

/// The simulation grid.
///
/// Arrays are public for the stage modules; external callers should stick to
/// the bounds-checked operations.
pub struct World {
    width: i32,
    height: i32,
    chunks_x: i32,
    chunks_y: i32,

    pub mat: Vec<Material>,
    /// Reserved double buffer for material; unused by the current stages.
    pub mat_next: Vec<Material>,
    pub flags: Vec<CellFlags>,
    /// Per-cell color variation seed; travels with the cell on swaps.
    pub color_seed: Vec<u32>,
    pub temp: Vec<f32>,
    pub temp_next: Vec<f32>,
    /// Reserved scalar fields for future subsystems.
    pub pressure: Vec<f32>,
    pub density: Vec<f32>,
    /// Velocity in signed 8.8 fixed point.
    pub vel_x: Vec<Fixed8>,
    pub vel_y: Vec<Fixed8>,
    /// Fire age, smoke fade, gas aging. Saturates at 255.
    pub lifetime: Vec<u8>,

    chunk_active: Vec<bool>,
    chunk_active_next: Vec<bool>,

    /// Cells moved or transformed this tick.
    pub cells_updated: u32,
    /// Chunks active after the last activation swap.
    pub active_chunks: u32,
}

impl World {
    /// Create a grid of the given dimensions: all cells Empty, temperature
    /// at ambient, deterministic color seeds, every chunk initially active.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");

        let size = (width as usize) * (height as usize);
        let chunks_x = (width + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let chunks_y = (height + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let chunk_count = (chunks_x as usize) * (chunks_y as usize);

        let mut color_seed = vec![0u32; size];
        let mut seed = COLOR_SEED_INIT;
        for s in color_seed.iter_mut() {
            *s = xorshift32(&mut seed);
        }

        log::debug!(
            "world created: {}x{} cells, {}x{} chunks",
            width,
            height,
            chunks_x,
            chunks_y
        );

        Self {
            width,
            height,
            chunks_x,
            chunks_y,
            mat: vec![Material::Empty; size],
            mat_next: vec![Material::Empty; size],
            flags: vec![FLAG_NONE; size],
            color_seed,
            temp: vec![AMBIENT_TEMP; size],
            temp_next: vec![AMBIENT_TEMP; size],
            pressure: vec![0.0; size],
            density: vec![0.0; size],
            vel_x: vec![0; size],
            vel_y: vec![0; size],
            lifetime: vec![0; size],
            chunk_active: vec![true; chunk_count],
            chunk_active_next: vec![false; chunk_count],
            cells_updated: 0,
            active_chunks: chunk_count as u32,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn chunks_x(&self) -> i32 {
        self.chunks_x
    }

    #[inline]
    pub fn chunks_y(&self) -> i32 {
        self.chunks_y
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Cell index for in-bounds coordinates.
    #[inline]
    pub fn idx(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.in_bounds(x, y));
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Material at position; out of bounds reads as Empty.
    #[inline]
    pub fn get_mat(&self, x: i32, y: i32) -> Material {
        if !self.in_bounds(x, y) {
            return Material::Empty;
        }
        self.mat[self.idx(x, y)]
    }

    /// Set material, reset the cell's velocity, and activate its chunk
    /// neighborhood. No-op out of bounds.
    pub fn set_mat(&mut self, x: i32, y: i32, mat: Material) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.idx(x, y);
        self.mat[idx] = mat;
        self.vel_x[idx] = 0;
        self.vel_y[idx] = 0;
        self.activate_chunk_at(x, y);
    }

    /// Write the reserved next-frame material buffer.
    pub fn set_mat_next(&mut self, x: i32, y: i32, mat: Material) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.idx(x, y);
        self.mat_next[idx] = mat;
    }

    #[inline]
    pub fn get_flags(&self, x: i32, y: i32) -> CellFlags {
        if !self.in_bounds(x, y) {
            return FLAG_NONE;
        }
        self.flags[self.idx(x, y)]
    }

    pub fn set_flags(&mut self, x: i32, y: i32, flags: CellFlags) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.idx(x, y);
        self.flags[idx] = flags;
    }

    #[inline]
    pub fn add_flag(&mut self, x: i32, y: i32, flag: CellFlags) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.idx(x, y);
        self.flags[idx] |= flag;
    }

    #[inline]
    pub fn remove_flag(&mut self, x: i32, y: i32, flag: CellFlags) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.idx(x, y);
        self.flags[idx] &= !flag;
    }

    #[inline]
    pub fn has_flag(&self, x: i32, y: i32, flag: CellFlags) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.flags[self.idx(x, y)] & flag != 0
    }

    #[inline]
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        materials().is_empty(self.get_mat(x, y))
    }

    /// Out of bounds counts as solid: the grid edge is a wall.
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        materials().is_solid(self.get_mat(x, y))
    }

    /// Swap material, color seed, velocity, and lifetime between two cells.
    /// Flags and temperature stay put. Activates both chunks.
    pub fn swap_cells(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        if !self.in_bounds(x1, y1) || !self.in_bounds(x2, y2) {
            return;
        }
        let a = self.idx(x1, y1);
        let b = self.idx(x2, y2);

        self.mat.swap(a, b);
        self.color_seed.swap(a, b);
        self.vel_x.swap(a, b);
        self.vel_y.swap(a, b);
        self.lifetime.swap(a, b);

        self.activate_chunk_at(x1, y1);
        self.activate_chunk_at(x2, y2);
    }

    /// Mark a chunk for processing next tick.
    pub fn activate_chunk(&mut self, chunk_x: i32, chunk_y: i32) {
        if chunk_x < 0 || chunk_x >= self.chunks_x || chunk_y < 0 || chunk_y >= self.chunks_y {
            return;
        }
        let idx = (chunk_y * self.chunks_x + chunk_x) as usize;
        self.chunk_active_next[idx] = true;
    }

    /// Activate the chunk containing a cell plus its full 3x3 neighborhood,
    /// so particles crossing a chunk boundary cannot strand themselves in a
    /// sleeping chunk.
    pub fn activate_chunk_at(&mut self, x: i32, y: i32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let chunk_x = x / CHUNK_SIZE;
        let chunk_y = y / CHUNK_SIZE;
        for dy in -1..=1 {
            for dx in -1..=1 {
                self.activate_chunk(chunk_x + dx, chunk_y + dy);
            }
        }
    }

    #[inline]
    pub fn is_chunk_active(&self, chunk_x: i32, chunk_y: i32) -> bool {
        if chunk_x < 0 || chunk_x >= self.chunks_x || chunk_y < 0 || chunk_y >= self.chunks_y {
            return false;
        }
        self.chunk_active[(chunk_y * self.chunks_x + chunk_x) as usize]
    }

    /// Swap activation buffers: the write set of this tick becomes the read
    /// set of the next. Counts active chunks and clears the new write set.
    pub fn update_chunk_activation(&mut self) {
        std::mem::swap(&mut self.chunk_active, &mut self.chunk_active_next);

        self.active_chunks = self.chunk_active.iter().filter(|a| **a).count() as u32;
        self.chunk_active_next.fill(false);
    }

    /// Clear the Updated bit on every cell. Called at the start of a tick.
    pub fn clear_tick_flags(&mut self) {
        for f in self.flags.iter_mut() {
            *f &= !FLAG_UPDATED;
        }
    }

    /// Reset materials, flags, velocities, and lifetimes. Color seeds stay
    /// (variation should not re-roll on clear) and temperature relaxes back
    /// to ambient through the thermal stage rather than snapping.
    pub fn clear(&mut self) {
        self.mat.fill(Material::Empty);
        self.mat_next.fill(Material::Empty);
        self.flags.fill(FLAG_NONE);
        self.vel_x.fill(0);
        self.vel_y.fill(0);
        self.lifetime.fill(0);
        log::debug!("world cleared");
    }

    /// Paint a filled circle of material.
    pub fn paint_circle(&mut self, cx: i32, cy: i32, radius: i32, mat: Material) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    let x = cx + dx;
                    let y = cy + dy;
                    if self.in_bounds(x, y) {
                        self.set_mat(x, y, mat);
                    }
                }
            }
        }
    }

    /// Paint along a Bresenham line with a circular brush at each step.
    pub fn paint_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, radius: i32, mat: Material) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.paint_circle(x, y, radius, mat);

            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Material color for a cell, perturbed by its color seed.
    pub fn cell_color(&self, x: i32, y: i32) -> Color {
        if !self.in_bounds(x, y) {
            return Color::rgba(0, 0, 0, 255);
        }
        let idx = self.idx(x, y);
        materials().color(self.mat[idx], self.color_seed[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_sentinels() {
        let world = World::new(64, 64);
        assert_eq!(world.get_mat(-1, 0), Material::Empty);
        assert_eq!(world.get_mat(64, 63), Material::Empty);
        assert!(world.is_solid(-1, 0), "edge must read as wall");
        assert!(!world.has_flag(0, -5, FLAG_UPDATED));
        assert_eq!(world.get_flags(999, 999), FLAG_NONE);
    }

    #[test]
    fn out_of_bounds_writes_are_noops() {
        let mut world = World::new(64, 64);
        world.set_mat(-1, -1, Material::Sand);
        world.add_flag(64, 0, FLAG_UPDATED);
        world.swap_cells(0, 0, -1, 0);
        assert_eq!(world.get_mat(0, 0), Material::Empty);
    }

    #[test]
    fn set_mat_zeroes_velocity() {
        let mut world = World::new(64, 64);
        let idx = world.idx(10, 10);
        world.vel_y[idx] = 300;
        world.set_mat(10, 10, Material::Sand);
        assert_eq!(world.vel_y[idx], 0);
    }

    #[test]
    fn swap_moves_seed_velocity_and_lifetime_but_not_flags() {
        let mut world = World::new(64, 64);
        world.set_mat(1, 1, Material::Sand);
        let a = world.idx(1, 1);
        let b = world.idx(1, 2);
        world.vel_y[a] = 77;
        world.lifetime[a] = 9;
        let seed_a = world.color_seed[a];
        world.add_flag(1, 1, FLAG_BURNING);

        world.swap_cells(1, 1, 1, 2);

        assert_eq!(world.get_mat(1, 2), Material::Sand);
        assert_eq!(world.vel_y[b], 77);
        assert_eq!(world.lifetime[b], 9);
        assert_eq!(world.color_seed[b], seed_a);
        // Flags stay with the position, not the particle.
        assert!(world.has_flag(1, 1, FLAG_BURNING));
        assert!(!world.has_flag(1, 2, FLAG_BURNING));
    }

    #[test]
    fn activation_dilates_full_3x3() {
        let mut world = World::new(128, 128);
        // Drain the initial all-active state.
        world.update_chunk_activation();
        world.update_chunk_activation();
        assert_eq!(world.active_chunks, 0);

        // Activating a cell in chunk (1,1) lights up all nine neighbors.
        world.set_mat(40, 40, Material::Sand);
        world.update_chunk_activation();
        assert_eq!(world.active_chunks, 9);
        for cy in 0..3 {
            for cx in 0..3 {
                assert!(world.is_chunk_active(cx, cy));
            }
        }
        assert!(!world.is_chunk_active(3, 0));
    }

    #[test]
    fn corner_activation_clips_to_grid() {
        let mut world = World::new(128, 128);
        world.update_chunk_activation();
        world.update_chunk_activation();

        world.set_mat(0, 0, Material::Sand);
        world.update_chunk_activation();
        assert_eq!(world.active_chunks, 4);
    }

    #[test]
    fn clear_preserves_color_seeds_and_temperature() {
        let mut world = World::new(64, 64);
        let idx = world.idx(5, 5);
        world.set_mat(5, 5, Material::Water);
        world.temp[idx] = 90.0;
        let seed = world.color_seed[idx];

        world.clear();

        assert_eq!(world.get_mat(5, 5), Material::Empty);
        assert_eq!(world.color_seed[idx], seed);
        assert_eq!(world.temp[idx], 90.0);
    }

    #[test]
    fn paint_circle_fills_radius() {
        let mut world = World::new(64, 64);
        world.paint_circle(32, 32, 3, Material::Stone);
        assert_eq!(world.get_mat(32, 32), Material::Stone);
        assert_eq!(world.get_mat(32, 35), Material::Stone);
        assert_eq!(world.get_mat(32, 36), Material::Empty);
        // Corners outside the Euclidean radius stay empty.
        assert_eq!(world.get_mat(35, 35), Material::Empty);
    }

    #[test]
    fn paint_line_connects_endpoints() {
        let mut world = World::new(64, 64);
        world.paint_line(0, 0, 10, 10, 0, Material::Wood);
        assert_eq!(world.get_mat(0, 0), Material::Wood);
        assert_eq!(world.get_mat(5, 5), Material::Wood);
        assert_eq!(world.get_mat(10, 10), Material::Wood);
    }
}
