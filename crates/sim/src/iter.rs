//! Ordered grid traversal with chunk pruning.
//!
//! Falling materials are processed bottom-up so a particle is not visited
//! again after moving into a row the scan has yet to reach; rising materials
//! top-down for the same reason. The horizontal direction can be randomized
//! per invocation to avoid directional bias. Cells inside inactive chunks
//! are skipped entirely.

use crate::physics::CHUNK_SIZE;
use crate::simulation::Simulation;
use crate::world::{World, FLAG_UPDATED};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VerticalOrder {
    TopDown,
    BottomUp,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HorizontalOrder {
    LeftRight,
    RightLeft,
    /// Pick left-to-right or right-to-left per invocation with one RNG bit.
    Random,
}

/// Cardinal neighbor offsets.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// All eight neighbor offsets.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Visit every cell in active chunks exactly once in the given order.
/// The callback returns `false` to abort the whole traversal.
pub fn for_each<F>(
    sim: &mut Simulation,
    world: &mut World,
    vertical: VerticalOrder,
    horizontal: HorizontalOrder,
    mut visit: F,
) where
    F: FnMut(&mut Simulation, &mut World, i32, i32) -> bool,
{
    let scan_left = match horizontal {
        HorizontalOrder::LeftRight => true,
        HorizontalOrder::RightLeft => false,
        HorizontalOrder::Random => sim.coin_flip(),
    };

    let width = world.width();
    let height = world.height();

    let rows: Box<dyn Iterator<Item = i32>> = match vertical {
        VerticalOrder::TopDown => Box::new(0..height),
        VerticalOrder::BottomUp => Box::new((0..height).rev()),
    };

    for y in rows {
        let chunk_y = y / CHUNK_SIZE;

        let cols: Box<dyn Iterator<Item = i32>> = if scan_left {
            Box::new(0..width)
        } else {
            Box::new((0..width).rev())
        };

        for x in cols {
            if !world.is_chunk_active(x / CHUNK_SIZE, chunk_y) {
                continue;
            }
            if !visit(sim, world, x, y) {
                return;
            }
        }
    }
}

/// Run `passes` traversals. With `clear_between`, the Updated flag is wiped
/// from every active-chunk cell before each pass after the first, letting
/// the later pass move cells again (used by fluid dispersion).
pub fn for_each_multipass<F>(
    sim: &mut Simulation,
    world: &mut World,
    vertical: VerticalOrder,
    horizontal: HorizontalOrder,
    passes: u32,
    clear_between: bool,
    mut visit: F,
) where
    F: FnMut(&mut Simulation, &mut World, i32, i32) -> bool,
{
    for pass in 0..passes {
        if pass > 0 && clear_between {
            for_each(
                sim,
                world,
                vertical,
                horizontal,
                |_sim, world, x, y| {
                    world.remove_flag(x, y, FLAG_UPDATED);
                    true
                },
            );
        }
        for_each(sim, world, vertical, horizontal, &mut visit);
    }
}

/// Traversal for falling materials: bottom-up, random horizontal direction.
pub fn for_each_falling<F>(sim: &mut Simulation, world: &mut World, visit: F)
where
    F: FnMut(&mut Simulation, &mut World, i32, i32) -> bool,
{
    for_each(
        sim,
        world,
        VerticalOrder::BottomUp,
        HorizontalOrder::Random,
        visit,
    );
}

/// Traversal for rising materials: top-down, random horizontal direction.
pub fn for_each_rising<F>(sim: &mut Simulation, world: &mut World, visit: F)
where
    F: FnMut(&mut Simulation, &mut World, i32, i32) -> bool,
{
    for_each(
        sim,
        world,
        VerticalOrder::TopDown,
        HorizontalOrder::Random,
        visit,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn visits_every_cell_of_active_grid_once() {
        let mut sim = Simulation::with_seed(120.0, 1);
        let mut world = World::new(64, 64);

        let mut count = 0u32;
        for_each(
            &mut sim,
            &mut world,
            VerticalOrder::BottomUp,
            HorizontalOrder::LeftRight,
            |_, _, _, _| {
                count += 1;
                true
            },
        );
        assert_eq!(count, 64 * 64);
    }

    #[test]
    fn skips_inactive_chunks() {
        let mut sim = Simulation::with_seed(120.0, 1);
        let mut world = World::new(128, 128);
        // Two swaps drain the initial all-active mask.
        world.update_chunk_activation();
        world.update_chunk_activation();
        // Activate only the chunk block around one cell.
        world.set_mat(64, 64, Material::Sand);
        world.update_chunk_activation();

        let mut count = 0u32;
        for_each(
            &mut sim,
            &mut world,
            VerticalOrder::TopDown,
            HorizontalOrder::LeftRight,
            |_, _, _, _| {
                count += 1;
                true
            },
        );
        // 9 active chunks of 32x32 cells each.
        assert_eq!(count, 9 * 32 * 32);
    }

    #[test]
    fn returning_false_aborts_traversal() {
        let mut sim = Simulation::with_seed(120.0, 1);
        let mut world = World::new(64, 64);

        let mut count = 0u32;
        for_each(
            &mut sim,
            &mut world,
            VerticalOrder::TopDown,
            HorizontalOrder::LeftRight,
            |_, _, _, _| {
                count += 1;
                count < 10
            },
        );
        assert_eq!(count, 10);
    }

    #[test]
    fn bottom_up_starts_at_last_row() {
        let mut sim = Simulation::with_seed(120.0, 1);
        let mut world = World::new(32, 32);

        let mut first = None;
        for_each(
            &mut sim,
            &mut world,
            VerticalOrder::BottomUp,
            HorizontalOrder::LeftRight,
            |_, _, x, y| {
                first.get_or_insert((x, y));
                true
            },
        );
        assert_eq!(first, Some((0, 31)));
    }

    #[test]
    fn multipass_clears_updated_between_passes() {
        let mut sim = Simulation::with_seed(120.0, 1);
        let mut world = World::new(32, 32);
        world.add_flag(5, 5, FLAG_UPDATED);

        let mut seen_updated_in_pass2 = false;
        let mut pass_cells = 0u32;
        let total = 32 * 32;
        for_each_multipass(
            &mut sim,
            &mut world,
            VerticalOrder::TopDown,
            HorizontalOrder::LeftRight,
            2,
            true,
            |_, world, x, y| {
                pass_cells += 1;
                if pass_cells > total && x == 5 && y == 5 {
                    seen_updated_in_pass2 = world.has_flag(x, y, FLAG_UPDATED);
                }
                true
            },
        );
        assert_eq!(pass_cells, total * 2);
        assert!(!seen_updated_in_pass2);
    }
}
