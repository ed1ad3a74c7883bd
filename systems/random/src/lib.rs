#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seedable random source that produces positions inside the maze.

use escape_maze_core::{GridConfig, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Number of draws attempted before a far-from placement is abandoned.
pub const FAR_PLACEMENT_ATTEMPTS: u32 = 10_000;

/// Raised when a placement constraint cannot be met.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlacementError {
    /// No position far enough from the target was drawn.
    #[error("no position farther than {threshold} cells from {target} after {attempts} draws")]
    NoDistantPosition {
        /// Position the draw had to stay away from.
        target: Position,
        /// Separation threshold in cells.
        threshold: f64,
        /// Draws attempted before giving up.
        attempts: u32,
    },
}

/// Deterministic random source bound to a grid.
#[derive(Clone, Debug)]
pub struct SpatialRandom {
    seed: u64,
    rng: ChaCha8Rng,
    grid: GridConfig,
}

impl SpatialRandom {
    /// Creates a random source seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64, grid: GridConfig) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            grid,
        }
    }

    /// Seed the source was created with, shown in debug output.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Grid positions are drawn from.
    #[must_use]
    pub const fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Draws a position away from the border.
    ///
    /// Coordinates lie in `[offset, width - offset)` and
    /// `[offset + top_offset, height - offset)`, with an offset of two cells
    /// for safe positions and one otherwise.
    pub fn next_position(&mut self, safe: bool) -> Position {
        let offset = if safe { 2 } else { 1 };
        let column = self.draw(offset, self.grid.width.saturating_sub(offset));
        let row = self.draw(
            offset + self.grid.top_offset,
            self.grid.height.saturating_sub(offset),
        );
        Position::new(column, row)
    }

    /// Draws positions until one is not close to `target`.
    pub fn next_position_far_from(
        &mut self,
        target: Position,
        safe: bool,
    ) -> Result<Position, PlacementError> {
        let threshold = self.grid.close_distance;
        for _ in 0..FAR_PLACEMENT_ATTEMPTS {
            let candidate = self.next_position(safe);
            if !candidate.is_close_to(target, threshold) {
                return Ok(candidate);
            }
        }
        Err(PlacementError::NoDistantPosition {
            target,
            threshold,
            attempts: FAR_PLACEMENT_ATTEMPTS,
        })
    }

    /// Rolls a percentage chance with continuous granularity.
    pub fn has_chance_occurred(&mut self, percent: f64) -> bool {
        let whole = f64::from(self.rng.gen_range(0u32..100));
        let fraction: f64 = self.rng.gen();
        whole + fraction < percent
    }

    /// Draws a value uniformly from `min..=max`.
    pub fn roll_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Picks a uniformly random element, or `None` for an empty slice.
    pub fn choose<T: Copy>(&mut self, values: &[T]) -> Option<T> {
        if values.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..values.len());
        values.get(index).copied()
    }

    fn draw(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_the_same_positions() {
        let grid = GridConfig::default();
        let mut first = SpatialRandom::new(7, grid.clone());
        let mut second = SpatialRandom::new(7, grid);
        for _ in 0..64 {
            assert_eq!(first.next_position(false), second.next_position(false));
        }
        assert_eq!(first.seed(), 7);
    }

    #[test]
    fn positions_respect_offsets() {
        let grid = GridConfig::default();
        let mut random = SpatialRandom::new(0x5eed, grid.clone());
        for _ in 0..2_000 {
            let safe = random.next_position(true);
            assert!((2..grid.width - 2).contains(&safe.column()));
            assert!((grid.top_offset + 2..grid.height - 2).contains(&safe.row()));

            let loose = random.next_position(false);
            assert!((1..grid.width - 1).contains(&loose.column()));
            assert!((grid.top_offset + 1..grid.height - 1).contains(&loose.row()));
        }
    }

    #[test]
    fn far_positions_keep_their_distance() {
        let grid = GridConfig::default();
        let mut random = SpatialRandom::new(99, grid.clone());
        let target = Position::new(50, 15);
        for _ in 0..100 {
            let far = random
                .next_position_far_from(target, true)
                .expect("default grid leaves room");
            assert!(far.distance_to(target) > grid.close_distance);
        }
    }

    #[test]
    fn impossible_separation_is_reported() {
        let grid = GridConfig {
            close_distance: 1_000.0,
            ..GridConfig::default()
        };
        let mut random = SpatialRandom::new(1, grid);
        let result = random.next_position_far_from(Position::new(10, 10), true);
        assert!(matches!(
            result,
            Err(PlacementError::NoDistantPosition {
                attempts: FAR_PLACEMENT_ATTEMPTS,
                ..
            })
        ));
    }

    #[test]
    fn chance_extremes_are_certain() {
        let mut random = SpatialRandom::new(3, GridConfig::default());
        for _ in 0..1_000 {
            assert!(random.has_chance_occurred(100.0));
            assert!(!random.has_chance_occurred(0.0));
        }
    }

    #[test]
    fn rolls_stay_inclusive() {
        let mut random = SpatialRandom::new(11, GridConfig::default());
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let roll = random.roll_inclusive(15, 20);
            assert!((15..=20).contains(&roll));
            seen_min |= roll == 15;
            seen_max |= roll == 20;
        }
        assert!(seen_min && seen_max);
        assert_eq!(random.roll_inclusive(5, 5), 5);
    }
}
