#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural maze generator that emits placement commands for one round.

use escape_maze_core::{
    Command, ConfigError, EntityKind, GameConfig, GridConfig, Position, SpawnTable,
    SECONDARY_KINDS,
};
use escape_maze_random::{PlacementError, SpatialRandom};
use thiserror::Error;

/// Failures that abort round generation before anything is drawn.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    /// The configuration cannot produce a playable round.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The exit point could not be placed far from the player.
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Primary positions chosen for a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundLayout {
    /// Player spawn, doubling as the respawn point.
    pub player: Position,
    /// Exit point position.
    pub exit_point: Position,
}

/// Source of round layouts consumed by the session orchestrator.
pub trait LayoutBuilder {
    /// Emits the commands that populate a freshly reset round.
    fn build(
        &self,
        random: &mut SpatialRandom,
        out: &mut Vec<Command>,
    ) -> Result<RoundLayout, GenerationError>;
}

/// Builds the layout of a round from a validated configuration.
#[derive(Clone, Debug)]
pub struct Generator {
    grid: GridConfig,
    spawns: SpawnTable,
}

impl Generator {
    /// Validates the configuration and prepares a generator for it.
    pub fn new(config: &GameConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self {
            grid: config.grid.clone(),
            spawns: config.spawns.clone(),
        })
    }

    /// Emits the commands that populate a freshly reset round.
    ///
    /// Commands are appended only when generation succeeds, so a failure
    /// leaves `out` untouched.
    pub fn generate(
        &self,
        random: &mut SpatialRandom,
        out: &mut Vec<Command>,
    ) -> Result<RoundLayout, GenerationError> {
        let mut commands = Vec::new();
        self.place_borders(&mut commands);
        self.place_field_walls(random, &mut commands);

        let player = random.next_position(true);
        let exit_point = random.next_position_far_from(player, true)?;
        commands.push(Command::SpawnEntity {
            kind: EntityKind::Player,
            position: player,
        });
        commands.push(Command::SpawnEntity {
            kind: EntityKind::ExitPoint,
            position: exit_point,
        });

        for kind in SECONDARY_KINDS {
            let Some(rule) = self.spawns.rule(kind) else {
                continue;
            };
            for _ in 0..rule.max_occurrences {
                if !random.has_chance_occurred(rule.chance) {
                    continue;
                }
                let position = random.next_position(false);
                commands.push(Command::ClearWalls { position });
                commands.push(Command::SpawnEntity { kind, position });
            }
        }

        for centre in [player, exit_point] {
            commands.extend(
                centre
                    .neighborhood()
                    .map(|position| Command::ClearWalls { position }),
            );
        }

        out.append(&mut commands);
        Ok(RoundLayout { player, exit_point })
    }

    fn place_borders(&self, out: &mut Vec<Command>) {
        let grid = &self.grid;
        let bottom = grid.height - 1;
        let right = grid.width - 1;
        for column in 0..grid.width {
            out.push(wall(column, grid.top_offset));
            out.push(wall(column, bottom));
        }
        for row in grid.top_offset..bottom {
            out.push(wall(0, row));
            out.push(wall(right, row));
        }
    }

    fn place_field_walls(&self, random: &mut SpatialRandom, out: &mut Vec<Command>) {
        let count = random.roll_inclusive(self.grid.wall_density_min, self.grid.wall_density_max);
        for _ in 0..count {
            let position = random.next_position(false);
            out.push(Command::SpawnEntity {
                kind: EntityKind::Wall,
                position,
            });
        }
    }
}

impl LayoutBuilder for Generator {
    fn build(
        &self,
        random: &mut SpatialRandom,
        out: &mut Vec<Command>,
    ) -> Result<RoundLayout, GenerationError> {
        self.generate(random, out)
    }
}

fn wall(column: u32, row: u32) -> Command {
    Command::SpawnEntity {
        kind: EntityKind::Wall,
        position: Position::new(column, row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configuration_is_rejected_up_front() {
        let mut config = GameConfig::default();
        config.grid.wall_density_max = 10_000;
        assert!(matches!(
            Generator::new(&config),
            Err(GenerationError::Config(
                ConfigError::WallDensityExceedsCapacity { .. }
            ))
        ));
    }

    #[test]
    fn failed_placement_leaves_commands_untouched() {
        let config = GameConfig::default();
        let generator = Generator::new(&config).expect("default config is valid");
        let unreachable = GridConfig {
            close_distance: 10_000.0,
            ..config.grid.clone()
        };
        let mut random = SpatialRandom::new(5, unreachable);
        let mut commands = Vec::new();

        let result = generator.generate(&mut random, &mut commands);

        assert!(matches!(result, Err(GenerationError::Placement(_))));
        assert!(commands.is_empty());
    }

    #[test]
    fn border_covers_every_edge_cell() {
        let config = GameConfig::default();
        let generator = Generator::new(&config).expect("default config is valid");
        let mut commands = Vec::new();
        generator.place_borders(&mut commands);

        let grid = &config.grid;
        let expected = 2 * grid.width + 2 * (grid.height - 1 - grid.top_offset);
        assert_eq!(commands.len(), expected as usize);
        assert!(commands.contains(&wall(0, grid.top_offset)));
        assert!(commands.contains(&wall(grid.width - 1, grid.height - 1)));
    }
}
