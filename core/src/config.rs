use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Color, EntityKind, Position, UpgradeTuning};

/// Wall colors a round's wall color is drawn from.
pub const DEFAULT_WALL_PALETTE: [Color; 9] = [
    Color::DarkGreen,
    Color::Cyan,
    Color::DarkRed,
    Color::DarkMagenta,
    Color::DarkYellow,
    Color::Gray,
    Color::DarkGray,
    Color::Cyan,
    Color::White,
];

/// Errors raised when a configuration cannot produce a playable round.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The grid leaves no room for safe placements.
    #[error("grid {width}x{height} with top offset {top_offset} is too small to play on")]
    GridTooSmall {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
        /// Configured header band.
        top_offset: u32,
    },
    /// The separation threshold cannot be satisfied inside the safe area.
    #[error("close distance {close_distance} cannot be exceeded inside the safe area")]
    SeparationUnreachable {
        /// Configured threshold.
        close_distance: f64,
    },
    /// The wall density range is inverted.
    #[error("wall density range {min}..={max} is inverted")]
    InvertedWallDensity {
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },
    /// The wall density reaches the interior capacity of the grid.
    #[error("wall density {max} must stay below the playable capacity of {capacity} cells")]
    WallDensityExceedsCapacity {
        /// Upper density bound.
        max: u32,
        /// Interior cells available.
        capacity: u64,
    },
    /// The coin reward range is inverted.
    #[error("coin range ${min}..=${max} is inverted")]
    InvertedCoinRange {
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },
    /// A spawn chance lies outside the percentage range.
    #[error("spawn chance {chance}% for {kind:?} must lie within 0..=100")]
    InvalidSpawnChance {
        /// Entity kind with the faulty rule.
        kind: EntityKind,
        /// Configured chance.
        chance: f64,
    },
    /// A collision chance lies outside the percentage range.
    #[error("wall collision chance {chance}% must lie within 0..=100")]
    InvalidCollisionChance {
        /// Configured chance.
        chance: f64,
    },
    /// No wall colors were configured.
    #[error("wall palette must contain at least one color")]
    EmptyPalette,
    /// A session must contain at least one round.
    #[error("a session must contain at least one round")]
    NoRounds,
}

/// Dimensions of the play area and placement constraints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns in the window.
    pub width: u32,
    /// Number of rows in the window, including the header band.
    pub height: u32,
    /// Rows reserved for the header band above the maze.
    pub top_offset: u32,
    /// Minimum number of field walls per round.
    pub wall_density_min: u32,
    /// Maximum number of field walls per round.
    pub wall_density_max: u32,
    /// Distance under which two positions count as close.
    pub close_distance: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 30,
            top_offset: 2,
            wall_density_min: 520,
            wall_density_max: 600,
            close_distance: 25.0,
        }
    }
}

impl GridConfig {
    /// Reports whether the player may stand on the provided cell.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.column() < self.width
            && position.row() >= self.top_offset
            && position.row() < self.height
    }

    /// Number of cells strictly inside the border walls.
    #[must_use]
    pub fn interior_capacity(&self) -> u64 {
        let columns = u64::from(self.width.saturating_sub(2));
        let rows = u64::from(self.height.saturating_sub(self.top_offset + 2));
        columns * rows
    }
}

/// Score, cash and round constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Rounds played by a full session.
    pub max_rounds: u32,
    /// Score granted for reaching the exit point.
    pub exit_bonus: u32,
    /// Score granted by a bonus point.
    pub bonus_point: u32,
    /// Smallest cash reward of a coin.
    pub coin_min: u32,
    /// Largest cash reward of a coin.
    pub coin_max: u32,
    /// Seconds added by an hourglass.
    pub hourglass_bonus_secs: u32,
    /// Session score that unlocks the cash bonus.
    pub session_bonus_threshold: u32,
    /// Cash granted when the threshold is reached.
    pub session_bonus_cash: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            exit_bonus: 30,
            bonus_point: 20,
            coin_min: 15,
            coin_max: 50,
            hourglass_bonus_secs: 15,
            session_bonus_threshold: 600,
            session_bonus_cash: 250,
        }
    }
}

/// Chance and cap governing how often a collectible appears.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Percentage chance rolled for every attempt.
    pub chance: f64,
    /// Number of attempts per round.
    pub max_occurrences: u32,
}

impl SpawnRule {
    /// Creates a new spawn rule.
    #[must_use]
    pub const fn new(chance: f64, max_occurrences: u32) -> Self {
        Self {
            chance,
            max_occurrences,
        }
    }
}

/// Spawn rules for each collectible kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTable {
    /// Bonus point rule.
    pub bonus_point: SpawnRule,
    /// Coin rule.
    pub coin: SpawnRule,
    /// First aid kit rule.
    pub first_aid_kit: SpawnRule,
    /// Hourglass rule.
    pub hourglass: SpawnRule,
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self {
            bonus_point: SpawnRule::new(45.0, 3),
            coin: SpawnRule::new(40.0, 2),
            first_aid_kit: SpawnRule::new(22.5, 2),
            hourglass: SpawnRule::new(25.0, 1),
        }
    }
}

impl SpawnTable {
    /// Rule for a collectible kind, or `None` for kinds placed unconditionally.
    #[must_use]
    pub const fn rule(&self, kind: EntityKind) -> Option<SpawnRule> {
        match kind {
            EntityKind::BonusPoint => Some(self.bonus_point),
            EntityKind::Coin => Some(self.coin),
            EntityKind::FirstAidKit => Some(self.first_aid_kit),
            EntityKind::Hourglass => Some(self.hourglass),
            EntityKind::Player | EntityKind::ExitPoint | EntityKind::Wall => None,
        }
    }
}

/// Every tunable of the game, loaded from defaults or a TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play area dimensions.
    pub grid: GridConfig,
    /// Score and cash constants.
    pub scoring: ScoringConfig,
    /// Collectible spawn rules.
    pub spawns: SpawnTable,
    /// Values applied by purchased upgrades.
    pub upgrades: UpgradeTuning,
    /// Wall colors drawn at random for each round.
    pub wall_palette: Vec<Color>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            scoring: ScoringConfig::default(),
            spawns: SpawnTable::default(),
            upgrades: UpgradeTuning::default(),
            wall_palette: DEFAULT_WALL_PALETTE.to_vec(),
        }
    }
}

impl GameConfig {
    /// Rejects configurations that cannot generate a playable round.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.width <= 4 || grid.height <= grid.top_offset + 4 {
            return Err(ConfigError::GridTooSmall {
                width: grid.width,
                height: grid.height,
                top_offset: grid.top_offset,
            });
        }

        // A centred player must still have a cell beyond the threshold.
        let safe_columns = f64::from(grid.width - 4);
        let safe_rows = f64::from(grid.height - grid.top_offset - 4);
        if safe_columns.hypot(safe_rows) / 2.0 <= grid.close_distance {
            return Err(ConfigError::SeparationUnreachable {
                close_distance: grid.close_distance,
            });
        }

        if grid.wall_density_min > grid.wall_density_max {
            return Err(ConfigError::InvertedWallDensity {
                min: grid.wall_density_min,
                max: grid.wall_density_max,
            });
        }
        let capacity = grid.interior_capacity();
        if u64::from(grid.wall_density_max) >= capacity {
            return Err(ConfigError::WallDensityExceedsCapacity {
                max: grid.wall_density_max,
                capacity,
            });
        }

        if self.scoring.coin_min > self.scoring.coin_max {
            return Err(ConfigError::InvertedCoinRange {
                min: self.scoring.coin_min,
                max: self.scoring.coin_max,
            });
        }
        if self.scoring.max_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }

        for kind in crate::SECONDARY_KINDS {
            if let Some(rule) = self.spawns.rule(kind) {
                if !(0.0..=100.0).contains(&rule.chance) {
                    return Err(ConfigError::InvalidSpawnChance {
                        kind,
                        chance: rule.chance,
                    });
                }
            }
        }

        for chance in [
            self.upgrades.wall_collision_chance,
            self.upgrades.nicer_walls_collision_chance,
        ] {
            if !(0.0..=100.0).contains(&chance) {
                return Err(ConfigError::InvalidCollisionChance { chance });
            }
        }

        if self.wall_palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn density_at_capacity_is_rejected() {
        let mut config = GameConfig::default();
        config.grid.width = 30;
        config.grid.height = 12;
        config.grid.close_distance = 5.0;
        config.grid.wall_density_min = 10;
        config.grid.wall_density_max = 28 * 8;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WallDensityExceedsCapacity { capacity: 224, .. })
        ));
    }

    #[test]
    fn unreachable_separation_is_rejected() {
        let mut config = GameConfig::default();
        config.grid.close_distance = 200.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SeparationUnreachable { .. })
        ));
    }

    #[test]
    fn tiny_grids_are_rejected() {
        let mut config = GameConfig::default();
        config.grid.height = 6;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn spawn_chances_must_be_percentages() {
        let mut config = GameConfig::default();
        config.spawns.coin.chance = 120.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidSpawnChance {
                kind: EntityKind::Coin,
                chance: 120.0,
            })
        );
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            wall_palette = ["red", "blue"]

            [grid]
            width = 80

            [scoring]
            max_rounds = 3
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.grid.width, 80);
        assert_eq!(config.grid.height, 30);
        assert_eq!(config.scoring.max_rounds, 3);
        assert_eq!(config.scoring.exit_bonus, 30);
        assert_eq!(config.wall_palette, vec![Color::Red, Color::Blue]);
        assert_eq!(config.validate(), Ok(()));
    }
}
