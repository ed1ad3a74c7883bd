#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Escape the Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative round world, and pure systems. Systems and the session
//! orchestrator submit [`Command`] values describing desired mutations, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values that adapters translate into draw calls and
//! audio cues. Nothing in this crate performs I/O.

mod config;
mod upgrades;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::{
    ConfigError, GameConfig, GridConfig, ScoringConfig, SpawnRule, SpawnTable,
    DEFAULT_WALL_PALETTE,
};
pub use upgrades::{RuleParameters, Upgrade, UpgradeSet, UpgradeTuning};

/// Title shown above the login and menu screens.
pub const GAME_TITLE: &str = "Escape The Maze";

/// Entity kinds checked for collisions, ordered from highest to lowest priority.
pub const COLLISION_PRIORITY: [EntityKind; 6] = [
    EntityKind::ExitPoint,
    EntityKind::Wall,
    EntityKind::BonusPoint,
    EntityKind::Coin,
    EntityKind::FirstAidKit,
    EntityKind::Hourglass,
];

/// Collectible entity kinds placed after the player and exit point, in placement order.
pub const SECONDARY_KINDS: [EntityKind; 4] = [
    EntityKind::BonusPoint,
    EntityKind::Coin,
    EntityKind::FirstAidKit,
    EntityKind::Hourglass,
];

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    column: u32,
    row: u32,
}

impl Position {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Euclidean distance between the two cells.
    #[must_use]
    pub fn distance_to(&self, other: Position) -> f64 {
        let columns = f64::from(self.column) - f64::from(other.column);
        let rows = f64::from(self.row) - f64::from(other.row);
        columns.hypot(rows)
    }

    /// Reports whether `other` lies within `threshold` cells of this position.
    #[must_use]
    pub fn is_close_to(&self, other: Position, threshold: f64) -> bool {
        self.distance_to(other) <= threshold
    }

    /// Cell reached by travelling `distance` cells in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    #[must_use]
    pub fn step(&self, direction: Direction, distance: u32) -> Option<Position> {
        match direction {
            Direction::North => self
                .row
                .checked_sub(distance)
                .map(|row| Position::new(self.column, row)),
            Direction::South => self
                .row
                .checked_add(distance)
                .map(|row| Position::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(distance)
                .map(|column| Position::new(column, self.row)),
            Direction::East => self
                .column
                .checked_add(distance)
                .map(|column| Position::new(column, self.row)),
        }
    }

    /// The 3x3 block of cells centred on this position, including the centre.
    ///
    /// Cells that would have a negative coordinate are omitted.
    pub fn neighborhood(&self) -> impl Iterator<Item = Position> {
        let column = self.column;
        let row = self.row;
        (0..3u32).flat_map(move |dr| {
            (0..3u32).filter_map(move |dc| {
                let c = (column + dc).checked_sub(1)?;
                let r = (row + dr).checked_sub(1)?;
                Some(Position::new(c, r))
            })
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Terminal palette understood by every render backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Black.
    Black,
    /// Dark blue.
    DarkBlue,
    /// Dark green.
    DarkGreen,
    /// Dark cyan.
    DarkCyan,
    /// Dark red.
    DarkRed,
    /// Dark magenta.
    DarkMagenta,
    /// Dark yellow.
    DarkYellow,
    /// Light gray; the default text color.
    Gray,
    /// Dark gray.
    DarkGray,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Cyan.
    Cyan,
    /// Red.
    Red,
    /// Magenta.
    Magenta,
    /// Yellow.
    Yellow,
    /// White.
    White,
}

/// Closed set of entities that can occupy a maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// The playable character.
    Player,
    /// The destination of every round.
    ExitPoint,
    /// Obstacle that penalises collisions.
    Wall,
    /// Collectible that grants score.
    BonusPoint,
    /// Collectible that grants cash.
    Coin,
    /// Collectible that restores a heart.
    FirstAidKit,
    /// Collectible that extends the round clock.
    Hourglass,
}

impl EntityKind {
    /// Every entity kind in declaration order.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Player,
        EntityKind::ExitPoint,
        EntityKind::Wall,
        EntityKind::BonusPoint,
        EntityKind::Coin,
        EntityKind::FirstAidKit,
        EntityKind::Hourglass,
    ];

    /// Glyph drawn for the entity.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            EntityKind::Player => '☻',
            EntityKind::ExitPoint => '■',
            EntityKind::Wall => '▓',
            EntityKind::BonusPoint => '♦',
            EntityKind::Coin => '$',
            EntityKind::FirstAidKit => '♥',
            EntityKind::Hourglass => 'ϴ',
        }
    }

    /// Color used for the entity. Walls are recolored per round.
    #[must_use]
    pub const fn default_color(self) -> Color {
        match self {
            EntityKind::Player | EntityKind::Coin => Color::Green,
            EntityKind::ExitPoint => Color::Red,
            EntityKind::Wall => Color::Gray,
            EntityKind::BonusPoint => Color::Yellow,
            EntityKind::FirstAidKit | EntityKind::Hourglass => Color::Magenta,
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            EntityKind::Player => "Player",
            EntityKind::ExitPoint => "Exit Point",
            EntityKind::Wall => "Wall",
            EntityKind::BonusPoint => "Bonus Point",
            EntityKind::Coin => "Coin",
            EntityKind::FirstAidKit => "First Aid Kit",
            EntityKind::Hourglass => "Hourglass",
        }
    }

    /// Reports whether the entity is removed when the player collects it.
    #[must_use]
    pub const fn is_collectible(self) -> bool {
        matches!(
            self,
            EntityKind::BonusPoint
                | EntityKind::Coin
                | EntityKind::FirstAidKit
                | EntityKind::Hourglass
        )
    }

    /// Player-facing description using the active configuration and rules.
    #[must_use]
    pub fn description(self, config: &GameConfig, rules: &RuleParameters) -> String {
        let scoring = &config.scoring;
        match self {
            EntityKind::Player => "Your main, playable character in the game.".to_owned(),
            EntityKind::ExitPoint => format!(
                "Your main destination in each round. Reaching it grants you {} score.",
                scoring.exit_bonus
            ),
            EntityKind::Wall => format!(
                "The main obstacles in the game. Colliding with one deducts a heart, {} score \
                 and causes you to respawn, so be extra careful around those.",
                rules.wall_penalty
            ),
            EntityKind::BonusPoint => format!(
                "Collecting one increments your score by {}.",
                scoring.bonus_point
            ),
            EntityKind::Coin => format!(
                "Your main source of income, increases your balance by a random value \
                 ranging from ${} to ${}.",
                scoring.coin_min, scoring.coin_max
            ),
            EntityKind::FirstAidKit => format!(
                "Restores a heart; however, you won't receive more if you already have {}.",
                rules.max_hearts
            ),
            EntityKind::Hourglass => format!(
                "Buys you some more time by adding {} seconds to the round clock.",
                scoring.hourglass_bonus_secs
            ),
        }
    }
}

/// Display attributes resolved for a placed entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Appearance {
    /// Glyph to draw.
    pub glyph: char,
    /// Foreground color of the glyph.
    pub color: Color,
}

/// An entity placed at a cell of the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Variant of the entity.
    pub kind: EntityKind,
    /// Cell the entity occupies.
    pub position: Position,
}

impl Entity {
    /// Creates a new entity descriptor.
    #[must_use]
    pub const fn new(kind: EntityKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// Resolves the glyph and color, substituting the round's wall color for walls.
    #[must_use]
    pub const fn appearance(&self, wall_color: Color) -> Appearance {
        let color = match self.kind {
            EntityKind::Wall => wall_color,
            other => other.default_color(),
        };
        Appearance {
            glyph: self.kind.glyph(),
            color,
        }
    }
}

/// Lifecycle of a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RoundState {
    /// The player is still navigating the maze.
    #[default]
    Ongoing,
    /// The player reached the exit point.
    Successful,
    /// The player ran out of hearts or time.
    Failure,
}

impl RoundState {
    /// Reports whether the round has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, RoundState::Ongoing)
    }
}

/// Reason a round ended in failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureCause {
    /// Hearts dropped to zero.
    OutOfHearts,
    /// The round clock reached zero.
    OutOfTime,
}

/// Terminal result of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundOutcome {
    /// The exit point was reached.
    Successful,
    /// The round was lost for the provided reason.
    Failed(FailureCause),
}

impl RoundOutcome {
    /// Round state that corresponds to the outcome.
    #[must_use]
    pub const fn state(self) -> RoundState {
        match self {
            RoundOutcome::Successful => RoundState::Successful,
            RoundOutcome::Failed(_) => RoundState::Failure,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a new session, resetting every accumulator.
    BeginSession {
        /// Hearts available at the start of the session.
        hearts: u32,
        /// Armor points carried over from the player's profile.
        armor: u32,
    },
    /// Clears all entities and restarts the round clock.
    ResetRound {
        /// Seconds available to finish the round.
        time_limit: u32,
        /// Color applied to every wall in the round.
        wall_color: Color,
    },
    /// Places an entity at the provided cell.
    SpawnEntity {
        /// Kind of entity to place.
        kind: EntityKind,
        /// Cell receiving the entity.
        position: Position,
    },
    /// Removes any wall occupying the provided cell.
    ClearWalls {
        /// Cell to clear.
        position: Position,
    },
    /// Moves the player to the provided cell.
    MovePlayer {
        /// Destination cell.
        to: Position,
    },
    /// Returns the player to the round's respawn point.
    RespawnPlayer,
    /// Removes a single collectible of the given kind from the provided cell.
    CollectItem {
        /// Kind of collectible.
        kind: EntityKind,
        /// Cell holding the collectible.
        position: Position,
    },
    /// Increases the session score.
    AwardScore {
        /// Score to add.
        amount: u32,
    },
    /// Decreases the session score, flooring at zero.
    DeductScore {
        /// Score to subtract.
        amount: u32,
    },
    /// Adds cash to the session balance.
    DepositCash {
        /// Cash to add.
        amount: u32,
    },
    /// Consumes one armor point, or a heart when no armor remains.
    AbsorbWallHit,
    /// Restores one heart without exceeding the provided capacity.
    RestoreHeart {
        /// Maximum hearts the player may hold.
        max_hearts: u32,
    },
    /// Adds seconds to the round clock.
    ExtendTime {
        /// Seconds to add.
        seconds: u32,
    },
    /// Removes one second from the round clock.
    ElapseSecond,
    /// Records that the player reached the exit point during this tick.
    CompleteRound,
    /// Ends the round: in failure when hearts or time are exhausted,
    /// otherwise successfully when the exit point was reached.
    SettleTick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new session started.
    SessionBegan {
        /// Hearts available to the player.
        hearts: u32,
        /// Armor points available to the player.
        armor: u32,
    },
    /// Confirms that a new round was prepared.
    RoundReset {
        /// One-based round number.
        round: u32,
        /// Seconds available to finish the round.
        time_limit: u32,
    },
    /// Confirms that an entity was placed.
    EntitySpawned {
        /// Kind of the placed entity.
        kind: EntityKind,
        /// Cell holding the entity.
        position: Position,
    },
    /// Reports that a wall was removed from a cell.
    WallsCleared {
        /// Cell that no longer holds a wall.
        position: Position,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Cell the player left.
        from: Position,
        /// Cell the player entered.
        to: Position,
    },
    /// Confirms that the player was returned to the respawn point.
    PlayerRespawned {
        /// Cell the player left.
        from: Position,
        /// Respawn point the player now occupies.
        to: Position,
    },
    /// Reports that a wall cell vacated by the player shows its wall again.
    WallRestored {
        /// Cell holding the wall.
        position: Position,
    },
    /// Confirms that a collectible was removed.
    ItemCollected {
        /// Kind of the collected entity.
        kind: EntityKind,
        /// Cell the collectible occupied.
        position: Position,
    },
    /// Reports the updated session score.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
    /// Reports the updated session balance.
    BalanceChanged {
        /// Balance after the change.
        balance: u32,
    },
    /// Reports that armor absorbed a wall hit.
    ArmorConsumed {
        /// Armor points left.
        remaining: u32,
    },
    /// Reports that a heart was lost.
    HeartLost {
        /// Hearts left.
        remaining: u32,
    },
    /// Reports that a heart was restored.
    HeartRestored {
        /// Hearts after restoration.
        hearts: u32,
    },
    /// Reports that the round clock was extended.
    TimeExtended {
        /// Seconds left after the extension.
        time_left: u32,
    },
    /// Reports that one second of the round clock elapsed.
    SecondElapsed {
        /// Seconds left.
        time_left: u32,
    },
    /// Announces that the round reached a terminal state.
    RoundEnded {
        /// How the round ended.
        outcome: RoundOutcome,
    },
}

/// Discrete sound effects fired by the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// A menu key was pressed.
    MenuNavigation,
    /// An upgrade was purchased.
    UpgradePurchase,
    /// A round was lost.
    Failure,
    /// The player leapt using the jump upgrade.
    BootsOfLeaping,
    /// The player took a regular step.
    Footstep,
    /// The player reached the exit point.
    ExitPoint,
    /// The player hit a wall.
    WallCollision,
    /// A bonus point was collected.
    BonusPoint,
    /// A coin was collected.
    Coin,
    /// A first aid kit was collected.
    FirstAidKit,
    /// An hourglass was collected.
    Hourglass,
}

impl AudioCue {
    /// Cue played when the player collides with an entity of the given kind.
    #[must_use]
    pub const fn for_collision(kind: EntityKind) -> Option<AudioCue> {
        match kind {
            EntityKind::Player => None,
            EntityKind::ExitPoint => Some(AudioCue::ExitPoint),
            EntityKind::Wall => Some(AudioCue::WallCollision),
            EntityKind::BonusPoint => Some(AudioCue::BonusPoint),
            EntityKind::Coin => Some(AudioCue::Coin),
            EntityKind::FirstAidKit => Some(AudioCue::FirstAidKit),
            EntityKind::Hourglass => Some(AudioCue::Hourglass),
        }
    }
}

/// Looping background sounds signalling danger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackgroundCue {
    /// The round clock is nearly exhausted.
    RunningOutOfTime,
    /// The player is nearly out of hearts.
    LowOnHearts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighborhood_skips_negative_cells() {
        let cells: Vec<_> = Position::new(0, 0).neighborhood().collect();
        assert_eq!(
            cells,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1),
            ]
        );
        assert_eq!(Position::new(5, 5).neighborhood().count(), 9);
    }

    #[test]
    fn step_refuses_negative_coordinates() {
        let origin = Position::new(1, 1);
        assert_eq!(origin.step(Direction::North, 2), None);
        assert_eq!(origin.step(Direction::West, 1), Some(Position::new(0, 1)));
        assert_eq!(origin.step(Direction::South, 2), Some(Position::new(1, 3)));
    }

    #[test]
    fn closeness_is_inclusive() {
        let a = Position::new(0, 0);
        assert!(a.is_close_to(Position::new(3, 4), 5.0));
        assert!(!a.is_close_to(Position::new(3, 5), 5.0));
    }

    #[test]
    fn walls_use_the_round_color() {
        let wall = Entity::new(EntityKind::Wall, Position::new(1, 1));
        assert_eq!(wall.appearance(Color::Cyan).color, Color::Cyan);
        let coin = Entity::new(EntityKind::Coin, Position::new(1, 1));
        assert_eq!(coin.appearance(Color::Cyan).color, Color::Green);
    }
}
