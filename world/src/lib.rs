#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state for Escape the Maze.
//!
//! The world owns the entity registry and the round variables. It is mutated
//! exclusively through [`apply`], and every observable change is reported as
//! an [`Event`] so adapters can redraw only what changed.

use std::collections::{BTreeMap, BTreeSet};

use escape_maze_core::{
    Color, Command, EntityKind, Event, FailureCause, GridConfig, Position, RoundOutcome, RoundState,
};

/// Typed collections of the entities placed in the current round.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    player: Option<Position>,
    exit_point: Option<Position>,
    walls: BTreeSet<Position>,
    items: BTreeMap<EntityKind, Vec<Position>>,
}

impl EntityRegistry {
    fn clear(&mut self) {
        self.player = None;
        self.exit_point = None;
        self.walls.clear();
        self.items.clear();
    }

    fn place(&mut self, kind: EntityKind, position: Position) {
        match kind {
            EntityKind::Player => self.player = Some(position),
            EntityKind::ExitPoint => self.exit_point = Some(position),
            EntityKind::Wall => {
                let _ = self.walls.insert(position);
            }
            EntityKind::BonusPoint
            | EntityKind::Coin
            | EntityKind::FirstAidKit
            | EntityKind::Hourglass => self.items.entry(kind).or_default().push(position),
        }
    }

    fn remove_item(&mut self, kind: EntityKind, position: Position) -> bool {
        let Some(positions) = self.items.get_mut(&kind) else {
            return false;
        };
        match positions.iter().position(|candidate| *candidate == position) {
            Some(index) => {
                let _ = positions.remove(index);
                true
            }
            None => false,
        }
    }

    /// Reports whether an entity of the provided kind occupies the cell.
    #[must_use]
    pub fn contains(&self, kind: EntityKind, position: Position) -> bool {
        match kind {
            EntityKind::Player => self.player == Some(position),
            EntityKind::ExitPoint => self.exit_point == Some(position),
            EntityKind::Wall => self.walls.contains(&position),
            EntityKind::BonusPoint
            | EntityKind::Coin
            | EntityKind::FirstAidKit
            | EntityKind::Hourglass => self
                .items
                .get(&kind)
                .is_some_and(|positions| positions.contains(&position)),
        }
    }

    /// Number of entities of the provided kind.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Player => usize::from(self.player.is_some()),
            EntityKind::ExitPoint => usize::from(self.exit_point.is_some()),
            EntityKind::Wall => self.walls.len(),
            EntityKind::BonusPoint
            | EntityKind::Coin
            | EntityKind::FirstAidKit
            | EntityKind::Hourglass => self.items.get(&kind).map_or(0, Vec::len),
        }
    }
}

/// Mutable accumulators of the running session and round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundVariables {
    hearts: u32,
    armor: u32,
    score: u32,
    balance: u32,
    time_left: u32,
    state: RoundState,
}

impl RoundVariables {
    /// Hearts left to the player.
    #[must_use]
    pub const fn hearts(&self) -> u32 {
        self.hearts
    }

    /// Armor points left to the player.
    #[must_use]
    pub const fn armor(&self) -> u32 {
        self.armor
    }

    /// Score accumulated during the session.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Cash collected during the session.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Seconds left on the round clock.
    #[must_use]
    pub const fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Lifecycle state of the current round.
    #[must_use]
    pub const fn state(&self) -> RoundState {
        self.state
    }
}

/// Represents the authoritative Escape the Maze world state.
#[derive(Debug)]
pub struct World {
    grid: GridConfig,
    registry: EntityRegistry,
    vars: RoundVariables,
    round: u32,
    wall_color: Color,
    respawn: Option<Position>,
    exit_reached: bool,
}

impl World {
    /// Creates an empty world laid out on the provided grid.
    #[must_use]
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            registry: EntityRegistry::default(),
            vars: RoundVariables::default(),
            round: 0,
            wall_color: EntityKind::Wall.default_color(),
            respawn: None,
            exit_reached: false,
        }
    }

    fn end_round(&mut self, outcome: RoundOutcome, out_events: &mut Vec<Event>) {
        self.exit_reached = false;
        self.vars.state = outcome.state();
        out_events.push(Event::RoundEnded { outcome });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginSession { hearts, armor } => {
            world.registry.clear();
            world.respawn = None;
            world.exit_reached = false;
            world.round = 0;
            world.vars = RoundVariables {
                hearts,
                armor,
                ..RoundVariables::default()
            };
            out_events.push(Event::SessionBegan { hearts, armor });
        }
        Command::ResetRound {
            time_limit,
            wall_color,
        } => {
            world.registry.clear();
            world.respawn = None;
            world.round = world.round.saturating_add(1);
            world.wall_color = wall_color;
            world.exit_reached = false;
            world.vars.time_left = time_limit;
            world.vars.state = RoundState::Ongoing;
            out_events.push(Event::RoundReset {
                round: world.round,
                time_limit,
            });
        }
        Command::SpawnEntity { kind, position } => {
            if kind == EntityKind::Player {
                world.respawn = Some(position);
            }
            world.registry.place(kind, position);
            out_events.push(Event::EntitySpawned { kind, position });
        }
        Command::ClearWalls { position } => {
            if world.registry.walls.remove(&position) {
                out_events.push(Event::WallsCleared { position });
            }
        }
        Command::MovePlayer { to } => {
            if world.vars.state.is_terminal() {
                return;
            }
            if let Some(from) = world.registry.player {
                world.registry.player = Some(to);
                out_events.push(Event::PlayerMoved { from, to });
            }
        }
        Command::RespawnPlayer => {
            let (Some(from), Some(to)) = (world.registry.player, world.respawn) else {
                return;
            };
            world.registry.player = Some(to);
            out_events.push(Event::PlayerRespawned { from, to });
            if world.registry.walls.contains(&from) {
                out_events.push(Event::WallRestored { position: from });
            }
        }
        Command::CollectItem { kind, position } => {
            if world.registry.remove_item(kind, position) {
                out_events.push(Event::ItemCollected { kind, position });
            }
        }
        Command::AwardScore { amount } => {
            world.vars.score = world.vars.score.saturating_add(amount);
            out_events.push(Event::ScoreChanged {
                score: world.vars.score,
            });
        }
        Command::DeductScore { amount } => {
            world.vars.score = world.vars.score.saturating_sub(amount);
            out_events.push(Event::ScoreChanged {
                score: world.vars.score,
            });
        }
        Command::DepositCash { amount } => {
            world.vars.balance = world.vars.balance.saturating_add(amount);
            out_events.push(Event::BalanceChanged {
                balance: world.vars.balance,
            });
        }
        Command::AbsorbWallHit => {
            if world.vars.armor > 0 {
                world.vars.armor -= 1;
                out_events.push(Event::ArmorConsumed {
                    remaining: world.vars.armor,
                });
            } else if world.vars.hearts > 0 {
                world.vars.hearts -= 1;
                out_events.push(Event::HeartLost {
                    remaining: world.vars.hearts,
                });
            }
        }
        Command::RestoreHeart { max_hearts } => {
            if world.vars.hearts < max_hearts {
                world.vars.hearts += 1;
                out_events.push(Event::HeartRestored {
                    hearts: world.vars.hearts,
                });
            }
        }
        Command::ExtendTime { seconds } => {
            world.vars.time_left = world.vars.time_left.saturating_add(seconds);
            out_events.push(Event::TimeExtended {
                time_left: world.vars.time_left,
            });
        }
        Command::ElapseSecond => {
            if world.vars.state == RoundState::Ongoing && world.vars.time_left > 0 {
                world.vars.time_left -= 1;
                out_events.push(Event::SecondElapsed {
                    time_left: world.vars.time_left,
                });
            }
        }
        Command::CompleteRound => {
            if world.vars.state == RoundState::Ongoing {
                world.exit_reached = true;
            }
        }
        Command::SettleTick => {
            if world.vars.state != RoundState::Ongoing {
                return;
            }
            // Exhausted hearts or time override an exit reached on the same tick.
            if world.vars.hearts == 0 {
                world.end_round(RoundOutcome::Failed(FailureCause::OutOfHearts), out_events);
            } else if world.vars.time_left == 0 {
                world.end_round(RoundOutcome::Failed(FailureCause::OutOfTime), out_events);
            } else if world.exit_reached {
                world.end_round(RoundOutcome::Successful, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{EntityRegistry, RoundVariables, World};
    use escape_maze_core::{
        Color, Entity, EntityKind, GridConfig, Position, COLLISION_PRIORITY,
    };

    /// Provides read-only access to the grid the world is laid out on.
    #[must_use]
    pub fn grid(world: &World) -> &GridConfig {
        &world.grid
    }

    /// One-based number of the current round, zero before the first round.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Snapshot of the hearts, armor, score, balance, clock and round state.
    #[must_use]
    pub fn variables(world: &World) -> &RoundVariables {
        &world.vars
    }

    /// Provides read-only access to the entity registry.
    #[must_use]
    pub fn registry(world: &World) -> &EntityRegistry {
        &world.registry
    }

    /// Current player position, if the player has been placed.
    #[must_use]
    pub fn player(world: &World) -> Option<Position> {
        world.registry.player
    }

    /// Position of the exit point, if placed.
    #[must_use]
    pub fn exit_point(world: &World) -> Option<Position> {
        world.registry.exit_point
    }

    /// Cell the player returns to after hitting a wall.
    #[must_use]
    pub fn respawn_point(world: &World) -> Option<Position> {
        world.respawn
    }

    /// Iterates the wall positions in row-major order.
    pub fn walls(world: &World) -> impl Iterator<Item = Position> + '_ {
        world.registry.walls.iter().copied()
    }

    /// Positions of every collectible of the provided kind.
    #[must_use]
    pub fn items(world: &World, kind: EntityKind) -> &[Position] {
        world.registry.items.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Color applied to walls in the current round.
    #[must_use]
    pub fn wall_color(world: &World) -> Color {
        world.wall_color
    }

    /// Highest priority entity, other than the player, occupying the cell.
    #[must_use]
    pub fn collision_at(world: &World, position: Position) -> Option<EntityKind> {
        COLLISION_PRIORITY
            .into_iter()
            .find(|kind| world.registry.contains(*kind, position))
    }

    /// Entity drawn at the cell, with the player drawn above everything else.
    #[must_use]
    pub fn entity_at(world: &World, position: Position) -> Option<Entity> {
        if world.registry.player == Some(position) {
            return Some(Entity::new(EntityKind::Player, position));
        }
        collision_at(world, position).map(|kind| Entity::new(kind, position))
    }

    /// Every placed entity, walls first and the player last.
    #[must_use]
    pub fn entities(world: &World) -> Vec<Entity> {
        let registry = &world.registry;
        let mut entities: Vec<Entity> = registry
            .walls
            .iter()
            .map(|position| Entity::new(EntityKind::Wall, *position))
            .collect();
        for (kind, positions) in &registry.items {
            entities.extend(positions.iter().map(|position| Entity::new(*kind, *position)));
        }
        if let Some(position) = registry.exit_point {
            entities.push(Entity::new(EntityKind::ExitPoint, position));
        }
        if let Some(position) = registry.player {
            entities.push(Entity::new(EntityKind::Player, position));
        }
        entities
    }

    /// Number of entities of the provided kind.
    #[must_use]
    pub fn count(world: &World, kind: EntityKind) -> usize {
        world.registry.count(kind)
    }
}
