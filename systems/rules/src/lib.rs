#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round state machine that turns one directional input into world commands.
//!
//! A tick moves the player unconditionally once the destination is in
//! bounds, resolves the single highest priority collision at the new cell,
//! applies its effect and finally asks the world to settle the failure
//! clocks. The system never mutates the world itself.

use escape_maze_core::{
    Command, Direction, EntityKind, Position, RuleParameters, ScoringConfig,
};
use escape_maze_random::SpatialRandom;
use escape_maze_world::{query, World};

/// Directional input read from the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveInput {
    /// Axis and sense of the movement.
    pub direction: Direction,
    /// Whether the jump modifier was held.
    pub jump: bool,
}

impl MoveInput {
    /// Single-cell step in the provided direction.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        Self {
            direction,
            jump: false,
        }
    }

    /// Step with the jump modifier held.
    #[must_use]
    pub const fn jump(direction: Direction) -> Self {
        Self {
            direction,
            jump: true,
        }
    }
}

/// Movement resolved by an accepted tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Cell the player left.
    pub from: Position,
    /// Cell the player moved to.
    pub to: Position,
    /// Whether the move was a jump.
    pub leapt: bool,
    /// Entity the player collided with at the destination.
    pub collision: Option<EntityKind>,
}

/// Result of feeding one input to the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// The input left the play area or the round is already over.
    Ignored,
    /// The input moved the player and produced commands.
    Resolved(Step),
}

/// Round state machine driven by player input.
#[derive(Clone, Debug)]
pub struct RoundMachine {
    scoring: ScoringConfig,
}

impl RoundMachine {
    /// Creates a state machine using the provided score constants.
    #[must_use]
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    /// Destination of the input, or `None` when it leaves the play area.
    #[must_use]
    pub fn target(&self, world: &World, input: MoveInput, rules: &RuleParameters) -> Option<Position> {
        let player = query::player(world)?;
        let distance = if input.jump && rules.jump_enabled {
            rules.jump_distance
        } else {
            1
        };
        player
            .step(input.direction, distance)
            .filter(|candidate| query::grid(world).contains(*candidate))
    }

    /// Emits the commands of one tick.
    ///
    /// The commands must be applied in order: the move comes first, then the
    /// collision effect, then the failure check.
    pub fn handle(
        &self,
        world: &World,
        input: MoveInput,
        rules: &RuleParameters,
        random: &mut SpatialRandom,
        out: &mut Vec<Command>,
    ) -> Tick {
        if query::variables(world).state().is_terminal() {
            return Tick::Ignored;
        }
        let (Some(from), Some(to)) = (query::player(world), self.target(world, input, rules)) else {
            return Tick::Ignored;
        };

        out.push(Command::MovePlayer { to });
        let collision = query::collision_at(world, to);
        if let Some(kind) = collision {
            self.effects(kind, to, rules, random, out);
        }
        out.push(Command::SettleTick);

        Tick::Resolved(Step {
            from,
            to,
            leapt: input.jump && rules.jump_enabled,
            collision,
        })
    }

    /// Emits the effect of colliding with `kind` at `position`.
    pub fn effects(
        &self,
        kind: EntityKind,
        position: Position,
        rules: &RuleParameters,
        random: &mut SpatialRandom,
        out: &mut Vec<Command>,
    ) {
        match kind {
            EntityKind::ExitPoint => {
                out.push(Command::AwardScore {
                    amount: self.scoring.exit_bonus,
                });
                out.push(Command::CompleteRound);
            }
            EntityKind::Wall => {
                if random.has_chance_occurred(rules.wall_collision_chance) {
                    out.push(Command::DeductScore {
                        amount: rules.wall_penalty,
                    });
                    out.push(Command::AbsorbWallHit);
                }
                // Bounce back even when the hit went unpunished.
                out.push(Command::RespawnPlayer);
            }
            EntityKind::BonusPoint => {
                out.push(Command::AwardScore {
                    amount: self.scoring.bonus_point,
                });
                out.push(Command::CollectItem { kind, position });
            }
            EntityKind::Coin => {
                let amount = random.roll_inclusive(self.scoring.coin_min, self.scoring.coin_max);
                out.push(Command::DepositCash { amount });
                out.push(Command::CollectItem { kind, position });
            }
            EntityKind::FirstAidKit => {
                out.push(Command::RestoreHeart {
                    max_hearts: rules.max_hearts,
                });
                out.push(Command::CollectItem { kind, position });
            }
            EntityKind::Hourglass => {
                out.push(Command::ExtendTime {
                    seconds: self.scoring.hourglass_bonus_secs,
                });
                out.push(Command::CollectItem { kind, position });
            }
            EntityKind::Player => unreachable!("the player never collides with itself"),
        }
    }
}
