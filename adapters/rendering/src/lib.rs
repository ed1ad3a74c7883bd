#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Escape the Maze adapters.
//!
//! Backends implement [`Canvas`]; this crate decides what to draw by
//! translating world events into cell redraws and composing the heads-up
//! display shown above the maze.

use std::{collections::BTreeSet, io};

use escape_maze_core::{Color, Event, Position};
use escape_maze_world::{query, World};

/// Color of HUD captions.
pub const KEY_COLOR: Color = Color::Gray;
/// Color of HUD values that demand attention.
pub const LOW_VALUE_COLOR: Color = Color::Red;
/// Hearts at or below which the HUD flags them.
pub const LOW_HEARTS: u32 = 2;
/// Seconds at or below which the HUD flags the clock.
pub const LOW_TIME: u32 = 10;

const SEPARATOR: &str = "    ";

/// Piece of colored text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Text to print.
    pub text: String,
    /// Foreground color.
    pub color: Color,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Character grid a backend draws on.
pub trait Canvas {
    /// Draws a glyph at a cell.
    fn draw_glyph(&mut self, glyph: char, position: Position, color: Color) -> io::Result<()>;

    /// Blanks a cell.
    fn clear(&mut self, position: Position) -> io::Result<()>;

    /// Blanks an entire row.
    fn clear_line(&mut self, row: u32) -> io::Result<()>;

    /// Writes colored text at the start of a row.
    fn write_line(&mut self, row: u32, segments: &[Segment]) -> io::Result<()>;

    /// Presents pending output.
    fn flush(&mut self) -> io::Result<()>;
}

/// Redraws a cell from the world's current contents.
pub fn redraw_cell(world: &World, position: Position, canvas: &mut dyn Canvas) -> io::Result<()> {
    match query::entity_at(world, position) {
        Some(entity) => {
            let appearance = entity.appearance(query::wall_color(world));
            canvas.draw_glyph(appearance.glyph, position, appearance.color)
        }
        None => canvas.clear(position),
    }
}

/// Draws the cells touched by `events`, reading their final contents from `world`.
pub fn draw_events(world: &World, events: &[Event], canvas: &mut dyn Canvas) -> io::Result<()> {
    let mut dirty = BTreeSet::new();
    for event in events {
        match event {
            Event::RoundReset { .. } => {
                let grid = query::grid(world);
                for row in grid.top_offset..grid.height {
                    canvas.clear_line(row)?;
                }
            }
            Event::EntitySpawned { position, .. }
            | Event::WallsCleared { position }
            | Event::WallRestored { position }
            | Event::ItemCollected { position, .. } => {
                let _ = dirty.insert(*position);
            }
            Event::PlayerMoved { from, to } | Event::PlayerRespawned { from, to } => {
                let _ = dirty.insert(*from);
                let _ = dirty.insert(*to);
            }
            Event::SessionBegan { .. }
            | Event::ScoreChanged { .. }
            | Event::BalanceChanged { .. }
            | Event::ArmorConsumed { .. }
            | Event::HeartLost { .. }
            | Event::HeartRestored { .. }
            | Event::TimeExtended { .. }
            | Event::SecondElapsed { .. }
            | Event::RoundEnded { .. } => {}
        }
    }
    for position in dirty {
        redraw_cell(world, position, canvas)?;
    }
    Ok(())
}

/// Diagnostics shown below the HUD in debug mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugInfo {
    /// Current player position.
    pub player: Position,
    /// Distance between the player and the exit point.
    pub exit_distance: f64,
    /// Seed of the random source.
    pub seed: u64,
}

/// Values displayed by the heads-up display.
#[derive(Clone, Debug, PartialEq)]
pub struct HudState {
    /// One-based round number.
    pub round: u32,
    /// Rounds in a full session.
    pub max_rounds: u32,
    /// Hearts left.
    pub hearts: u32,
    /// Armor left.
    pub armor: u32,
    /// Session score.
    pub score: u32,
    /// Session balance.
    pub balance: u32,
    /// Seconds left on the round clock.
    pub time_left: u32,
    /// Color of the round's walls, reused for HUD values.
    pub value_color: Color,
    /// Diagnostics, present in debug mode.
    pub debug: Option<DebugInfo>,
}

impl HudState {
    /// Captures the HUD values from the world.
    #[must_use]
    pub fn capture(world: &World, max_rounds: u32, debug_seed: Option<u64>) -> Self {
        let vars = query::variables(world);
        let debug = match (debug_seed, query::player(world), query::exit_point(world)) {
            (Some(seed), Some(player), Some(exit)) => Some(DebugInfo {
                player,
                exit_distance: player.distance_to(exit),
                seed,
            }),
            _ => None,
        };
        Self {
            round: query::round(world),
            max_rounds,
            hearts: vars.hearts(),
            armor: vars.armor(),
            score: vars.score(),
            balance: vars.balance(),
            time_left: vars.time_left(),
            value_color: query::wall_color(world),
            debug,
        }
    }

    /// Segments of the status line.
    #[must_use]
    pub fn status_line(&self) -> Vec<Segment> {
        let value = self.value_color;
        let hearts_color = if self.hearts <= LOW_HEARTS {
            LOW_VALUE_COLOR
        } else {
            value
        };
        let time_color = if self.time_left <= LOW_TIME {
            LOW_VALUE_COLOR
        } else {
            value
        };
        let plural = if self.time_left == 1 { "" } else { "s" };
        vec![
            Segment::new("Round ", KEY_COLOR),
            Segment::new(self.round.to_string(), value),
            Segment::new("/", KEY_COLOR),
            Segment::new(self.max_rounds.to_string(), value),
            Segment::new(format!("{SEPARATOR}Hearts: "), KEY_COLOR),
            Segment::new(self.hearts.to_string(), hearts_color),
            Segment::new(format!("{SEPARATOR}Armors: "), KEY_COLOR),
            Segment::new(self.armor.to_string(), value),
            Segment::new(format!("{SEPARATOR}Score: "), KEY_COLOR),
            Segment::new(self.score.to_string(), value),
            Segment::new(format!("{SEPARATOR}Balance: "), KEY_COLOR),
            Segment::new(format!("${}", self.balance), value),
            Segment::new(format!("{SEPARATOR}Time left: "), KEY_COLOR),
            Segment::new(format!("{} second{plural}", self.time_left), time_color),
        ]
    }

    /// Segments of the debug line, if enabled.
    #[must_use]
    pub fn debug_line(&self) -> Option<Vec<Segment>> {
        let debug = self.debug?;
        let value = self.value_color;
        Some(vec![
            Segment::new("Player position: ", KEY_COLOR),
            Segment::new(debug.player.to_string(), value),
            Segment::new(format!("{SEPARATOR}Player & Exit point dist.: "), KEY_COLOR),
            Segment::new(format!("{:.1}", debug.exit_distance), value),
            Segment::new(format!("{SEPARATOR}Random seed: "), KEY_COLOR),
            Segment::new(debug.seed.to_string(), value),
        ])
    }
}

/// Draws the HUD on the rows above the maze.
pub fn draw_hud(hud: &HudState, canvas: &mut dyn Canvas) -> io::Result<()> {
    canvas.clear_line(0)?;
    canvas.clear_line(1)?;
    canvas.write_line(0, &hud.status_line())?;
    if let Some(line) = hud.debug_line() {
        canvas.write_line(1, &line)?;
    }
    canvas.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_maze_core::{Command, EntityKind, GridConfig};
    use escape_maze_world as world;

    #[derive(Debug, Default)]
    struct Recorder {
        ops: Vec<String>,
    }

    impl Canvas for Recorder {
        fn draw_glyph(&mut self, glyph: char, position: Position, color: Color) -> io::Result<()> {
            self.ops.push(format!("draw {glyph} {position} {color:?}"));
            Ok(())
        }

        fn clear(&mut self, position: Position) -> io::Result<()> {
            self.ops.push(format!("clear {position}"));
            Ok(())
        }

        fn clear_line(&mut self, row: u32) -> io::Result<()> {
            self.ops.push(format!("clear_line {row}"));
            Ok(())
        }

        fn write_line(&mut self, row: u32, segments: &[Segment]) -> io::Result<()> {
            let text: String = segments.iter().map(|segment| segment.text.as_str()).collect();
            self.ops.push(format!("line {row} {text}"));
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(world, command, &mut events);
        }
        events
    }

    fn round_world() -> World {
        let mut world = World::new(GridConfig::default());
        let _ = run(
            &mut world,
            vec![
                Command::BeginSession {
                    hearts: 2,
                    armor: 1,
                },
                Command::ResetRound {
                    time_limit: 11,
                    wall_color: Color::Cyan,
                },
                Command::SpawnEntity {
                    kind: EntityKind::Player,
                    position: Position::new(5, 5),
                },
                Command::SpawnEntity {
                    kind: EntityKind::Wall,
                    position: Position::new(6, 5),
                },
            ],
        );
        world
    }

    #[test]
    fn moving_redraws_both_cells() {
        let mut world = round_world();
        let events = run(
            &mut world,
            vec![Command::MovePlayer {
                to: Position::new(5, 6),
            }],
        );
        let mut canvas = Recorder::default();

        draw_events(&world, &events, &mut canvas).expect("recorder never fails");

        assert_eq!(
            canvas.ops,
            vec!["clear (5, 5)".to_owned(), "draw ☻ (5, 6) Green".to_owned()]
        );
    }

    #[test]
    fn respawn_restores_the_wall_glyph_in_round_color() {
        let mut world = round_world();
        let events = run(
            &mut world,
            vec![
                Command::MovePlayer {
                    to: Position::new(6, 5),
                },
                Command::RespawnPlayer,
            ],
        );
        let mut canvas = Recorder::default();

        draw_events(&world, &events, &mut canvas).expect("recorder never fails");

        assert_eq!(
            canvas.ops,
            vec!["draw ☻ (5, 5) Green".to_owned(), "draw ▓ (6, 5) Cyan".to_owned()]
        );
    }

    #[test]
    fn hud_flags_low_values() {
        let mut world = round_world();
        let _ = run(&mut world, vec![Command::ElapseSecond]);
        let hud = HudState::capture(&world, 10, None);

        let line = hud.status_line();
        let hearts = line.iter().position(|segment| segment.text == "2").expect("hearts shown");
        assert_eq!(line[hearts].color, LOW_VALUE_COLOR);
        let time = line.last().expect("time shown");
        assert_eq!(time.text, "10 seconds");
        assert_eq!(time.color, LOW_VALUE_COLOR);
        assert_eq!(line[1].color, Color::Cyan);
        assert!(hud.debug_line().is_none());
    }

    #[test]
    fn debug_line_reports_seed_and_distance() {
        let mut world = round_world();
        let _ = run(
            &mut world,
            vec![Command::SpawnEntity {
                kind: EntityKind::ExitPoint,
                position: Position::new(8, 9),
            }],
        );
        let hud = HudState::capture(&world, 10, Some(77));
        let mut canvas = Recorder::default();

        draw_hud(&hud, &mut canvas).expect("recorder never fails");

        assert_eq!(
            canvas.ops.last().map(String::as_str),
            Some(
                "line 1 Player position: (5, 5)    Player & Exit point dist.: 5.0    Random seed: 77"
            )
        );
    }
}
