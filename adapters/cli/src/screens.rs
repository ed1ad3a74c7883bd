//! Text pages shown outside of rounds.

use std::{io, time::Duration};

use escape_maze_core::{Color, EntityKind, FailureCause, GameConfig, RoundOutcome, GAME_TITLE};
use escape_maze_rendering::{Canvas, Segment, KEY_COLOR};
use escape_maze_session::{RoundSummary, SessionReport};
use escape_maze_system_progression::{Offer, Profile, PurchaseError, Roster};
use escape_maze_terminal::TerminalCanvas;

/// Column at which paragraphs wrap.
const PAGE_WIDTH: usize = 96;

/// Entries of the main menu, in the order they are numbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MenuOption {
    Play,
    Leaderboard,
    UpgradeShop,
    ChangeAccount,
    About,
    Exit,
}

impl MenuOption {
    pub(crate) const ALL: [Self; 6] = [
        Self::Play,
        Self::Leaderboard,
        Self::UpgradeShop,
        Self::ChangeAccount,
        Self::About,
        Self::Exit,
    ];

    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Leaderboard => "Leaderboard",
            Self::UpgradeShop => "Upgrade shop",
            Self::ChangeAccount => "Change account",
            Self::About => "About",
            Self::Exit => "Exit",
        }
    }

    /// Option numbered by `key`, counting from 1.
    pub(crate) fn from_digit(key: char) -> Option<Self> {
        let index = usize::try_from(key.to_digit(10)?).ok()?.checked_sub(1)?;
        Self::ALL.get(index).copied()
    }
}

/// Lines of colored text, drawn from the top of a cleared screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Page {
    lines: Vec<Vec<Segment>>,
}

impl Page {
    fn line(&mut self, segments: Vec<Segment>) -> &mut Self {
        self.lines.push(segments);
        self
    }

    fn text(&mut self, text: impl Into<String>, color: Color) -> &mut Self {
        self.line(vec![Segment::new(text, color)])
    }

    fn blank(&mut self) -> &mut Self {
        self.lines.push(Vec::new());
        self
    }

    fn header(&mut self, title: &str) -> &mut Self {
        let _ = self.text(title, Color::White);
        self.text("-".repeat(title.chars().count()), Color::DarkGray)
    }

    fn paragraph(&mut self, text: &str, color: Color) -> &mut Self {
        let mut current = String::new();
        for word in text.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > PAGE_WIDTH {
                let _ = self.text(std::mem::take(&mut current), color);
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            let _ = self.text(current, color);
        }
        self
    }

    /// Appends a line below the page content.
    pub(crate) fn with_line(mut self, segments: Vec<Segment>) -> Self {
        let _ = self.blank().line(segments);
        self
    }

    /// Clears the screen and draws the page.
    pub(crate) fn draw<W: io::Write>(&self, canvas: &mut TerminalCanvas<W>) -> io::Result<()> {
        canvas.clear_screen()?;
        for (row, segments) in (0u32..).zip(&self.lines) {
            canvas.write_line(row, segments)?;
        }
        canvas.flush()
    }

    #[cfg(test)]
    fn plain(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|segments| segments.iter().map(|segment| segment.text.as_str()).collect())
            .collect()
    }
}

/// `mm:ss.ff`, as shown in statistics.
pub(crate) fn stopwatch(elapsed: Duration) -> String {
    let centis = elapsed.as_millis() / 10;
    format!(
        "{:02}:{:02}.{:02}",
        centis / 6_000,
        (centis / 100) % 60,
        centis % 100
    )
}

/// Dollar amount with thousands separators.
pub(crate) fn money(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("${grouped}")
}

pub(crate) fn login(error: Option<&str>, typed: &str) -> Page {
    let mut page = Page::default();
    let _ = page
        .header(GAME_TITLE)
        .blank()
        .text(
            format!(
                "Please choose a username to use in-game [Max length: {} characters]",
                escape_maze_system_progression::MAX_USERNAME_LENGTH
            ),
            Color::Gray,
        )
        .text(
            "(Please make sure to enter your exact username if you wish to log in):",
            Color::Gray,
        )
        .blank();
    if let Some(error) = error {
        let _ = page.text(error, Color::Red);
    }
    let _ = page.line(vec![
        Segment::new("> ", KEY_COLOR),
        Segment::new(typed, Color::White),
    ]);
    page
}

pub(crate) fn main_menu(username: &str, is_new: bool) -> Page {
    let greeting = if is_new { "Hello there" } else { "Welcome back" };
    let mut page = Page::default();
    let _ = page
        .header(GAME_TITLE)
        .blank()
        .text(format!("{greeting}, {username}!"), Color::White)
        .blank();
    for (index, option) in MenuOption::ALL.iter().enumerate() {
        let _ = page.line(vec![
            Segment::new("[", KEY_COLOR),
            Segment::new((index + 1).to_string(), Color::Cyan),
            Segment::new("] ", KEY_COLOR),
            Segment::new(option.label(), Color::Gray),
        ]);
    }
    let _ = page.blank().text(
        format!("Please select an option [1-{}]: ", MenuOption::ALL.len()),
        Color::Gray,
    );
    page
}

pub(crate) fn guide(config: &GameConfig, profile: &Profile) -> Page {
    let mut page = Page::default();
    let _ = page
        .paragraph(
            "Welcome to Escape The Maze, a game where you have to reach the 'Exit point' while \
             dodging 'Walls', optionally collecting 'Bonus points' for a score bonus and also \
             'Coins' which can be spent in the game's upgrade shop.",
            Color::Gray,
        )
        .blank()
        .header("Game entities and their descriptions");
    for kind in EntityKind::ALL {
        let _ = page.line(vec![
            Segment::new(format!("[{}]", kind.glyph()), kind.default_color()),
            Segment::new(format!(" {}", kind.name()), Color::Cyan),
            Segment::new(":", KEY_COLOR),
        ]);
        let _ = page.paragraph(&kind.description(config, profile.rules()), Color::Gray);
        if let Some(rule) = config.spawns.rule(kind) {
            let _ = page.line(vec![
                Segment::new("(Spawn chance: ", KEY_COLOR),
                Segment::new(format!("{}%", rule.chance), Color::Cyan),
                Segment::new(", Max occurrences: ", KEY_COLOR),
                Segment::new(rule.max_occurrences.to_string(), Color::Cyan),
                Segment::new(")", KEY_COLOR),
            ]);
        }
    }
    let _ = page
        .blank()
        .header("Game controls")
        .paragraph(
            "Move with the WASD or Arrow keys. Hold Shift while moving to leap once you own the \
             Boots of Leaping.",
            Color::Gray,
        )
        .blank()
        .text(
            "Press any key to continue, or 'ESC' to return to the main menu...",
            Color::Gray,
        );
    page
}

pub(crate) fn leaderboard(roster: &Roster, current: &str) -> Page {
    let rule = format!(" {}", "-".repeat(69));
    let mut page = Page::default();
    let _ = page
        .header("Leaderboard")
        .blank()
        .text(rule.as_str(), Color::DarkGray)
        .text(
            format!(
                " | {:<26} | {:<9} | {:<9} | {:<12} |",
                "Username", "Top score", "Balance", "Time elapsed"
            ),
            Color::White,
        )
        .text(rule.as_str(), Color::DarkGray);
    for (index, profile) in roster.leaderboard().into_iter().enumerate() {
        let name = if profile.username() == current {
            format!("{} (You)", profile.username())
        } else {
            profile.username().to_owned()
        };
        let color = if index % 2 == 0 { Color::Gray } else { Color::DarkGray };
        let _ = page.text(
            format!(
                " | {:<26} | {:<9} | {:<9} | {:<12} |",
                name,
                profile.top_score(),
                money(profile.balance()),
                stopwatch(profile.best_time())
            ),
            color,
        );
    }
    let _ = page
        .text(rule, Color::DarkGray)
        .blank()
        .text("Press any key to return to the main menu...", Color::Gray);
    page
}

pub(crate) fn shop(profile: &Profile, offers: &[Offer], notice: Option<Vec<Segment>>) -> Page {
    let mut page = Page::default();
    let _ = page
        .paragraph(
            "Welcome to the upgrade shop! You can purchase new upgrades for your character here \
             with the coins you collect in-game.",
            Color::Gray,
        )
        .blank()
        .line(vec![
            Segment::new("Your balance: ", Color::Gray),
            Segment::new(money(profile.balance()), Color::Green),
            Segment::new("/", Color::Gray),
            Segment::new(money(profile.rules().wallet_capacity), Color::Green),
            Segment::new("    Your level: ", KEY_COLOR),
            Segment::new(profile.level().to_string(), Color::Cyan),
        ])
        .blank()
        .header("Available upgrades");
    for (index, offer) in offers.iter().enumerate() {
        let level_color = if profile.level() >= offer.required_level {
            Color::Green
        } else {
            Color::Red
        };
        let price_color = if profile.balance() >= offer.price {
            Color::Green
        } else {
            Color::Red
        };
        let _ = page
            .line(vec![
                Segment::new("[", KEY_COLOR),
                Segment::new((index + 1).to_string(), Color::Cyan),
                Segment::new("] ", KEY_COLOR),
                Segment::new(offer.name.as_str(), Color::White),
                Segment::new(if offer.owned { " [Purchased]" } else { "" }, Color::Magenta),
                Segment::new("    Required level: ", KEY_COLOR),
                Segment::new(offer.required_level.to_string(), level_color),
                Segment::new("    Price: ", KEY_COLOR),
                Segment::new(money(offer.price), price_color),
            ])
            .paragraph(&offer.description, Color::Cyan);
    }
    let _ = page.blank().text(
        format!(
            "Choose an upgrade to purchase [1-{}], or press 'ESC' to return to the main menu: ",
            offers.len()
        ),
        Color::Gray,
    );
    match notice {
        Some(notice) => page.with_line(notice),
        None => page,
    }
}

pub(crate) fn confirm_purchase(offer: &Offer) -> Vec<Segment> {
    vec![
        Segment::new("Are you sure you want to purchase the upgrade \"", Color::Gray),
        Segment::new(offer.name.as_str(), Color::Cyan),
        Segment::new("\" for ", Color::Gray),
        Segment::new(money(offer.price), Color::Green),
        Segment::new("? [Y/N]", Color::Gray),
    ]
}

pub(crate) fn purchased(offer: &Offer) -> Vec<Segment> {
    vec![
        Segment::new("Successfully purchased the upgrade \"", Color::Gray),
        Segment::new(offer.name.as_str(), Color::Cyan),
        Segment::new("\" for ", Color::Gray),
        Segment::new(money(offer.price), Color::Green),
        Segment::new(".", Color::Gray),
    ]
}

pub(crate) fn purchase_failed(error: &PurchaseError) -> Vec<Segment> {
    let message = match error {
        PurchaseError::AlreadyOwned => "This upgrade is already purchased.",
        PurchaseError::InsufficientFunds { .. } => {
            "You don't have sufficient funds to purchase this upgrade."
        }
        PurchaseError::LevelTooLow { .. } => {
            "Your current level does not meet this upgrade's minimum required level."
        }
    };
    vec![Segment::new(message, Color::Red)]
}

pub(crate) fn invalid_option() -> Vec<Segment> {
    vec![Segment::new("Invalid option selected, please try again.", Color::Red)]
}

pub(crate) fn about() -> Page {
    let mut page = Page::default();
    let _ = page
        .header("About")
        .blank()
        .text(
            format!("Escape The Maze {}", env!("CARGO_PKG_VERSION")),
            Color::White,
        )
        .paragraph(
            "Sound effects are played through the terminal bell; run with --mute to silence it.",
            KEY_COLOR,
        )
        .blank()
        .text("Press any key to return to the main menu...", Color::Gray);
    page
}

pub(crate) fn round_summary(summary: &RoundSummary) -> Page {
    let mut page = Page::default();
    if let RoundOutcome::Failed(cause) = summary.outcome {
        let what = match cause {
            FailureCause::OutOfHearts => "hearts",
            FailureCause::OutOfTime => "time",
        };
        let _ = page.text(format!("You ran out of {what}!"), Color::Red).blank();
    }
    let _ = page
        .header(&format!("Round {} statistics", summary.round))
        .text(format!("Hearts: {}", summary.hearts), Color::Gray)
        .text(format!("Score: {}", summary.score), Color::Gray)
        .text(format!("Balance: ${}", summary.balance), Color::Gray)
        .text(
            format!("Time elapsed: {}", stopwatch(summary.elapsed)),
            Color::Gray,
        );
    if matches!(summary.outcome, RoundOutcome::Failed(_)) {
        let _ = page
            .blank()
            .text("Don't worry, you can always do better!", Color::Cyan);
    }
    let _ = page
        .blank()
        .text("Press 'Enter' to continue...", Color::Gray);
    page
}

pub(crate) fn session_summary(report: &SessionReport) -> Page {
    let outcome = &report.outcome;
    let settlement = &report.settlement;
    let marker = if settlement.new_top_score {
        " (New top score!)"
    } else {
        ""
    };
    let mut page = Page::default();
    let _ = page
        .header("Game statistics")
        .text(format!("Total score: {}{marker}", outcome.score), Color::Gray)
        .text(
            format!("Total cash collected: ${}", outcome.balance),
            Color::Gray,
        )
        .text(
            format!("Total time elapsed: {}", stopwatch(outcome.elapsed)),
            Color::Gray,
        )
        .blank();
    if let Some(rating) = settlement.rating {
        let _ = page.text(rating.text(), rating.color());
    }
    if settlement.bonus > 0 {
        let _ = page.line(vec![
            Segment::new("You've received an additional ", Color::Gray),
            Segment::new(format!("${} ", settlement.bonus), Color::Green),
            Segment::new("bonus for your performance, keep it up!", Color::Gray),
        ]);
    }
    let _ = page
        .blank()
        .text("Press 'Enter' to continue to the main menu...", Color::Gray);
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_maze_core::{RoundState, UpgradeTuning};
    use escape_maze_system_progression::{ProfileData, Rating, SessionOutcome, Settlement};

    #[test]
    fn menu_digits_select_numbered_options() {
        assert_eq!(MenuOption::from_digit('1'), Some(MenuOption::Play));
        assert_eq!(MenuOption::from_digit('6'), Some(MenuOption::Exit));
        assert_eq!(MenuOption::from_digit('0'), None);
        assert_eq!(MenuOption::from_digit('7'), None);
        assert_eq!(MenuOption::from_digit('x'), None);

        let menu = main_menu("ada", false).plain();
        assert!(menu.contains(&"[3] Upgrade shop".to_owned()));
        assert!(menu.contains(&"Please select an option [1-6]: ".to_owned()));
    }

    #[test]
    fn stopwatch_formats_minutes_seconds_and_hundredths() {
        assert_eq!(stopwatch(Duration::from_millis(83_456)), "01:23.45");
        assert_eq!(stopwatch(Duration::ZERO), "00:00.00");
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0), "$0");
        assert_eq!(money(750), "$750");
        assert_eq!(money(2_500), "$2,500");
        assert_eq!(money(1_234_567), "$1,234,567");
    }

    #[test]
    fn paragraphs_wrap_at_the_page_width() {
        let mut page = Page::default();
        let _ = page.paragraph(&"word ".repeat(40), Color::Gray);
        let lines = page.plain();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.len() <= PAGE_WIDTH));
    }

    #[test]
    fn failed_round_names_the_cause() {
        let page = round_summary(&RoundSummary {
            round: 3,
            outcome: RoundOutcome::Failed(FailureCause::OutOfTime),
            hearts: 2,
            score: 75,
            balance: 40,
            elapsed: Duration::from_secs(45),
        });
        let lines = page.plain();
        assert_eq!(lines[0], "You ran out of time!");
        assert!(lines.contains(&"Round 3 statistics".to_owned()));
        assert!(lines.contains(&"Time elapsed: 00:45.00".to_owned()));
        assert!(lines.contains(&"Don't worry, you can always do better!".to_owned()));
    }

    #[test]
    fn successful_session_shows_rating_and_bonus() {
        let report = SessionReport {
            rounds: 10,
            outcome: SessionOutcome {
                final_state: RoundState::Successful,
                score: 640,
                balance: 300,
                armor: 0,
                elapsed: Duration::from_secs(300),
            },
            settlement: Settlement {
                bonus: 250,
                credited: 550,
                new_top_score: true,
                rating: Some(Rating::Wonderful),
            },
        };
        let lines = session_summary(&report).plain();
        assert!(lines.contains(&"Total score: 640 (New top score!)".to_owned()));
        assert!(lines.contains(&"Wonderful job!".to_owned()));
        assert!(lines.contains(
            &"You've received an additional $250 bonus for your performance, keep it up!"
                .to_owned()
        ));
    }

    #[test]
    fn leaderboard_marks_the_current_user() {
        let tuning = UpgradeTuning::default();
        let make = |name: &str, top_score: u32| {
            Profile::from_data(
                ProfileData {
                    username: name.to_owned(),
                    level: 1,
                    top_score,
                    armor: 0,
                    balance: 1_200,
                    upgrades: 0,
                    best_time_ms: 61_500,
                },
                &tuning,
            )
            .expect("valid profile")
        };
        let roster = Roster::new(vec![make("ada", 90), make("bob", 300)]);

        let lines = leaderboard(&roster, "ada").plain();
        let bob = lines.iter().position(|line| line.contains("bob")).expect("bob listed");
        let ada = lines.iter().position(|line| line.contains("ada (You)")).expect("ada listed");
        assert!(bob < ada);
        assert!(lines[ada].contains("$1,200"));
        assert!(lines[ada].contains("01:01.50"));
    }
}
