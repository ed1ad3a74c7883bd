use std::time::Duration;

use escape_maze_core::{Color, RoundState, ScoringConfig};

use crate::Profile;

/// Rating shown at the end of a successful session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rating {
    /// Score of at least 600.
    Wonderful,
    /// Score of at least 500.
    Awesome,
    /// Score of at least 400.
    Great,
    /// Score of at least 250.
    Good,
    /// Any other score.
    WellDone,
}

impl Rating {
    /// Rating earned by a session score.
    #[must_use]
    pub const fn for_score(score: u32) -> Self {
        match score {
            600.. => Rating::Wonderful,
            500..=599 => Rating::Awesome,
            400..=499 => Rating::Great,
            250..=399 => Rating::Good,
            _ => Rating::WellDone,
        }
    }

    /// Text shown to the player.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Rating::Wonderful => "Wonderful job!",
            Rating::Awesome => "Awesome work!",
            Rating::Great => "Great job!",
            Rating::Good => "Good job!",
            Rating::WellDone => "Well done!",
        }
    }

    /// Color the text is shown in.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Rating::Wonderful => Color::Red,
            Rating::Awesome => Color::Magenta,
            Rating::Great => Color::Cyan,
            Rating::Good => Color::Yellow,
            Rating::WellDone => Color::White,
        }
    }
}

/// Totals of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    /// State of the last round played.
    pub final_state: RoundState,
    /// Score accumulated over the session.
    pub score: u32,
    /// Cash collected over the session.
    pub balance: u32,
    /// Armor left at the end of the session.
    pub armor: u32,
    /// Time the round clock ran during the session.
    pub elapsed: Duration,
}

/// Changes applied to a profile when a session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Extra cash awarded for a high score.
    pub bonus: u32,
    /// Cash actually added to the wallet after the capacity cap.
    pub credited: u32,
    /// Whether the session score beats the previous top score.
    pub new_top_score: bool,
    /// Rating of a successful session.
    pub rating: Option<Rating>,
}

/// Applies the end-of-session rules to `profile`.
///
/// Armor is always persisted. Cash, the top score and the best time are only
/// recorded when the last round was successful.
pub fn settle(profile: &mut Profile, outcome: &SessionOutcome, scoring: &ScoringConfig) -> Settlement {
    let new_top_score = outcome.score > profile.top_score();
    profile.set_armor(outcome.armor);

    if outcome.final_state != RoundState::Successful {
        return Settlement {
            bonus: 0,
            credited: 0,
            new_top_score,
            rating: None,
        };
    }

    let bonus = if outcome.score >= scoring.session_bonus_threshold {
        scoring.session_bonus_cash
    } else {
        0
    };
    let before = profile.balance();
    let capacity = profile.rules().wallet_capacity;
    let after = before
        .saturating_add(outcome.balance)
        .saturating_add(bonus)
        .min(capacity);
    profile.set_balance(after);
    if new_top_score {
        profile.record_top_score(outcome.score, outcome.elapsed);
    }

    Settlement {
        bonus,
        credited: after.saturating_sub(before),
        new_top_score,
        rating: Some(Rating::for_score(outcome.score)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_follow_thresholds() {
        assert_eq!(Rating::for_score(600), Rating::Wonderful);
        assert_eq!(Rating::for_score(599), Rating::Awesome);
        assert_eq!(Rating::for_score(400), Rating::Great);
        assert_eq!(Rating::for_score(250), Rating::Good);
        assert_eq!(Rating::for_score(249), Rating::WellDone);
        assert_eq!(Rating::for_score(0).text(), "Well done!");
    }
}
