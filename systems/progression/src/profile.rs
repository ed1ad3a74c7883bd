use std::time::Duration;

use escape_maze_core::{RuleParameters, Upgrade, UpgradeSet, UpgradeTuning};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest username accepted at login.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Raised when a profile cannot be created or restored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The username is blank once whitespace is collapsed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The username exceeds [`MAX_USERNAME_LENGTH`] characters.
    #[error("username is {length} characters long, the limit is {}", MAX_USERNAME_LENGTH)]
    UsernameTooLong {
        /// Length of the rejected name in characters.
        length: usize,
    },
    /// Levels start at one.
    #[error("level {level} is invalid, levels start at 1")]
    InvalidLevel {
        /// Rejected level.
        level: u32,
    },
}

/// Collapses runs of whitespace and validates the resulting username.
pub fn normalize_username(raw: &str) -> Result<String, ProfileError> {
    let username = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if username.is_empty() {
        return Err(ProfileError::EmptyUsername);
    }
    let length = username.chars().count();
    if length > MAX_USERNAME_LENGTH {
        return Err(ProfileError::UsernameTooLong { length });
    }
    Ok(username)
}

/// Plain persisted form of a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    /// Unique player name.
    pub username: String,
    /// Player level, starting at one.
    pub level: u32,
    /// Best session score.
    pub top_score: u32,
    /// Armor points carried into the next session.
    pub armor: u32,
    /// Cash available in the shop.
    pub balance: u32,
    /// Raw upgrade bits.
    pub upgrades: u32,
    /// Session time of the best score, in milliseconds.
    pub best_time_ms: u64,
}

/// A player's persistent identity and progression.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    username: String,
    level: u32,
    top_score: u32,
    armor: u32,
    balance: u32,
    upgrades: UpgradeSet,
    best_time: Duration,
    tuning: UpgradeTuning,
    rules: RuleParameters,
}

impl Profile {
    /// Creates a level one profile without progress.
    pub fn new(username: &str, tuning: &UpgradeTuning) -> Result<Self, ProfileError> {
        let data = ProfileData {
            username: username.to_owned(),
            level: 1,
            top_score: 0,
            armor: 0,
            balance: 0,
            upgrades: 0,
            best_time_ms: 0,
        };
        Self::from_data(data, tuning)
    }

    /// Restores a profile from its persisted form.
    pub fn from_data(data: ProfileData, tuning: &UpgradeTuning) -> Result<Self, ProfileError> {
        let username = normalize_username(&data.username)?;
        if data.level == 0 {
            return Err(ProfileError::InvalidLevel { level: data.level });
        }
        let upgrades = UpgradeSet::from_bits(data.upgrades);
        Ok(Self {
            username,
            level: data.level,
            top_score: data.top_score,
            armor: data.armor,
            balance: data.balance,
            upgrades,
            best_time: Duration::from_millis(data.best_time_ms),
            tuning: tuning.clone(),
            rules: RuleParameters::resolve(upgrades, tuning),
        })
    }

    /// Persisted form of the profile.
    #[must_use]
    pub fn to_data(&self) -> ProfileData {
        ProfileData {
            username: self.username.clone(),
            level: self.level,
            top_score: self.top_score,
            armor: self.armor,
            balance: self.balance,
            upgrades: self.upgrades.bits(),
            best_time_ms: u64::try_from(self.best_time.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Unique player name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Player level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Best session score.
    #[must_use]
    pub const fn top_score(&self) -> u32 {
        self.top_score
    }

    /// Armor points carried into the next session.
    #[must_use]
    pub const fn armor(&self) -> u32 {
        self.armor
    }

    /// Cash available in the shop.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Owned upgrades.
    #[must_use]
    pub const fn upgrades(&self) -> UpgradeSet {
        self.upgrades
    }

    /// Session time of the best score.
    #[must_use]
    pub const fn best_time(&self) -> Duration {
        self.best_time
    }

    /// Tuning the rule parameters are resolved against.
    #[must_use]
    pub const fn tuning(&self) -> &UpgradeTuning {
        &self.tuning
    }

    /// Gameplay parameters derived from the owned upgrades.
    #[must_use]
    pub const fn rules(&self) -> &RuleParameters {
        &self.rules
    }

    /// Whether the player has ever finished a successful session.
    #[must_use]
    pub fn has_ever_played(&self) -> bool {
        !self.best_time.is_zero()
    }

    /// Adds an upgrade and re-resolves the rule parameters.
    pub fn add_upgrade(&mut self, upgrade: Upgrade) -> bool {
        let added = self.upgrades.insert(upgrade);
        self.rules = RuleParameters::resolve(self.upgrades, &self.tuning);
        added
    }

    /// Removes an upgrade and re-resolves the rule parameters.
    pub fn remove_upgrade(&mut self, upgrade: Upgrade) -> bool {
        let removed = self.upgrades.remove(upgrade);
        self.rules = RuleParameters::resolve(self.upgrades, &self.tuning);
        removed
    }

    pub(crate) fn set_armor(&mut self, armor: u32) {
        self.armor = armor;
    }

    pub(crate) fn set_balance(&mut self, balance: u32) {
        self.balance = balance;
    }

    pub(crate) fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
    }

    pub(crate) fn record_top_score(&mut self, score: u32, time: Duration) {
        self.top_score = score;
        self.best_time = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_collapsed_and_bounded() {
        assert_eq!(normalize_username("  neo   the one "), Ok("neo the one".to_owned()));
        assert_eq!(normalize_username(" \t "), Err(ProfileError::EmptyUsername));
        assert_eq!(
            normalize_username("abcdefghijklmnopqrstu"),
            Err(ProfileError::UsernameTooLong { length: 21 })
        );
    }

    #[test]
    fn restored_profiles_require_a_level() {
        let data = ProfileData {
            username: "trinity".to_owned(),
            level: 0,
            top_score: 10,
            armor: 0,
            balance: 0,
            upgrades: 0,
            best_time_ms: 0,
        };
        assert_eq!(
            Profile::from_data(data, &UpgradeTuning::default()),
            Err(ProfileError::InvalidLevel { level: 0 })
        );
    }

    #[test]
    fn upgrade_mutations_refresh_the_rules() {
        let mut profile = Profile::new("morpheus", &UpgradeTuning::default()).expect("valid name");
        assert_eq!(profile.rules().max_hearts, 3);

        assert!(profile.add_upgrade(Upgrade::Toughnut));
        assert_eq!(profile.rules().max_hearts, 5);

        assert!(profile.remove_upgrade(Upgrade::Toughnut));
        assert!(!profile.remove_upgrade(Upgrade::Toughnut));
        assert_eq!(profile.rules().max_hearts, 3);
    }

    #[test]
    fn data_round_trip_keeps_progress() {
        let data = ProfileData {
            username: "switch".to_owned(),
            level: 4,
            top_score: 420,
            armor: 2,
            balance: 1_200,
            upgrades: Upgrade::NicerWalls.bit() | Upgrade::ArmorPoints.bit(),
            best_time_ms: 95_500,
        };
        let profile = Profile::from_data(data.clone(), &UpgradeTuning::default()).expect("valid");

        assert_eq!(profile.rules().wall_penalty, 10);
        assert!(profile.has_ever_played());
        assert_eq!(profile.to_data(), data);
    }
}
