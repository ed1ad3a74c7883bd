use escape_maze_core::UpgradeTuning;

use crate::{normalize_username, Profile, ProfileError};

/// Result of logging in with a username.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Login {
    /// Normalised username of the selected profile.
    pub username: String,
    /// Whether the profile was created by this login.
    pub is_new: bool,
}

/// Every known profile, kept sorted by username.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roster {
    profiles: Vec<Profile>,
}

impl Roster {
    /// Builds a roster, keeping the first profile of any duplicated username.
    #[must_use]
    pub fn new(mut profiles: Vec<Profile>) -> Self {
        profiles.sort_by(|a, b| a.username().cmp(b.username()));
        profiles.dedup_by(|later, earlier| later.username() == earlier.username());
        Self { profiles }
    }

    /// Profiles sorted by username.
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Number of known profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profile is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profile registered under `username`.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<&Profile> {
        self.index_of(username).and_then(|index| self.profiles.get(index))
    }

    /// Mutable profile registered under `username`.
    pub fn get_mut(&mut self, username: &str) -> Option<&mut Profile> {
        self.index_of(username)
            .and_then(move |index| self.profiles.get_mut(index))
    }

    /// Selects the profile named `raw_username`, creating a level one profile
    /// when the name is unknown.
    pub fn select_or_create(
        &mut self,
        raw_username: &str,
        tuning: &UpgradeTuning,
    ) -> Result<Login, ProfileError> {
        let username = normalize_username(raw_username)?;
        if self.index_of(&username).is_some() {
            return Ok(Login {
                username,
                is_new: false,
            });
        }

        let profile = Profile::new(&username, tuning)?;
        let slot = self
            .profiles
            .partition_point(|existing| existing.username() < username.as_str());
        self.profiles.insert(slot, profile);
        Ok(Login {
            username,
            is_new: true,
        })
    }

    /// Profiles ordered by top score, best first, ties broken by username.
    #[must_use]
    pub fn leaderboard(&self) -> Vec<&Profile> {
        let mut ranked: Vec<&Profile> = self.profiles.iter().collect();
        ranked.sort_by(|a, b| {
            b.top_score()
                .cmp(&a.top_score())
                .then_with(|| a.username().cmp(b.username()))
        });
        ranked
    }

    /// Profiles worth persisting: those who have ever played.
    pub fn exportable(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter().filter(|profile| profile.has_ever_played())
    }

    fn index_of(&self, username: &str) -> Option<usize> {
        self.profiles
            .binary_search_by(|profile| profile.username().cmp(username))
            .ok()
    }
}
