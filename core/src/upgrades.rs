use serde::{Deserialize, Serialize};

/// Purchasable modifiers that persist on a user profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Upgrade {
    /// One-shot purchase that raises the user's level.
    LevelUpgrade,
    /// Raises the wallet capacity.
    ExpandedWallet,
    /// Raises the heart capacity.
    Toughnut,
    /// Lengthens every round.
    QuarterOfVictory,
    /// Softens wall collisions.
    NicerWalls,
    /// Enables jumping with the modifier key.
    BootsOfLeaping,
    /// Armor pack that absorbs wall hits until depleted.
    ArmorPoints,
}

impl Upgrade {
    /// Every upgrade in catalog order.
    pub const ALL: [Upgrade; 7] = [
        Upgrade::LevelUpgrade,
        Upgrade::ExpandedWallet,
        Upgrade::Toughnut,
        Upgrade::QuarterOfVictory,
        Upgrade::NicerWalls,
        Upgrade::BootsOfLeaping,
        Upgrade::ArmorPoints,
    ];

    /// Bit occupied by the upgrade inside an [`UpgradeSet`].
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Display name of the upgrade.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Upgrade::LevelUpgrade => "Level Upgrade",
            Upgrade::ExpandedWallet => "Expanded Wallet",
            Upgrade::Toughnut => "Toughnut",
            Upgrade::QuarterOfVictory => "The Quarter of Victory",
            Upgrade::NicerWalls => "Nicer Walls",
            Upgrade::BootsOfLeaping => "The Boots of Leaping",
            Upgrade::ArmorPoints => "Armor Points",
        }
    }
}

/// Bitset of upgrades owned by a user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeSet(u32);

impl UpgradeSet {
    const MASK: u32 = (1 << Upgrade::ALL.len()) - 1;

    /// Set without any upgrade.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Restores a set from persisted bits, discarding unknown flags.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::MASK)
    }

    /// Raw bits suitable for persistence.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Reports whether the upgrade is owned.
    #[must_use]
    pub const fn contains(&self, upgrade: Upgrade) -> bool {
        self.0 & upgrade.bit() != 0
    }

    /// Adds the upgrade, returning `true` when it was not owned before.
    pub fn insert(&mut self, upgrade: Upgrade) -> bool {
        let added = !self.contains(upgrade);
        self.0 |= upgrade.bit();
        added
    }

    /// Drops the upgrade, returning `true` when it was owned before.
    pub fn remove(&mut self, upgrade: Upgrade) -> bool {
        let removed = self.contains(upgrade);
        self.0 &= !upgrade.bit();
        removed
    }

    /// Owned upgrades in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = Upgrade> + '_ {
        Upgrade::ALL
            .into_iter()
            .filter(move |upgrade| self.contains(*upgrade))
    }
}

impl FromIterator<Upgrade> for UpgradeSet {
    fn from_iter<I: IntoIterator<Item = Upgrade>>(iter: I) -> Self {
        let mut set = UpgradeSet::empty();
        for upgrade in iter {
            let _ = set.insert(upgrade);
        }
        set
    }
}

/// Values applied by each upgrade when owned and when not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTuning {
    /// Wallet capacity without Expanded Wallet.
    pub wallet_capacity: u32,
    /// Wallet capacity with Expanded Wallet.
    pub expanded_wallet_capacity: u32,
    /// Heart capacity without Toughnut.
    pub max_hearts: u32,
    /// Heart capacity with Toughnut.
    pub toughnut_max_hearts: u32,
    /// Round duration in seconds without Quarter of Victory.
    pub round_duration: u32,
    /// Round duration in seconds with Quarter of Victory.
    pub extended_round_duration: u32,
    /// Score deducted by a wall hit; halved by Nicer Walls.
    pub wall_penalty: u32,
    /// Percentage chance of a wall hit being penalised.
    pub wall_collision_chance: f64,
    /// Percentage chance with Nicer Walls.
    pub nicer_walls_collision_chance: f64,
    /// Cells travelled by a jump with Boots of Leaping.
    pub jump_distance: u32,
    /// Armor granted by an Armor Points purchase.
    pub armor_pack: u32,
}

impl Default for UpgradeTuning {
    fn default() -> Self {
        Self {
            wallet_capacity: 2500,
            expanded_wallet_capacity: 5000,
            max_hearts: 3,
            toughnut_max_hearts: 5,
            round_duration: 45,
            extended_round_duration: 60,
            wall_penalty: 20,
            wall_collision_chance: 100.0,
            nicer_walls_collision_chance: 70.0,
            jump_distance: 2,
            armor_pack: 3,
        }
    }
}

/// Gameplay parameters derived from an [`UpgradeSet`].
#[derive(Clone, Debug, PartialEq)]
pub struct RuleParameters {
    /// Largest balance a user may hold.
    pub wallet_capacity: u32,
    /// Hearts at the start of a session and the cap for restoration.
    pub max_hearts: u32,
    /// Seconds available per round.
    pub round_duration: u32,
    /// Score deducted by a penalised wall hit.
    pub wall_penalty: u32,
    /// Percentage chance that a wall hit is penalised.
    pub wall_collision_chance: f64,
    /// Whether the jump modifier is honoured.
    pub jump_enabled: bool,
    /// Cells travelled by a jump; 1 without the upgrade.
    pub jump_distance: u32,
}

impl RuleParameters {
    /// Resolves the parameters for the provided upgrade set.
    #[must_use]
    pub fn resolve(upgrades: UpgradeSet, tuning: &UpgradeTuning) -> Self {
        let pick = |upgrade: Upgrade, owned: u32, base: u32| {
            if upgrades.contains(upgrade) {
                owned
            } else {
                base
            }
        };
        let nicer_walls = upgrades.contains(Upgrade::NicerWalls);
        let jump_enabled = upgrades.contains(Upgrade::BootsOfLeaping);

        Self {
            wallet_capacity: pick(
                Upgrade::ExpandedWallet,
                tuning.expanded_wallet_capacity,
                tuning.wallet_capacity,
            ),
            max_hearts: pick(
                Upgrade::Toughnut,
                tuning.toughnut_max_hearts,
                tuning.max_hearts,
            ),
            round_duration: pick(
                Upgrade::QuarterOfVictory,
                tuning.extended_round_duration,
                tuning.round_duration,
            ),
            wall_penalty: if nicer_walls {
                tuning.wall_penalty / 2
            } else {
                tuning.wall_penalty
            },
            wall_collision_chance: if nicer_walls {
                tuning.nicer_walls_collision_chance
            } else {
                tuning.wall_collision_chance
            },
            jump_enabled,
            jump_distance: if jump_enabled { tuning.jump_distance } else { 1 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_follow_catalog_order() {
        assert_eq!(Upgrade::LevelUpgrade.bit(), 1);
        assert_eq!(Upgrade::ExpandedWallet.bit(), 2);
        assert_eq!(Upgrade::ArmorPoints.bit(), 64);
    }

    #[test]
    fn unknown_bits_are_discarded() {
        let set = UpgradeSet::from_bits(0b1100_0001);
        assert_eq!(set.bits(), 0b0100_0001);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Upgrade::LevelUpgrade, Upgrade::ArmorPoints]
        );
    }

    #[test]
    fn resolver_defaults_without_upgrades() {
        let rules = RuleParameters::resolve(UpgradeSet::empty(), &UpgradeTuning::default());
        assert_eq!(rules.wallet_capacity, 2500);
        assert_eq!(rules.max_hearts, 3);
        assert_eq!(rules.round_duration, 45);
        assert_eq!(rules.wall_penalty, 20);
        assert_eq!(rules.wall_collision_chance, 100.0);
        assert!(!rules.jump_enabled);
        assert_eq!(rules.jump_distance, 1);
    }

    #[test]
    fn resolver_applies_every_upgrade() {
        let set: UpgradeSet = Upgrade::ALL.into_iter().collect();
        let rules = RuleParameters::resolve(set, &UpgradeTuning::default());
        assert_eq!(rules.wallet_capacity, 5000);
        assert_eq!(rules.max_hearts, 5);
        assert_eq!(rules.round_duration, 60);
        assert_eq!(rules.wall_penalty, 10);
        assert_eq!(rules.wall_collision_chance, 70.0);
        assert!(rules.jump_enabled);
        assert_eq!(rules.jump_distance, 2);
    }
}
