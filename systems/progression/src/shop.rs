use escape_maze_core::Upgrade;
use thiserror::Error;

use crate::Profile;

const CASH_PER_LEVEL: u32 = 1_000;
const CASH_PER_ARMOR_POINT: u32 = 250;

/// Reasons a purchase is refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    /// The upgrade is already owned.
    #[error("this upgrade is already purchased")]
    AlreadyOwned,
    /// The balance does not cover the price.
    #[error("insufficient funds: the upgrade costs ${price} but only ${balance} is available")]
    InsufficientFunds {
        /// Price of the upgrade.
        price: u32,
        /// Balance at the time of purchase.
        balance: u32,
    },
    /// The player's level is below the requirement.
    #[error("level {required} is required, current level is {level}")]
    LevelTooLow {
        /// Minimum level.
        required: u32,
        /// Player level.
        level: u32,
    },
}

/// An upgrade as presented in the shop to a particular player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offer {
    /// Upgrade on sale.
    pub upgrade: Upgrade,
    /// Display name.
    pub name: String,
    /// Effect of the upgrade.
    pub description: String,
    /// Price for this player.
    pub price: u32,
    /// Minimum level required to buy.
    pub required_level: u32,
    /// Whether the player already owns it.
    pub owned: bool,
}

/// Confirmation of a completed purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Purchased upgrade.
    pub upgrade: Upgrade,
    /// Amount charged.
    pub price: u32,
    /// Balance left after the purchase.
    pub balance: u32,
}

/// Builds the shop entry for `upgrade` as seen by `profile`.
#[must_use]
pub fn offer(profile: &Profile, upgrade: Upgrade) -> Offer {
    let tuning = profile.tuning();
    let (name, description, price, required_level) = match upgrade {
        Upgrade::LevelUpgrade => (
            upgrade.name().to_owned(),
            format!(
                "Levels up your character to level {}.",
                profile.level().saturating_add(1)
            ),
            profile.level().saturating_mul(CASH_PER_LEVEL),
            1,
        ),
        Upgrade::ExpandedWallet => (
            upgrade.name().to_owned(),
            format!(
                "Expands your maximum wallet capacity to ${}.",
                tuning.expanded_wallet_capacity
            ),
            tuning.wallet_capacity,
            2,
        ),
        Upgrade::Toughnut => (
            upgrade.name().to_owned(),
            format!(
                "Increases your maximum heart capacity to {}.",
                tuning.toughnut_max_hearts
            ),
            4_000,
            3,
        ),
        Upgrade::QuarterOfVictory => (
            upgrade.name().to_owned(),
            format!(
                "Increases the round time limit to {} seconds.",
                tuning.extended_round_duration
            ),
            3_750,
            3,
        ),
        Upgrade::NicerWalls => (
            upgrade.name().to_owned(),
            format!(
                "Reduces the wall collision chance to {}% and halves the score penalty \
                 (it won't prevent respawning though).",
                tuning.nicer_walls_collision_chance
            ),
            3_250,
            3,
        ),
        Upgrade::BootsOfLeaping => (
            upgrade.name().to_owned(),
            format!(
                "Hold Shift along with a navigation key to move {} cells at once and leap over walls.",
                tuning.jump_distance
            ),
            tuning.expanded_wallet_capacity,
            5,
        ),
        Upgrade::ArmorPoints => (
            format!("{}x {}", tuning.armor_pack, upgrade.name()),
            format!(
                "Absorbs the damage of up to {} penalised wall collisions instead of your hearts. \
                 Can be bought again once depleted.",
                tuning.armor_pack
            ),
            tuning.armor_pack.saturating_mul(CASH_PER_ARMOR_POINT),
            2,
        ),
    };
    Offer {
        upgrade,
        name,
        description,
        price,
        required_level,
        owned: profile.upgrades().contains(upgrade),
    }
}

/// Every upgrade on sale, in catalog order.
#[must_use]
pub fn catalog(profile: &Profile) -> Vec<Offer> {
    Upgrade::ALL
        .into_iter()
        .map(|upgrade| offer(profile, upgrade))
        .collect()
}

/// Buys `upgrade` for the player, applying one-shot effects immediately.
pub fn purchase(profile: &mut Profile, upgrade: Upgrade) -> Result<Receipt, PurchaseError> {
    let offer = offer(profile, upgrade);
    if offer.owned {
        return Err(PurchaseError::AlreadyOwned);
    }
    if profile.balance() < offer.price {
        return Err(PurchaseError::InsufficientFunds {
            price: offer.price,
            balance: profile.balance(),
        });
    }
    if profile.level() < offer.required_level {
        return Err(PurchaseError::LevelTooLow {
            required: offer.required_level,
            level: profile.level(),
        });
    }

    let _ = profile.add_upgrade(upgrade);
    profile.set_balance(profile.balance() - offer.price);
    match upgrade {
        Upgrade::ArmorPoints => {
            let armor = profile.tuning().armor_pack;
            profile.set_armor(armor);
        }
        Upgrade::LevelUpgrade => {
            let _ = profile.remove_upgrade(Upgrade::LevelUpgrade);
            profile.level_up();
        }
        Upgrade::ExpandedWallet
        | Upgrade::Toughnut
        | Upgrade::QuarterOfVictory
        | Upgrade::NicerWalls
        | Upgrade::BootsOfLeaping => {}
    }

    Ok(Receipt {
        upgrade,
        price: offer.price,
        balance: profile.balance(),
    })
}
