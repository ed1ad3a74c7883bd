use std::time::Duration;

use escape_maze_core::{RoundState, ScoringConfig, Upgrade, UpgradeTuning};
use escape_maze_system_progression::{
    catalog, purchase, settle, Profile, ProfileData, PurchaseError, Rating, Roster,
    SessionOutcome,
};

fn profile(level: u32, balance: u32, upgrades: &[Upgrade]) -> Profile {
    let bits = upgrades.iter().fold(0, |bits, upgrade| bits | upgrade.bit());
    Profile::from_data(
        ProfileData {
            username: "ada".to_owned(),
            level,
            top_score: 300,
            armor: 0,
            balance,
            upgrades: bits,
            best_time_ms: 60_000,
        },
        &UpgradeTuning::default(),
    )
    .expect("valid profile")
}

fn outcome(final_state: RoundState, score: u32, balance: u32) -> SessionOutcome {
    SessionOutcome {
        final_state,
        score,
        balance,
        armor: 1,
        elapsed: Duration::from_secs(200),
    }
}

#[test]
fn catalog_prices_follow_the_player() {
    let offers = catalog(&profile(3, 0, &[Upgrade::NicerWalls]));

    let prices: Vec<(Upgrade, u32, u32)> = offers
        .iter()
        .map(|offer| (offer.upgrade, offer.price, offer.required_level))
        .collect();
    assert_eq!(
        prices,
        vec![
            (Upgrade::LevelUpgrade, 3_000, 1),
            (Upgrade::ExpandedWallet, 2_500, 2),
            (Upgrade::Toughnut, 4_000, 3),
            (Upgrade::QuarterOfVictory, 3_750, 3),
            (Upgrade::NicerWalls, 3_250, 3),
            (Upgrade::BootsOfLeaping, 5_000, 5),
            (Upgrade::ArmorPoints, 750, 2),
        ]
    );
    assert!(offers[4].owned);
    assert_eq!(offers[6].name, "3x Armor Points");
}

#[test]
fn purchase_checks_ownership_then_funds_then_level() {
    let mut owner = profile(5, 10_000, &[Upgrade::Toughnut]);
    assert_eq!(
        purchase(&mut owner, Upgrade::Toughnut),
        Err(PurchaseError::AlreadyOwned)
    );

    let mut poor = profile(5, 100, &[]);
    assert_eq!(
        purchase(&mut poor, Upgrade::Toughnut),
        Err(PurchaseError::InsufficientFunds {
            price: 4_000,
            balance: 100
        })
    );

    let mut novice = profile(1, 5_000, &[]);
    assert_eq!(
        purchase(&mut novice, Upgrade::Toughnut),
        Err(PurchaseError::LevelTooLow {
            required: 3,
            level: 1
        })
    );
    assert_eq!(novice.balance(), 5_000);
}

#[test]
fn purchase_applies_upgrades_immediately() {
    let mut buyer = profile(3, 4_500, &[]);
    let receipt = purchase(&mut buyer, Upgrade::QuarterOfVictory).expect("affordable");

    assert_eq!(receipt.price, 3_750);
    assert_eq!(receipt.balance, 750);
    assert_eq!(buyer.rules().round_duration, 60);
}

#[test]
fn level_upgrade_is_one_shot() {
    let mut buyer = profile(2, 2_500, &[]);
    let receipt = purchase(&mut buyer, Upgrade::LevelUpgrade).expect("affordable");

    assert_eq!(receipt.price, 2_000);
    assert_eq!(buyer.level(), 3);
    assert!(!buyer.upgrades().contains(Upgrade::LevelUpgrade));
    assert_eq!(
        purchase(&mut buyer, Upgrade::LevelUpgrade),
        Err(PurchaseError::InsufficientFunds {
            price: 3_000,
            balance: 500
        })
    );
}

#[test]
fn armor_pack_fills_armor() {
    let mut buyer = profile(2, 1_000, &[]);
    let _ = purchase(&mut buyer, Upgrade::ArmorPoints).expect("affordable");

    assert_eq!(buyer.armor(), 3);
    assert!(buyer.upgrades().contains(Upgrade::ArmorPoints));
    assert_eq!(buyer.balance(), 250);
}

#[test]
fn unknown_login_creates_a_level_one_profile() {
    let tuning = UpgradeTuning::default();
    let mut roster = Roster::new(vec![
        Profile::new("zed", &tuning).expect("valid"),
        Profile::new("amy", &tuning).expect("valid"),
    ]);

    let login = roster.select_or_create("  max  ", &tuning).expect("valid");
    assert!(login.is_new);
    assert_eq!(login.username, "max");

    let again = roster.select_or_create("max", &tuning).expect("valid");
    assert!(!again.is_new);

    let names: Vec<&str> = roster.profiles().iter().map(Profile::username).collect();
    assert_eq!(names, vec!["amy", "max", "zed"]);
    assert_eq!(roster.get("max").map(Profile::level), Some(1));
}

#[test]
fn leaderboard_ranks_by_top_score() {
    let tuning = UpgradeTuning::default();
    let make = |name: &str, top_score: u32| {
        Profile::from_data(
            ProfileData {
                username: name.to_owned(),
                level: 1,
                top_score,
                armor: 0,
                balance: 0,
                upgrades: 0,
                best_time_ms: u64::from(top_score) * 10,
            },
            &tuning,
        )
        .expect("valid")
    };
    let roster = Roster::new(vec![make("bob", 120), make("cat", 480), make("abe", 120), make("dan", 0)]);

    let ranked: Vec<&str> = roster.leaderboard().into_iter().map(Profile::username).collect();
    assert_eq!(ranked, vec!["cat", "abe", "bob", "dan"]);

    let exported: Vec<&str> = roster.exportable().map(Profile::username).collect();
    assert_eq!(exported, vec!["abe", "bob", "cat"]);
}

#[test]
fn successful_session_is_credited_up_to_the_wallet() {
    let mut player = profile(1, 2_300, &[]);
    let settlement = settle(
        &mut player,
        &outcome(RoundState::Successful, 650, 400),
        &ScoringConfig::default(),
    );

    assert_eq!(settlement.bonus, 250);
    assert_eq!(settlement.credited, 200);
    assert!(settlement.new_top_score);
    assert_eq!(settlement.rating, Some(Rating::Wonderful));
    assert_eq!(player.balance(), 2_500);
    assert_eq!(player.top_score(), 650);
    assert_eq!(player.best_time(), Duration::from_secs(200));
    assert_eq!(player.armor(), 1);
}

#[test]
fn successful_session_clamps_an_overfull_wallet() {
    let mut player = profile(1, 3_000, &[]);
    let settlement = settle(
        &mut player,
        &outcome(RoundState::Successful, 100, 40),
        &ScoringConfig::default(),
    );

    assert_eq!(settlement.credited, 0);
    assert_eq!(player.balance(), 2_500);
}

#[test]
fn failed_session_only_keeps_armor() {
    let mut player = profile(1, 100, &[]);
    let settlement = settle(
        &mut player,
        &outcome(RoundState::Failure, 900, 400),
        &ScoringConfig::default(),
    );

    assert_eq!(settlement.bonus, 0);
    assert_eq!(settlement.credited, 0);
    assert!(settlement.new_top_score);
    assert_eq!(settlement.rating, None);
    assert_eq!(player.balance(), 100);
    assert_eq!(player.top_score(), 300);
    assert_eq!(player.armor(), 1);
}
