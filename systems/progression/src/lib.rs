#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistent player progression: profiles, the upgrade shop, the roster of
//! known players and the settlement applied when a session ends.
//!
//! Rule parameters are resolved inside every mutator that touches a
//! profile's upgrade set, so [`Profile::rules`] can never be stale.

mod profile;
mod roster;
mod settlement;
mod shop;

pub use profile::{normalize_username, Profile, ProfileData, ProfileError, MAX_USERNAME_LENGTH};
pub use roster::{Login, Roster};
pub use settlement::{settle, Rating, SessionOutcome, Settlement};
pub use shop::{catalog, offer, purchase, Offer, PurchaseError, Receipt};
