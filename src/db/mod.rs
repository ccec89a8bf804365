//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const FOOTPRINTS: &str = "footprints";
    pub const MONTHLY_FOOTPRINTS: &str = "monthly_footprints";
    pub const EMISSION_FACTORS: &str = "emission_factors";
    pub const CHALLENGES: &str = "challenges";
    pub const CHALLENGE_COMPLETIONS: &str = "challenge_completions";
    pub const CHATS: &str = "chats";
    pub const MESSAGES: &str = "messages";
    /// Sequence counters (keyed by sequence name)
    pub const COUNTERS: &str = "counters";
}
