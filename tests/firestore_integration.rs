// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with: ./scripts/test-with-emulator.sh
//!
//! The emulator provides a clean state for each test run.

use ecotrack::error::AppError;
use ecotrack::models::{
    ChallengeCompletion, Chat, CompletionStatus, Message, MonthlySnapshot, MonthlyTotal,
    RegionFactors, User,
};
use ecotrack::models::emission_factor::StateFactor;

mod common;
use common::test_db;

/// Generate a unique ID for test isolation.
fn unique_id() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

/// Helper to create a basic test user
fn test_user(user_id: u64) -> User {
    User {
        user_id,
        username: format!("user{}", user_id),
        email: format!("user{}@example.com", user_id),
        password_hash: "pbkdf2$100000$c2FsdA$aGFzaA".to_string(),
        mobile_number: None,
        profile_image: None,
        date_of_birth: None,
        address: None,
        carbon_profile: None,
        footprint_history: Vec::new(),
        total_points: 0,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn test_snapshot(user_id: u64, month: &str) -> MonthlySnapshot {
    MonthlySnapshot {
        user_id,
        user_name: format!("user{}", user_id),
        month: month.to_string(),
        start_date: "01/03/2026".to_string(),
        end_date: "01/04/2026".to_string(),
        electricity_usage: 120.0,
        vehicle_usage: Vec::new(),
        flight_usage: Vec::new(),
        total_co2_emissions: 98.4,
        country: "India".to_string(),
        state: "Kerala".to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_new_user_creation() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id();

    let before = db.get_user(user_id).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    db.upsert_user(&test_user(user_id)).await.unwrap();

    let after = db.get_user(user_id).await.unwrap();
    assert!(after.is_some(), "User should exist after creation");

    let fetched = after.unwrap();
    assert_eq!(fetched.user_id, user_id);
    assert_eq!(fetched.username, format!("user{}", user_id));
    assert_eq!(fetched.total_points, 0);

    println!("✓ New user created and verified: user_id={}", user_id);
}

#[tokio::test]
async fn test_find_user_by_username_and_email() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id();
    let user = test_user(user_id);
    db.upsert_user(&user).await.unwrap();

    let by_name = db.find_user_by_username(&user.username).await.unwrap();
    assert_eq!(by_name.map(|u| u.user_id), Some(user_id));

    let by_email = db.find_user_by_email(&user.email).await.unwrap();
    assert_eq!(by_email.map(|u| u.user_id), Some(user_id));

    let missing = db
        .find_user_by_username("no-such-user-ever")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_sequence_counter_is_monotonic() {
    require_emulator!();

    let db = test_db().await;
    let counter = format!("test_counter_{}", unique_id());

    let first = db.next_sequence(&counter).await.unwrap();
    let second = db.next_sequence(&counter).await.unwrap();
    let third = db.next_sequence(&counter).await.unwrap();

    assert_eq!(second, first + 1);
    assert_eq!(third, second + 1);
}

#[tokio::test]
async fn test_concurrent_sequence_allocations_are_distinct() {
    require_emulator!();

    let db = test_db().await;
    let counter = format!("test_counter_{}", unique_id());

    let (a, b, c) = tokio::join!(
        db.next_sequence(&counter),
        db.next_sequence(&counter),
        db.next_sequence(&counter),
    );

    let mut values = vec![a.unwrap(), b.unwrap(), c.unwrap()];
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len(), 3, "Concurrent allocations must not repeat");
}

// ═══════════════════════════════════════════════════════════════════════════
// MONTHLY SNAPSHOT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_monthly_snapshot_unique_per_user_month() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id();
    let snapshot = test_snapshot(user_id, "03/2026");

    db.create_monthly_snapshot(&snapshot).await.unwrap();

    // Same user and month again fails at the storage layer
    let duplicate = db.create_monthly_snapshot(&snapshot).await;
    assert!(
        matches!(duplicate, Err(AppError::DuplicateMonthlySnapshot(_))),
        "Second snapshot for the same month should be rejected"
    );

    // A different month is fine
    db.create_monthly_snapshot(&test_snapshot(user_id, "04/2026"))
        .await
        .unwrap();

    let fetched = db.get_monthly_snapshot(user_id, "03/2026").await.unwrap();
    assert_eq!(fetched.map(|s| s.total_co2_emissions), Some(98.4));

    // Deleting frees the (user, month) slot for a fresh snapshot
    db.delete_monthly_snapshot(user_id, "03/2026").await.unwrap();
    assert!(db
        .get_monthly_snapshot(user_id, "03/2026")
        .await
        .unwrap()
        .is_none());
    db.create_monthly_snapshot(&snapshot).await.unwrap();
}

#[tokio::test]
async fn test_latest_monthly_snapshot() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id();

    assert!(db.latest_monthly_snapshot(user_id).await.unwrap().is_none());

    let mut older = test_snapshot(user_id, "01/2026");
    older.created_at = "2026-01-05T00:00:00Z".to_string();
    db.create_monthly_snapshot(&older).await.unwrap();

    let mut newer = test_snapshot(user_id, "02/2026");
    newer.created_at = "2026-02-05T00:00:00Z".to_string();
    db.create_monthly_snapshot(&newer).await.unwrap();

    let latest = db.latest_monthly_snapshot(user_id).await.unwrap().unwrap();
    assert_eq!(latest.month, "02/2026");
}

// ═══════════════════════════════════════════════════════════════════════════
// EMISSION FACTOR TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_region_factor_lookup() {
    require_emulator!();

    let db = test_db().await;
    let country = format!("Testland-{}", unique_id());

    let factors = RegionFactors {
        country: country.clone(),
        states: vec![
            StateFactor {
                state: "North".to_string(),
                emission_factor: 0.82,
            },
            StateFactor {
                state: "South".to_string(),
                emission_factor: 0.65,
            },
        ],
    };
    db.upsert_region_factors(&factors).await.unwrap();

    let factor = db.region_factor(&country, "South").await.unwrap();
    assert_eq!(factor, 0.65);

    let missing_state = db.region_factor(&country, "East").await;
    assert!(matches!(missing_state, Err(AppError::StateNotFound { .. })));

    let missing_country = db.region_factor("Nowhere", "North").await;
    assert!(matches!(missing_country, Err(AppError::RegionNotFound(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// CHALLENGE COMPLETION TESTS
// ═══════════════════════════════════════════════════════════════════════════

fn test_completion(completion_id: u64, user_id: u64) -> ChallengeCompletion {
    ChallengeCompletion {
        completion_id,
        challenge_id: 1,
        user_id,
        images: vec!["/uploads/1_0.jpg".to_string()],
        description: "Cycled to work all week".to_string(),
        status: CompletionStatus::Pending,
        points_achieved: 500,
        carbon_saving: None,
        submitted_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[tokio::test]
async fn test_completion_approval_credits_points_once() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id();
    let completion_id = unique_id();

    db.upsert_user(&test_user(user_id)).await.unwrap();
    db.insert_completion(&test_completion(completion_id, user_id))
        .await
        .unwrap();

    let stored = db.get_completion(completion_id).await.unwrap().unwrap();
    assert_eq!(stored.status, CompletionStatus::Pending);

    let resolved = db
        .resolve_completion(completion_id, CompletionStatus::Success)
        .await
        .unwrap();
    assert_eq!(resolved.status, CompletionStatus::Success);

    let user = db.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.total_points, 500);

    // Re-approving must fail and must not credit again
    let again = db
        .resolve_completion(completion_id, CompletionStatus::Success)
        .await;
    assert!(matches!(again, Err(AppError::InvalidTransition(_))));

    let user = db.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.total_points, 500, "Points must not be credited twice");
}

#[tokio::test]
async fn test_concurrent_approvals_credit_points_once() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id();
    let completion_id = unique_id();

    db.upsert_user(&test_user(user_id)).await.unwrap();
    db.insert_completion(&test_completion(completion_id, user_id))
        .await
        .unwrap();

    // Both see the completion as pending; only one commit may win
    let (first, second) = tokio::join!(
        db.resolve_completion(completion_id, CompletionStatus::Success),
        db.resolve_completion(completion_id, CompletionStatus::Success),
    );
    assert!(
        first.is_ok() != second.is_ok(),
        "Exactly one concurrent approval should succeed, got {:?} / {:?}",
        first.as_ref().map(|c| c.status),
        second.as_ref().map(|c| c.status)
    );

    let user = db.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.total_points, 500, "Points must be credited exactly once");
}

#[tokio::test]
async fn test_point_credit_and_history_append_both_survive() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id();
    let completion_id = unique_id();

    db.upsert_user(&test_user(user_id)).await.unwrap();
    db.insert_completion(&test_completion(completion_id, user_id))
        .await
        .unwrap();

    // Two writers race on the same user document
    let (credit, append) = tokio::join!(
        db.resolve_completion(completion_id, CompletionStatus::Success),
        db.append_monthly_total(
            user_id,
            MonthlyTotal {
                month: "05/2026".to_string(),
                total_co2_emissions: 42.0,
            },
        ),
    );
    credit.unwrap();
    append.unwrap();

    let user = db.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.total_points, 500);
    assert_eq!(
        user.footprint_history.len(),
        1,
        "History entry must survive a concurrent point credit"
    );
}

#[tokio::test]
async fn test_declined_completion_credits_nothing() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id();
    let completion_id = unique_id();

    db.upsert_user(&test_user(user_id)).await.unwrap();
    db.insert_completion(&test_completion(completion_id, user_id))
        .await
        .unwrap();

    let resolved = db
        .resolve_completion(completion_id, CompletionStatus::Declined)
        .await
        .unwrap();
    assert_eq!(resolved.status, CompletionStatus::Declined);

    let user = db.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.total_points, 0);

    // A declined completion cannot later be approved
    let flip = db
        .resolve_completion(completion_id, CompletionStatus::Success)
        .await;
    assert!(matches!(flip, Err(AppError::InvalidTransition(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// CHAT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_chat_membership_and_message_order() {
    require_emulator!();

    let db = test_db().await;
    let alice = unique_id();
    let bob = alice + 1;
    let chat_id = unique_id();

    let chat = Chat {
        chat_id,
        members: vec![alice, bob],
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    db.insert_chat(&chat).await.unwrap();

    let alice_chats = db.chats_for_member(alice).await.unwrap();
    assert!(alice_chats.iter().any(|c| c.chat_id == chat_id));

    let stranger_chats = db.chats_for_member(alice + 999).await.unwrap();
    assert!(!stranger_chats.iter().any(|c| c.chat_id == chat_id));

    for (i, text) in ["first", "second", "third"].iter().enumerate() {
        let message = Message {
            message_id: unique_id(),
            chat_id,
            sender_id: alice,
            text: Some(text.to_string()),
            image: None,
            document: None,
            audio: None,
            created_at: format!("2026-03-0{}T00:00:00Z", i + 1),
        };
        db.insert_message(&message).await.unwrap();
    }

    let messages = db.messages_for_chat(chat_id).await.unwrap();
    let texts: Vec<_> = messages.iter().filter_map(|m| m.text.as_deref()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}
