// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, points, footprint history)
//! - Footprints (public calculator snapshots)
//! - Monthly snapshots (one per user per month, create-only)
//! - Emission factors (region lookup)
//! - Challenges, completions, chats and messages

use crate::db::collections;
use crate::error::AppError;
use crate::models::challenge::ChallengeCadence;
use crate::models::user::MonthlyTotal;
use crate::models::{
    ChallengeCompletion, Chat, CompletionStatus, EcoChallenge, FootprintSnapshot, Message,
    MonthlySnapshot, RegionFactors, User,
};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

/// Sequence counter document, one per ID namespace.
#[derive(Debug, Serialize, Deserialize, Default)]
struct Counter {
    value: u64,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Sequences ───────────────────────────────────────────────

    /// Allocate the next value of a named sequence.
    ///
    /// The counter is read and incremented inside a Firestore
    /// transaction, so the read is part of the commit's conflict check
    /// and concurrent allocations never hand out the same value. Losing
    /// allocations are retried against the fresh counter.
    pub async fn next_sequence(&self, name: &str) -> Result<u64, AppError> {
        let client = self.get_client()?;
        let name = name.to_string();

        client
            .run_transaction(move |db, transaction| {
                let name = name.clone();
                async move {
                    let current: Option<Counter> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::COUNTERS)
                        .obj()
                        .one(&name)
                        .await?;

                    let next = Counter {
                        value: current.map(|c| c.value).unwrap_or(0) + 1,
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::COUNTERS)
                        .document_id(&name)
                        .object(&next)
                        .add_to_transaction(transaction)?;

                    Ok(next.value)
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Counter transaction failed: {}", e)))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by exact username.
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let username = username.to_string();
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("username").eq(username.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(users.pop())
    }

    /// Find a user by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(users.pop())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.user_id.to_string())
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user document.
    pub async fn delete_user(&self, user_id: u64) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Append one month's total to a user's footprint history.
    ///
    /// Transactional read-modify-write of the user document, so a
    /// concurrent point credit on the same user is never lost.
    pub async fn append_monthly_total(
        &self,
        user_id: u64,
        total: MonthlyTotal,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let outcome = client
            .run_transaction(move |db, transaction| {
                let total = total.clone();
                async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(user_id.to_string())
                        .await?;

                    let Some(mut user) = user else {
                        return Ok(Err(AppError::NotFound(format!(
                            "User {} not found",
                            user_id
                        ))));
                    };
                    user.footprint_history.push(total);

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(user.user_id.to_string())
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok(Ok(()))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("History transaction failed: {}", e)))?;

        outcome
    }

    // ─── Footprint Operations ────────────────────────────────────

    /// Store a calculator footprint. Create-only: the generated ID is
    /// allocated from a sequence and never reused.
    pub async fn insert_footprint(&self, footprint: &FootprintSnapshot) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::FOOTPRINTS)
            .document_id(&footprint.footprint_id)
            .object(footprint)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Find a footprint by the email given to the calculator.
    pub async fn find_footprint_by_email(
        &self,
        email: &str,
    ) -> Result<Option<FootprintSnapshot>, AppError> {
        let email = email.to_string();
        let mut results: Vec<FootprintSnapshot> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FOOTPRINTS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(results.pop())
    }

    /// Find a footprint by mobile number.
    pub async fn find_footprint_by_mobile(
        &self,
        mobile_number: &str,
    ) -> Result<Option<FootprintSnapshot>, AppError> {
        let mobile_number = mobile_number.to_string();
        let mut results: Vec<FootprintSnapshot> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FOOTPRINTS)
            .filter(move |q| q.field("mobile_number").eq(mobile_number.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(results.pop())
    }

    // ─── Monthly Snapshot Operations ─────────────────────────────

    /// Document ID for a monthly snapshot: `{user_id}_{MM-YYYY}`.
    fn monthly_doc_id(user_id: u64, month: &str) -> String {
        format!("{}_{}", user_id, crate::time_utils::month_doc_key(month))
    }

    /// Create a monthly snapshot.
    ///
    /// Uses Firestore create semantics on a deterministic document ID so
    /// the uniqueness of (user, month) is enforced by the storage layer:
    /// a concurrent duplicate fails here, not in application code.
    pub async fn create_monthly_snapshot(
        &self,
        snapshot: &MonthlySnapshot,
    ) -> Result<(), AppError> {
        let doc_id = Self::monthly_doc_id(snapshot.user_id, &snapshot.month);
        let month = snapshot.month.clone();

        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::MONTHLY_FOOTPRINTS)
            .document_id(&doc_id)
            .object(snapshot)
            .execute()
            .await
            .map_err(|e| match e {
                firestore::errors::FirestoreError::DataConflictError(_) => {
                    AppError::DuplicateMonthlySnapshot(month.clone())
                }
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    /// Get a monthly snapshot by (user, month).
    pub async fn get_monthly_snapshot(
        &self,
        user_id: u64,
        month: &str,
    ) -> Result<Option<MonthlySnapshot>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MONTHLY_FOOTPRINTS)
            .obj()
            .one(&Self::monthly_doc_id(user_id, month))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user's snapshot for a month.
    pub async fn delete_monthly_snapshot(
        &self,
        user_id: u64,
        month: &str,
    ) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::MONTHLY_FOOTPRINTS)
            .document_id(Self::monthly_doc_id(user_id, month))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All of a user's monthly snapshots, oldest first.
    pub async fn monthly_snapshots_for_user(
        &self,
        user_id: u64,
    ) -> Result<Vec<MonthlySnapshot>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MONTHLY_FOOTPRINTS)
            .filter(move |q| q.field("user_id").eq(user_id))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user's most recent monthly snapshot.
    pub async fn latest_monthly_snapshot(
        &self,
        user_id: u64,
    ) -> Result<Option<MonthlySnapshot>, AppError> {
        let mut results: Vec<MonthlySnapshot> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MONTHLY_FOOTPRINTS)
            .filter(move |q| q.field("user_id").eq(user_id))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(results.pop())
    }

    // ─── Emission Factor Operations ──────────────────────────────

    /// Get the factor document for a country (keyed by country name).
    pub async fn get_region_factors(
        &self,
        country: &str,
    ) -> Result<Option<RegionFactors>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EMISSION_FACTORS)
            .obj()
            .one(country)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Resolve the electricity emission factor for (country, state).
    ///
    /// This is the region lookup the electricity calculator depends on.
    pub async fn region_factor(&self, country: &str, state: &str) -> Result<f64, AppError> {
        let factors = self
            .get_region_factors(country)
            .await?
            .ok_or_else(|| AppError::RegionNotFound(country.to_string()))?;

        factors
            .factor_for(state)
            .ok_or_else(|| AppError::StateNotFound {
                state: state.to_string(),
                country: country.to_string(),
            })
    }

    /// List all emission factor documents.
    pub async fn list_region_factors(&self) -> Result<Vec<RegionFactors>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EMISSION_FACTORS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace the factor document for a country.
    pub async fn upsert_region_factors(&self, factors: &RegionFactors) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EMISSION_FACTORS)
            .document_id(&factors.country)
            .object(factors)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a country's factor document.
    pub async fn delete_region_factors(&self, country: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::EMISSION_FACTORS)
            .document_id(country)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Challenge Operations ────────────────────────────────────

    /// Store a challenge (create or replace).
    pub async fn upsert_challenge(&self, challenge: &EcoChallenge) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CHALLENGES)
            .document_id(challenge.challenge_id.to_string())
            .object(challenge)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a challenge by ID.
    pub async fn get_challenge(&self, challenge_id: u64) -> Result<Option<EcoChallenge>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CHALLENGES)
            .obj()
            .one(&challenge_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List challenges in a rotation (week or month).
    pub async fn list_challenges(
        &self,
        cadence: ChallengeCadence,
    ) -> Result<Vec<EcoChallenge>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHALLENGES)
            .filter(move |q| q.field("cadence").eq(cadence.as_str()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a challenge.
    pub async fn delete_challenge(&self, challenge_id: u64) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::CHALLENGES)
            .document_id(challenge_id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Completion Operations ───────────────────────────────────

    /// Store a new completion submission.
    pub async fn insert_completion(
        &self,
        completion: &ChallengeCompletion,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::CHALLENGE_COMPLETIONS)
            .document_id(completion.completion_id.to_string())
            .object(completion)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a completion by ID.
    pub async fn get_completion(
        &self,
        completion_id: u64,
    ) -> Result<Option<ChallengeCompletion>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CHALLENGE_COMPLETIONS)
            .obj()
            .one(&completion_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All completions submitted by a user.
    pub async fn completions_for_user(
        &self,
        user_id: u64,
    ) -> Result<Vec<ChallengeCompletion>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHALLENGE_COMPLETIONS)
            .filter(move |q| q.field("user_id").eq(user_id))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Completions by a user for one challenge, most recent last.
    pub async fn completions_for_user_and_challenge(
        &self,
        user_id: u64,
        challenge_id: u64,
    ) -> Result<Vec<ChallengeCompletion>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHALLENGE_COMPLETIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("challenge_id").eq(challenge_id),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Resolve a pending completion to `success` or `declined`.
    ///
    /// The completion read, the status write and (on approval) the point
    /// credit all run in one Firestore transaction, so the pending check
    /// is part of the commit's conflict detection. Of two concurrent
    /// approvals one commits and the retried loser sees the resolved
    /// status and gets `InvalidTransition`; points are never credited
    /// twice.
    pub async fn resolve_completion(
        &self,
        completion_id: u64,
        new_status: CompletionStatus,
    ) -> Result<ChallengeCompletion, AppError> {
        let client = self.get_client()?;

        let outcome = client
            .run_transaction(move |db, transaction| {
                async move {
                    let completion: Option<ChallengeCompletion> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::CHALLENGE_COMPLETIONS)
                        .obj()
                        .one(completion_id.to_string())
                        .await?;

                    let Some(mut completion) = completion else {
                        return Ok(Err(AppError::NotFound(format!(
                            "Challenge completion {} not found",
                            completion_id
                        ))));
                    };

                    if completion.status != CompletionStatus::Pending {
                        return Ok(Err(AppError::InvalidTransition(format!(
                            "Completion {} is already {}",
                            completion_id,
                            completion.status.as_str()
                        ))));
                    }

                    completion.status = new_status;

                    if new_status == CompletionStatus::Success {
                        let user: Option<User> = db
                            .fluent()
                            .select()
                            .by_id_in(collections::USERS)
                            .obj()
                            .one(completion.user_id.to_string())
                            .await?;

                        let Some(mut user) = user else {
                            return Ok(Err(AppError::NotFound(format!(
                                "User {} not found",
                                completion.user_id
                            ))));
                        };
                        user.total_points += completion.points_achieved;

                        db.fluent()
                            .update()
                            .in_col(collections::USERS)
                            .document_id(user.user_id.to_string())
                            .object(&user)
                            .add_to_transaction(transaction)?;
                    }

                    db.fluent()
                        .update()
                        .in_col(collections::CHALLENGE_COMPLETIONS)
                        .document_id(completion.completion_id.to_string())
                        .object(&completion)
                        .add_to_transaction(transaction)?;

                    Ok(Ok(completion))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Completion transaction failed: {}", e)))?;

        let completion = outcome?;

        tracing::info!(
            completion_id,
            user_id = completion.user_id,
            status = new_status.as_str(),
            points = completion.points_achieved,
            "Challenge completion resolved"
        );

        Ok(completion)
    }

    // ─── Chat Operations ─────────────────────────────────────────

    /// Store a new chat.
    pub async fn insert_chat(&self, chat: &Chat) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::CHATS)
            .document_id(chat.chat_id.to_string())
            .object(chat)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a chat by ID.
    pub async fn get_chat(&self, chat_id: u64) -> Result<Option<Chat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CHATS)
            .obj()
            .one(&chat_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All chats a user is a member of.
    pub async fn chats_for_member(&self, user_id: u64) -> Result<Vec<Chat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHATS)
            .filter(move |q| q.field("members").array_contains(user_id))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a new message.
    pub async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::MESSAGES)
            .document_id(message.message_id.to_string())
            .object(message)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Messages in a chat, oldest first.
    pub async fn messages_for_chat(&self, chat_id: u64) -> Result<Vec<Message>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MESSAGES)
            .filter(move |q| q.field("chat_id").eq(chat_id))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
