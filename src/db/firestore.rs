// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile + cumulative stats)
//! - Exercise progress (append-only workout log)
//! - Daily challenges and completions
//! - Achievements and friendships
//! - Weekly leaderboard entries
//!
//! Composite indexes required: `(user_id, date)` on exercise_progress and
//! challenge_completions, `(week_start, rank)` on leaderboards and
//! `(user_id, completed_at desc)` on exercise_progress.

use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{paths, FirestoreConsistencySelector, FirestoreQueryDirection};
use std::time::Duration;

use crate::db::{already_exists, collections, Store, UserUpdate};
use crate::error::{AppError, Result};
use crate::models::{
    Achievement, CatalogExercise, Challenge, ChallengeCompletion, ExerciseRecord, ExerciseType,
    Friendship, LeaderboardEntry, User, WeeklyTotals,
};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Attempts for a contended read-modify-write transaction.
const MAX_TRANSACTION_ATTEMPTS: u32 = 5;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

fn db_error(e: FirestoreError) -> AppError {
    AppError::Database(e.to_string())
}

/// Map a create-only insert failure, turning "already exists" into a conflict.
fn insert_error(what: &str, key: &str, e: FirestoreError) -> AppError {
    match e {
        FirestoreError::DataConflictError(_) => already_exists(what, key),
        other => db_error(other),
    }
}

/// Firestore document IDs may not contain `/`.
fn user_doc_id(user_id: &str) -> String {
    urlencoding::encode(user_id).into_owned()
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
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

        Ok(Self { client })
    }

    /// One attempt of [`Store::update_user`].
    async fn try_update_user(
        &self,
        doc_id: &str,
        update: UserUpdate<'_>,
    ) -> std::result::Result<Option<User>, FirestoreError> {
        let mut transaction = self.client.begin_transaction().await?;

        // Reading with the transaction's selector registers the document
        // for conflict detection at commit.
        let current: Option<User> = self
            .client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(doc_id)
            .await?;
        let Some(mut user) = current else {
            let _ = transaction.rollback().await;
            return Ok(None);
        };

        update(&mut user);

        self.client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(doc_id)
            .object(&user)
            .add_to_transaction(&mut transaction)?;

        transaction.commit().await?;
        Ok(Some(user))
    }

    /// Fetch one document by ID.
    async fn get_doc<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        self.client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(db_error)
    }

    /// Create a document, failing with a conflict if the ID is taken.
    async fn create_doc<T>(&self, collection: &str, what: &str, doc_id: &str, doc: &T) -> Result<()>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Sync + Send,
    {
        let _: T = self
            .client
            .fluent()
            .insert()
            .into(collection)
            .document_id(doc_id)
            .object(doc)
            .execute()
            .await
            .map_err(|e| insert_error(what, doc_id, e))?;
        Ok(())
    }

    /// Records of one user whose `date` field lies in `[from_date, to_date]`.
    async fn user_docs_between_dates<T>(
        &self,
        collection: &str,
        user_id: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        self.client
            .fluent()
            .select()
            .from(collection)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("date").greater_than_or_equal(from_date),
                    q.field("date").less_than_or_equal(to_date),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    /// Records of one user stamped with exactly `date`.
    async fn user_docs_on_date<T>(&self, collection: &str, user_id: &str, date: &str) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        self.client
            .fluent()
            .select()
            .from(collection)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("date").eq(date),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.get_doc(collections::USERS, &user_doc_id(user_id)).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_error)?;
        Ok(users.into_iter().next())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        self.create_doc(collections::USERS, "User", &user_doc_id(&user.id), user)
            .await
    }

    /// Read-modify-write in a transaction. The read goes through the
    /// transaction, so a concurrent update to the same user aborts the
    /// commit and the whole attempt is retried with fresh data.
    async fn update_user(&self, user_id: &str, update: UserUpdate<'_>) -> Result<Option<User>> {
        let doc_id = user_doc_id(user_id);

        let mut attempt = 1;
        loop {
            match self.try_update_user(&doc_id, update).await {
                Err(FirestoreError::DatabaseError(e))
                    if e.retry_possible && attempt < MAX_TRANSACTION_ATTEMPTS =>
                {
                    tracing::debug!(user_id, attempt, error = %e, "Retrying user update");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                other => {
                    return other.map_err(|e| {
                        AppError::Database(format!("User update transaction failed: {}", e))
                    })
                }
            }
        }
    }

    // ─── Exercise Log ────────────────────────────────────────────

    async fn insert_exercise(&self, record: &ExerciseRecord) -> Result<()> {
        self.create_doc(collections::EXERCISES, "Exercise", &record.id, record)
            .await
    }

    async fn exercises_on_date(&self, user_id: &str, date: &str) -> Result<Vec<ExerciseRecord>> {
        self.user_docs_on_date(collections::EXERCISES, user_id, date)
            .await
    }

    async fn exercises_between_dates(
        &self,
        user_id: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<ExerciseRecord>> {
        self.user_docs_between_dates(collections::EXERCISES, user_id, from_date, to_date)
            .await
    }

    async fn recent_exercises(&self, user_id: &str, limit: u32) -> Result<Vec<ExerciseRecord>> {
        self.client
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([("completed_at", FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    // ─── Exercise Catalog ────────────────────────────────────────

    async fn get_catalog_exercise(&self, key: &str) -> Result<Option<CatalogExercise>> {
        self.get_doc(collections::CATALOG, key).await
    }

    async fn insert_catalog_exercise(&self, exercise: &CatalogExercise) -> Result<()> {
        self.create_doc(collections::CATALOG, "Exercise", &exercise.id, exercise)
            .await
    }

    async fn catalog_exercises(
        &self,
        category: Option<ExerciseType>,
    ) -> Result<Vec<CatalogExercise>> {
        let select = self.client.fluent().select().from(collections::CATALOG);
        let query = match category {
            Some(category) => select
                .filter(|q| q.for_all([q.field("category").eq(category.as_str())]))
                .obj(),
            None => select.obj(),
        };
        query.query().await.map_err(db_error)
    }

    // ─── Challenges ──────────────────────────────────────────────

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>> {
        self.get_doc(collections::CHALLENGES, challenge_id).await
    }

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<()> {
        self.create_doc(collections::CHALLENGES, "Challenge", &challenge.id, challenge)
            .await
    }

    async fn challenges_on_date(&self, date: &str) -> Result<Vec<Challenge>> {
        self.client
            .fluent()
            .select()
            .from(collections::CHALLENGES)
            .filter(|q| q.for_all([q.field("date").eq(date)]))
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    async fn find_completion(
        &self,
        user_id: &str,
        challenge_id: &str,
        date: &str,
    ) -> Result<Option<ChallengeCompletion>> {
        let key = ChallengeCompletion::key(user_id, challenge_id, date);
        self.get_doc(collections::COMPLETIONS, &key).await
    }

    async fn insert_completion(&self, completion: &ChallengeCompletion) -> Result<()> {
        self.create_doc(
            collections::COMPLETIONS,
            "Challenge completion",
            &completion.id,
            completion,
        )
        .await
    }

    async fn completions_for_user(&self, user_id: &str) -> Result<Vec<ChallengeCompletion>> {
        self.client
            .fluent()
            .select()
            .from(collections::COMPLETIONS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    async fn completions_on_date(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Vec<ChallengeCompletion>> {
        self.user_docs_on_date(collections::COMPLETIONS, user_id, date)
            .await
    }

    async fn completions_between_dates(
        &self,
        user_id: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<ChallengeCompletion>> {
        self.user_docs_between_dates(collections::COMPLETIONS, user_id, from_date, to_date)
            .await
    }

    // ─── Achievements ────────────────────────────────────────────

    async fn find_achievement(&self, user_id: &str, kind: &str) -> Result<Option<Achievement>> {
        let key = Achievement::key(user_id, kind);
        self.get_doc(collections::ACHIEVEMENTS, &key).await
    }

    async fn insert_achievement(&self, achievement: &Achievement) -> Result<()> {
        self.create_doc(
            collections::ACHIEVEMENTS,
            "Achievement",
            &achievement.id,
            achievement,
        )
        .await
    }

    async fn achievements_for_user(&self, user_id: &str) -> Result<Vec<Achievement>> {
        self.client
            .fluent()
            .select()
            .from(collections::ACHIEVEMENTS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([("unlocked_at", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    async fn all_achievements(&self) -> Result<Vec<Achievement>> {
        self.client
            .fluent()
            .select()
            .from(collections::ACHIEVEMENTS)
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    // ─── Friendships ─────────────────────────────────────────────

    async fn find_friendship(&self, user_id: &str, friend_id: &str) -> Result<Option<Friendship>> {
        let key = Friendship::key(user_id, friend_id);
        self.get_doc(collections::FRIENDSHIPS, &key).await
    }

    /// Both edges are committed in one transaction.
    async fn insert_friendships(&self, edges: &[Friendship]) -> Result<()> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for edge in edges {
            self.client
                .fluent()
                .update()
                .in_col(collections::FRIENDSHIPS)
                .document_id(&edge.id)
                .object(edge)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add friendship to transaction: {}",
                        e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;
        Ok(())
    }

    async fn friendships_for_user(&self, user_id: &str) -> Result<Vec<Friendship>> {
        self.client
            .fluent()
            .select()
            .from(collections::FRIENDSHIPS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    // ─── Leaderboard ─────────────────────────────────────────────

    async fn get_leaderboard_entry(
        &self,
        user_id: &str,
        week_start: &str,
    ) -> Result<Option<LeaderboardEntry>> {
        let key = LeaderboardEntry::key(user_id, week_start);
        self.get_doc(collections::LEADERBOARDS, &key).await
    }

    async fn upsert_leaderboard_totals(
        &self,
        user_id: &str,
        week_start: &str,
        totals: WeeklyTotals,
    ) -> Result<LeaderboardEntry> {
        if let Some(mut entry) = self.get_leaderboard_entry(user_id, week_start).await? {
            entry.apply_totals(totals);
            let _: () = self
                .client
                .fluent()
                .update()
                .fields(paths!(LeaderboardEntry::{weekly_workouts, weekly_points, weekly_minutes}))
                .in_col(collections::LEADERBOARDS)
                .document_id(&entry.id)
                .object(&entry)
                .execute()
                .await
                .map_err(db_error)?;
            return Ok(entry);
        }

        let entry = LeaderboardEntry::unranked(user_id, week_start, totals);
        match self
            .create_doc(collections::LEADERBOARDS, "Leaderboard entry", &entry.id, &entry)
            .await
        {
            Ok(()) => Ok(entry),
            // Another writer created it between our read and insert; patch theirs.
            Err(AppError::Conflict(_)) => {
                self.upsert_leaderboard_totals(user_id, week_start, totals)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn leaderboard_for_week(&self, week_start: &str) -> Result<Vec<LeaderboardEntry>> {
        self.client
            .fluent()
            .select()
            .from(collections::LEADERBOARDS)
            .filter(|q| q.for_all([q.field("week_start").eq(week_start)]))
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    async fn leaderboard_top(
        &self,
        week_start: &str,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        self.client
            .fluent()
            .select()
            .from(collections::LEADERBOARDS)
            .filter(|q| {
                q.for_all([
                    q.field("week_start").eq(week_start),
                    q.field("rank").greater_than_or_equal(1u64),
                ])
            })
            .order_by([("rank", FirestoreQueryDirection::Ascending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    /// Rank writes are committed in transactions of at most [`BATCH_SIZE`].
    async fn set_leaderboard_ranks(&self, entries: &[LeaderboardEntry]) -> Result<()> {
        for chunk in entries.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for entry in chunk {
                self.client
                    .fluent()
                    .update()
                    .fields(paths!(LeaderboardEntry::{rank}))
                    .in_col(collections::LEADERBOARDS)
                    .document_id(&entry.id)
                    .object(entry)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add rank update to transaction: {}",
                            e
                        ))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Failed to commit rank batch: {}", e)))?;
        }
        Ok(())
    }
}
