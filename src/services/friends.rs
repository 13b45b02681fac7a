// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friendship graph. Adding a friend is immediate and symmetric.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::user::normalize_email;
use crate::models::{Friendship, FriendshipStatus, User};

/// A friend as shown in the friends list.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FriendProfile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub level: u32,
    pub total_workouts: u32,
    pub current_streak: u32,
}

impl From<User> for FriendProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
            level: user.level,
            total_workouts: user.total_workouts,
            current_streak: user.current_streak,
        }
    }
}

#[derive(Clone)]
pub struct FriendService {
    db: Arc<dyn Store>,
}

impl FriendService {
    pub fn new(db: Arc<dyn Store>) -> Self {
        Self { db }
    }

    pub async fn add_friend(&self, user_id: &str, friend_email: &str) -> Result<FriendProfile> {
        self.add_friend_at(user_id, friend_email, Utc::now()).await
    }

    /// Connect the caller with the user registered under `friend_email`.
    ///
    /// Fails with NotFound for an unknown email, InvalidOperation for the
    /// caller's own email and Conflict if the caller already has this friend.
    pub async fn add_friend_at(
        &self,
        user_id: &str,
        friend_email: &str,
        now: DateTime<Utc>,
    ) -> Result<FriendProfile> {
        let friend = self
            .db
            .find_user_by_email(&normalize_email(friend_email))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if friend.id == user_id {
            return Err(AppError::InvalidOperation(
                "Cannot add yourself as a friend".to_string(),
            ));
        }

        if self.db.find_friendship(user_id, &friend.id).await?.is_some() {
            return Err(AppError::Conflict("Friendship already exists".to_string()));
        }

        self.db
            .insert_friendships(&Friendship::accepted_pair(user_id, &friend.id, now))
            .await?;

        tracing::info!(user_id, friend_id = %friend.id, "Friendship created");
        Ok(friend.into())
    }

    /// Accepted friends, resolved to profiles. Friends whose user record is
    /// gone are skipped.
    pub async fn friends(&self, user_id: &str) -> Result<Vec<FriendProfile>> {
        let edges = self.db.friendships_for_user(user_id).await?;

        let mut friends = Vec::with_capacity(edges.len());
        for edge in edges
            .into_iter()
            .filter(|f| f.status == FriendshipStatus::Accepted)
        {
            if let Some(friend) = self.db.get_user(&edge.friend_id).await? {
                friends.push(friend.into());
            }
        }
        Ok(friends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    async fn setup() -> FriendService {
        let db = MemoryDb::new();
        for id in ["alice", "bob"] {
            let user = User::new(id, &format!("{}@example.com", id), id, None, Utc::now());
            db.create_user(&user).await.unwrap();
        }
        FriendService::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_add_friend_failure_modes() {
        let svc = setup().await;

        let err = svc.add_friend("alice", "nobody@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = svc.add_friend("alice", "alice@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOperation(_)));

        svc.add_friend("alice", "Bob@Example.com").await.unwrap();
        let err = svc.add_friend("alice", "bob@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // The reverse edge exists too
        let err = svc.add_friend("bob", "alice@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
