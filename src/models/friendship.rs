// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friendship edges between users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Edge status. Only `Accepted` is produced today; friends are added
/// immediately and symmetrically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Blocked,
}

/// Directed edge `user_id -> friend_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Friendship {
    /// Edge key, see [`Friendship::key`]
    pub id: String,
    pub user_id: String,
    pub friend_id: String,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn key(user_id: &str, friend_id: &str) -> String {
        format!(
            "{}_{}",
            super::key_segment(user_id),
            super::key_segment(friend_id)
        )
    }

    fn accepted(user_id: &str, friend_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: Self::key(user_id, friend_id),
            user_id: user_id.to_string(),
            friend_id: friend_id.to_string(),
            status: FriendshipStatus::Accepted,
            created_at: at,
        }
    }

    /// Both directions of an accepted friendship.
    pub fn accepted_pair(user_id: &str, friend_id: &str, at: DateTime<Utc>) -> [Self; 2] {
        [
            Self::accepted(user_id, friend_id, at),
            Self::accepted(friend_id, user_id, at),
        ]
    }
}
