//! User Service - profiles and user search

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, FriendshipStatus, PublicUser, User, UserChanges};
use crate::infrastructure::AppState;

/// A search hit annotated with the searcher's relationship to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchHit {
    pub id: i32,
    pub username: String,
    #[serde(rename = "photo_url")]
    pub photo_url: Option<String>,
    pub is_friend: bool,
    pub is_requested: bool,
}

/// Partial profile update as received from the client
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub photo_url: Option<Option<String>>,
}

async fn find_user(state: &AppState, id: i32) -> Result<User, DomainError> {
    state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))
}

pub async fn get_profile(state: &AppState, id: i32) -> Result<PublicUser, DomainError> {
    Ok(PublicUser::from(&find_user(state, id).await?))
}

pub async fn update_profile(
    state: &AppState,
    id: i32,
    update: ProfileUpdate,
) -> Result<PublicUser, DomainError> {
    let current = find_user(state, id).await?;

    let email = match update.email.as_deref().map(str::trim) {
        Some("") => return Err(DomainError::validation("Email cannot be empty")),
        Some(email) => Some(email.to_lowercase()),
        None => None,
    };
    let username = match update.username.as_deref().map(str::trim) {
        Some("") => return Err(DomainError::validation("Username cannot be empty")),
        Some(name) => Some(name.to_string()),
        None => None,
    };

    if let Some(email) = &email
        && *email != current.email
        && let Some(owner) = state.user_repo.find_by_email(email).await?
        && owner.id != id
    {
        return Err(DomainError::Conflict("Email already in use".to_string()));
    }

    let user = state
        .user_repo
        .update(
            id,
            UserChanges {
                email,
                username,
                photo_url: update.photo_url,
            },
        )
        .await?;

    tracing::info!("Updated profile of user {}", id);
    Ok(PublicUser::from(&user))
}

/// Case-insensitive username search, excluding the searcher.
/// `isRequested` marks users the searcher has a pending request out to.
/// Friends come first; otherwise the store's order is kept.
pub async fn search_users(
    state: &AppState,
    query: &str,
    searcher_id: i32,
) -> Result<Vec<UserSearchHit>, DomainError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let users = state.user_repo.search(query, searcher_id).await?;
    let rows = state.friendship_repo.find_involving(searcher_id, None).await?;

    let mut friends = HashSet::new();
    let mut requested = HashSet::new();
    for row in &rows {
        let other = row.counterpart(searcher_id);
        match row.status {
            FriendshipStatus::Accepted => {
                friends.insert(other);
            }
            FriendshipStatus::Pending if row.sender_id == searcher_id => {
                requested.insert(other);
            }
            _ => {}
        }
    }

    tracing::debug!(
        "User search '{}' by {}: {} matches",
        query,
        searcher_id,
        users.len()
    );

    let hits = users
        .into_iter()
        .map(|user| UserSearchHit {
            is_friend: friends.contains(&user.id),
            is_requested: requested.contains(&user.id),
            id: user.id,
            username: user.username,
            photo_url: user.photo_url,
        })
        .collect();

    Ok(friends_first(hits))
}

/// Stable partition: friends keep their relative order, then everyone else
pub fn friends_first(mut hits: Vec<UserSearchHit>) -> Vec<UserSearchHit> {
    hits.sort_by_key(|hit| !hit.is_friend);
    hits
}
