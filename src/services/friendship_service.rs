//! Friendship Service - request lifecycle and friend lists
//!
//! Each row moves `pending` -> `accepted` or `pending` -> `rejected`.
//! Rejected rows are deleted on the spot, so a stored row is only ever
//! pending or accepted.
//!
//! Pair uniqueness is a check-then-insert with no database constraint:
//! two concurrent requests for the same pair can both pass the check.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Friendship, FriendshipStatus, PublicUser};
use crate::infrastructure::AppState;

/// A pending request together with who sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRequest {
    #[serde(flatten)]
    pub request: Friendship,
    pub sender: Option<PublicUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RespondOutcome {
    Accepted {
        #[serde(rename = "requestId")]
        request_id: i32,
        #[serde(rename = "newFriend")]
        new_friend: PublicUser,
    },
    Rejected {
        #[serde(rename = "requestId")]
        request_id: i32,
    },
}

fn require_ids(sender_id: Option<i32>, receiver_id: Option<i32>) -> Result<(i32, i32), DomainError> {
    let (Some(sender_id), Some(receiver_id)) = (sender_id, receiver_id) else {
        return Err(DomainError::validation(
            "Sender and receiver IDs are required",
        ));
    };
    if sender_id == receiver_id {
        return Err(DomainError::validation(
            "You cannot send a friend request to yourself",
        ));
    }
    Ok((sender_id, receiver_id))
}

/// Open a pending request from `sender_id` to `receiver_id`
pub async fn send_request(
    state: &AppState,
    sender_id: Option<i32>,
    receiver_id: Option<i32>,
) -> Result<Friendship, DomainError> {
    let (sender_id, receiver_id) = require_ids(sender_id, receiver_id)?;

    let users = state.user_repo.find_public(&[sender_id, receiver_id]).await?;
    if !users.contains_key(&sender_id) || !users.contains_key(&receiver_id) {
        return Err(DomainError::validation("Sender or receiver does not exist"));
    }

    if let Some(existing) = state
        .friendship_repo
        .find_between(sender_id, receiver_id)
        .await?
    {
        tracing::debug!(
            "Friend request {} -> {} blocked by row {} ({})",
            sender_id,
            receiver_id,
            existing.id,
            existing.status
        );
        return Err(DomainError::Conflict(
            "A friend request or friendship already exists between these users".to_string(),
        ));
    }

    let request = state.friendship_repo.create(sender_id, receiver_id).await?;
    tracing::info!(
        "Friend request {} sent {} -> {}",
        request.id,
        sender_id,
        receiver_id
    );
    Ok(request)
}

/// Accept or reject a pending request
pub async fn respond(
    state: &AppState,
    request_id: Option<i32>,
    action: &str,
) -> Result<RespondOutcome, DomainError> {
    let action: FriendshipStatus = action.parse()?;
    if action == FriendshipStatus::Pending {
        return Err(DomainError::validation(
            "Action must be 'accepted' or 'rejected'",
        ));
    }

    let request_id = request_id.ok_or_else(|| DomainError::validation("Request ID is required"))?;
    let request = match state.friendship_repo.find_by_id(request_id).await? {
        Some(r) if r.status == FriendshipStatus::Pending => r,
        _ => {
            return Err(DomainError::validation(
                "Friend request not found or already handled",
            ));
        }
    };

    match action {
        FriendshipStatus::Rejected => {
            state.friendship_repo.delete(request.id).await?;
            tracing::info!("Friend request {} rejected", request.id);
            Ok(RespondOutcome::Rejected {
                request_id: request.id,
            })
        }
        _ => {
            state
                .friendship_repo
                .update_status(request.id, FriendshipStatus::Accepted)
                .await?;
            let sender = state
                .user_repo
                .find_by_id(request.sender_id)
                .await?
                .ok_or_else(|| DomainError::not_found("User"))?;
            tracing::info!("Friend request {} accepted", request.id);
            Ok(RespondOutcome::Accepted {
                request_id: request.id,
                new_friend: PublicUser::from(&sender),
            })
        }
    }
}

/// Pending requests addressed to the user, with sender profiles
pub async fn list_pending(state: &AppState, user_id: i32) -> Result<Vec<PendingRequest>, DomainError> {
    let requests = state.friendship_repo.find_pending_for(user_id).await?;
    let sender_ids: Vec<i32> = requests.iter().map(|r| r.sender_id).collect();
    let senders = state.user_repo.find_public(&sender_ids).await?;

    Ok(requests
        .into_iter()
        .map(|request| PendingRequest {
            sender: senders.get(&request.sender_id).cloned(),
            request,
        })
        .collect())
}

/// The other party of every accepted friendship involving the user
pub async fn list_friends(state: &AppState, user_id: i32) -> Result<Vec<PublicUser>, DomainError> {
    let rows = state
        .friendship_repo
        .find_involving(user_id, Some(FriendshipStatus::Accepted))
        .await?;

    let friend_ids: Vec<i32> = rows.iter().map(|r| r.counterpart(user_id)).collect();
    let profiles = state.user_repo.find_public(&friend_ids).await?;

    Ok(friend_ids
        .iter()
        .filter_map(|id| profiles.get(id).cloned())
        .collect())
}

/// Every row involving the user, whatever the status
pub async fn list_for_user(state: &AppState, user_id: i32) -> Result<Vec<Friendship>, DomainError> {
    state.friendship_repo.find_involving(user_id, None).await
}

/// Set a row's status directly; `rejected` deletes the row
pub async fn update_status(
    state: &AppState,
    id: i32,
    status: &str,
) -> Result<Option<Friendship>, DomainError> {
    let status: FriendshipStatus = status.parse()?;

    if state.friendship_repo.find_by_id(id).await?.is_none() {
        return Err(DomainError::not_found("Friendship"));
    }

    if status == FriendshipStatus::Rejected {
        state.friendship_repo.delete(id).await?;
        tracing::info!("Friendship {} removed via status update", id);
        return Ok(None);
    }

    let updated = state.friendship_repo.update_status(id, status).await?;
    tracing::info!("Friendship {} set to {}", id, status);
    Ok(Some(updated))
}

/// Remove a row: unfriend, or cancel a sent request
pub async fn delete(state: &AppState, id: i32) -> Result<(), DomainError> {
    state.friendship_repo.delete(id).await?;
    tracing::info!("Friendship {} deleted", id);
    Ok(())
}
