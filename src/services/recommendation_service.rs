//! Recommendation Service - share a book with another user

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, NewRecommendation, PublicUser, Recommendation};
use crate::infrastructure::AppState;
use crate::models::Book;

/// A received recommendation with the book and who sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub book: Option<Book>,
    pub sender: Option<PublicUser>,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendInput {
    pub book_id: Option<i32>,
    pub sender_id: Option<i32>,
    pub receiver_id: Option<i32>,
    pub message: Option<String>,
}

pub async fn recommend(state: &AppState, input: RecommendInput) -> Result<Recommendation, DomainError> {
    let (Some(book_id), Some(sender_id), Some(receiver_id)) =
        (input.book_id, input.sender_id, input.receiver_id)
    else {
        return Err(DomainError::validation(
            "Book ID, sender ID and receiver ID are required",
        ));
    };

    if state.book_repo.find_by_id(book_id).await?.is_none() {
        return Err(DomainError::not_found("Book"));
    }

    let message = input
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let recommendation = state
        .recommendation_repo
        .create(NewRecommendation {
            book_id,
            sender_id,
            receiver_id,
            message,
        })
        .await?;

    tracing::info!(
        "User {} recommended book {} to user {}",
        sender_id,
        book_id,
        receiver_id
    );
    Ok(recommendation)
}

/// Newest first. A book deleted since the recommendation was made shows up as `null`.
pub async fn list_received(
    state: &AppState,
    user_id: i32,
) -> Result<Vec<ReceivedRecommendation>, DomainError> {
    let rows = state.recommendation_repo.find_received(user_id).await?;
    let sender_ids: Vec<i32> = rows.iter().map(|r| r.sender_id).collect();
    let senders = state.user_repo.find_public(&sender_ids).await?;

    let mut out = Vec::with_capacity(rows.len());
    for recommendation in rows {
        let book = state.book_repo.find_by_id(recommendation.book_id).await?;
        out.push(ReceivedRecommendation {
            sender: senders.get(&recommendation.sender_id).cloned(),
            book,
            recommendation,
        });
    }
    Ok(out)
}

pub async fn delete(state: &AppState, id: i32) -> Result<(), DomainError> {
    state.recommendation_repo.delete(id).await?;
    tracing::info!("Recommendation {} deleted", id);
    Ok(())
}
