//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;
use crate::models::book::Book;

/// Reading status of a book on a shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Unread,
    Reading,
    Finished,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Unread => "unread",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unread" => Ok(ReadingStatus::Unread),
            "reading" => Ok(ReadingStatus::Reading),
            "finished" => Ok(ReadingStatus::Finished),
            other => Err(DomainError::validation(format!(
                "Invalid status '{}'. Must be 'unread', 'reading' or 'finished'",
                other
            ))),
        }
    }
}

/// Lifecycle state of a friendship row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendshipStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(FriendshipStatus::Pending),
            "accepted" => Ok(FriendshipStatus::Accepted),
            "rejected" => Ok(FriendshipStatus::Rejected),
            other => Err(DomainError::validation(format!(
                "Invalid friendship status '{}'",
                other
            ))),
        }
    }
}

/// A registered user, including the stored password hash
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub photo_url: Option<String>,
}

/// What other users get to see about someone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub photo_url: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// Profile fields a user may change; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub photo_url: Option<Option<String>>,
}

/// Repository trait for User entity
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Public profiles for a set of ids, keyed by id
    async fn find_public(&self, ids: &[i32]) -> Result<HashMap<i32, PublicUser>, DomainError>;

    /// Case-insensitive username substring search, never returning `exclude_id`
    async fn search(&self, fragment: &str, exclude_id: i32) -> Result<Vec<User>, DomainError>;

    async fn create(&self, input: NewUser) -> Result<User, DomainError>;

    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, DomainError>;
}

/// Filter criteria for the paginated book listing
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub user_id: i32,
    pub page: u64,
    pub limit: u64,
    pub category: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
    pub query: Option<String>,
}

impl BookFilter {
    /// Rows per page; SQLite binds LIMIT/OFFSET as signed 64-bit
    pub fn page_size(&self) -> u64 {
        self.limit.clamp(1, i64::MAX as u64)
    }

    /// Rows to skip for the 1-based `page`, saturating instead of overflowing
    pub fn offset(&self) -> u64 {
        self.page
            .max(1)
            .saturating_sub(1)
            .saturating_mul(self.page_size())
            .min(i64::MAX as u64)
    }
}

/// Paginated result with total count
#[derive(Debug)]
pub struct PaginatedBooks {
    pub books: Vec<Book>,
    pub total: u64,
}

/// Input for creating a book
#[derive(Debug, Clone)]
pub struct NewBook {
    pub user_id: i32,
    pub title: String,
    pub author: String,
    pub category: Option<String>,
    pub status: ReadingStatus,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub cover_image: String,
}

/// Fields to change on a book; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub status: Option<ReadingStatus>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub pages: Option<Option<i32>>,
    pub language: Option<String>,
    pub cover_image: Option<String>,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// One page of a user's books matching the filter, plus the filtered total
    async fn find_page(&self, filter: &BookFilter) -> Result<PaginatedBooks, DomainError>;

    /// Count a user's books in a given status, ignoring any filter
    async fn count_by_status(&self, user_id: i32, status: ReadingStatus)
    -> Result<u64, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    async fn create(&self, input: NewBook) -> Result<Book, DomainError>;

    async fn update(&self, id: i32, changes: BookChanges) -> Result<Book, DomainError>;

    /// Delete a book by ID; `NotFound` when nothing was deleted
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// A book category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// Key under which category names are unique: trimmed and lowercased
/// with full Unicode case mapping, so "Économie" and "économie" collide.
pub fn category_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Repository trait for categories and their links to books
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Category>, DomainError>;

    /// Case-insensitive exact name lookup
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError>;

    async fn create(&self, name: &str) -> Result<Category, DomainError>;

    /// Replace the set of categories linked to a book
    async fn replace_links(&self, book_id: i32, category_ids: &[i32]) -> Result<(), DomainError>;
}

/// A friendship row: a directed request that may become a symmetric friendship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: i32,
    #[serde(rename = "senderId")]
    pub sender_id: i32,
    #[serde(rename = "receiverId")]
    pub receiver_id: i32,
    pub status: FriendshipStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Friendship {
    /// The party on the other side of this row from `user_id`
    pub fn counterpart(&self, user_id: i32) -> i32 {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    pub fn involves(&self, user_id: i32) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

/// Repository trait for Friendship entity
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Friendship>, DomainError>;

    /// Any row linking the unordered pair, in either direction
    async fn find_between(&self, a: i32, b: i32) -> Result<Option<Friendship>, DomainError>;

    /// Rows where the user is sender or receiver, optionally by status
    async fn find_involving(
        &self,
        user_id: i32,
        status: Option<FriendshipStatus>,
    ) -> Result<Vec<Friendship>, DomainError>;

    /// Pending rows addressed to the user
    async fn find_pending_for(&self, receiver_id: i32) -> Result<Vec<Friendship>, DomainError>;

    async fn create(&self, sender_id: i32, receiver_id: i32) -> Result<Friendship, DomainError>;

    async fn update_status(
        &self,
        id: i32,
        status: FriendshipStatus,
    ) -> Result<Friendship, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// A book shared from one user to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i32,
    #[serde(rename = "bookId")]
    pub book_id: i32,
    #[serde(rename = "senderId")]
    pub sender_id: i32,
    #[serde(rename = "receiverId")]
    pub receiver_id: i32,
    pub message: Option<String>,
    pub created_at: String,
}

/// Input for creating a recommendation
#[derive(Debug, Clone)]
pub struct NewRecommendation {
    pub book_id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub message: Option<String>,
}

/// Repository trait for Recommendation entity
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    async fn create(&self, input: NewRecommendation) -> Result<Recommendation, DomainError>;

    /// Recommendations received by the user, newest first
    async fn find_received(&self, receiver_id: i32) -> Result<Vec<Recommendation>, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
