//! Typed HTTP client for the Shelfmate REST API.
//!
//! One method per route. Once a login succeeds the token is attached
//! as a bearer header to every following request.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::{Category, Friendship, PublicUser, Recommendation};
use crate::infrastructure::auth::Claims;
use crate::models::Book;
use crate::services::auth_service::RegisteredUser;
use crate::services::book_service::BookListing;
use crate::services::friendship_service::{PendingRequest, RespondOutcome};
use crate::services::recommendation_service::ReceivedRecommendation;
use crate::services::user_service::UserSearchHit;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport or decoding failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response carrying the server's `error` message
    #[error("{message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// The logged-in user as returned by the login route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

/// Listing filters; `None` fields are left out of the query string
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookQuery {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// A cover file to upload
#[derive(Debug, Clone, PartialEq)]
pub struct CoverFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Book fields for create and update; only `Some` fields are sent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookDraft {
    pub user_id: Option<i32>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub categories: Option<Vec<String>>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub pages: Option<String>,
    pub language: Option<String>,
    pub cover: Option<CoverFile>,
}

impl BookDraft {
    fn into_form(self) -> Form {
        let mut form = Form::new();
        let texts = [
            ("userId", self.user_id.map(|id| id.to_string())),
            ("title", self.title),
            ("author", self.author),
            ("category", self.category),
            ("status", self.status),
            ("description", self.description),
            ("isbn", self.isbn),
            ("publisher", self.publisher),
            ("publication_place", self.publication_place),
            ("pages", self.pages),
            ("language", self.language),
        ];
        for (name, value) in texts {
            if let Some(value) = value {
                form = form.text(name, value);
            }
        }
        if let Some(categories) = self.categories {
            form = form.text("categories", categories.join(","));
        }
        if let Some(cover) = self.cover {
            form = form.part(
                "coverImage",
                Part::bytes(cover.bytes).file_name(cover.file_name),
            );
        }
        form
    }
}

#[derive(Debug, Deserialize)]
struct SentRequest {
    request: Friendship,
}

#[derive(Debug, Deserialize)]
struct RespondResponse {
    result: RespondOutcome,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    user: Claims,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:8000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}/api{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// Map non-success statuses to `ClientError::Api` using the `error` field
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        tracing::debug!("API call failed with {}: {}", status, message);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // Auth

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<RegisteredUser, ClientError> {
        let body = json!({ "email": email, "password": password, "username": username });
        Self::send(self.request(Method::POST, "/auth/register").json(&body)).await
    }

    /// Log in and keep the token for later calls
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = json!({ "email": email, "password": password });
        let response: LoginResponse =
            Self::send(self.request(Method::POST, "/auth/login").json(&body)).await?;
        self.token = Some(response.token.clone());
        Ok(response)
    }

    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let _: Value = Self::send(self.request(Method::GET, "/auth/logout")).await?;
        self.token = None;
        Ok(())
    }

    pub async fn validate(&self) -> Result<Claims, ClientError> {
        let body = json!({ "token": self.token });
        let response: ValidateResponse =
            Self::send(self.request(Method::POST, "/auth/validate").json(&body)).await?;
        Ok(response.user)
    }

    // Books

    pub async fn list_books(&self, query: &BookQuery) -> Result<BookListing, ClientError> {
        Self::send(self.request(Method::GET, "/books").query(query)).await
    }

    pub async fn get_book(&self, id: i32) -> Result<Book, ClientError> {
        Self::send(self.request(Method::GET, &format!("/books/{}", id))).await
    }

    pub async fn create_book(&self, draft: BookDraft) -> Result<Book, ClientError> {
        Self::send(self.request(Method::POST, "/books").multipart(draft.into_form())).await
    }

    pub async fn update_book(&self, id: i32, draft: BookDraft) -> Result<Book, ClientError> {
        Self::send(
            self.request(Method::PUT, &format!("/books/{}", id))
                .multipart(draft.into_form()),
        )
        .await
    }

    pub async fn delete_book(&self, id: i32) -> Result<(), ClientError> {
        let _: Value = Self::send(self.request(Method::DELETE, &format!("/books/{}", id))).await?;
        Ok(())
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        Self::send(self.request(Method::GET, "/categories")).await
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, ClientError> {
        Self::send(
            self.request(Method::POST, "/categories")
                .json(&json!({ "name": name })),
        )
        .await
    }

    // Friends

    pub async fn send_friend_request(
        &self,
        sender_id: i32,
        receiver_id: i32,
    ) -> Result<Friendship, ClientError> {
        let body = json!({ "senderId": sender_id, "receiverId": receiver_id });
        let sent: SentRequest =
            Self::send(self.request(Method::POST, "/friend/request").json(&body)).await?;
        Ok(sent.request)
    }

    pub async fn respond_to_request(
        &self,
        request_id: i32,
        action: &str,
    ) -> Result<RespondOutcome, ClientError> {
        let body = json!({ "requestId": request_id, "action": action });
        let response: RespondResponse =
            Self::send(self.request(Method::PUT, "/friend/respond").json(&body)).await?;
        Ok(response.result)
    }

    pub async fn list_pending(&self, user_id: i32) -> Result<Vec<PendingRequest>, ClientError> {
        Self::send(
            self.request(Method::GET, "/friend/respond")
                .query(&[("userId", user_id)]),
        )
        .await
    }

    pub async fn list_friends(&self, user_id: i32) -> Result<Vec<PublicUser>, ClientError> {
        Self::send(
            self.request(Method::GET, "/friend/list")
                .query(&[("userId", user_id)]),
        )
        .await
    }

    pub async fn list_friendships(&self, user_id: i32) -> Result<Vec<Friendship>, ClientError> {
        Self::send(self.request(Method::GET, "/friend").query(&[("userId", user_id)])).await
    }

    pub async fn delete_friendship(&self, id: i32) -> Result<(), ClientError> {
        let _: Value =
            Self::send(self.request(Method::DELETE, "/friend").query(&[("id", id)])).await?;
        Ok(())
    }

    // Users

    pub async fn search_users(
        &self,
        query: &str,
        user_id: i32,
    ) -> Result<Vec<UserSearchHit>, ClientError> {
        let user_id = user_id.to_string();
        Self::send(
            self.request(Method::GET, "/user/search")
                .query(&[("query", query), ("userId", user_id.as_str())]),
        )
        .await
    }

    pub async fn get_user(&self, id: i32) -> Result<PublicUser, ClientError> {
        Self::send(self.request(Method::GET, &format!("/user/{}", id))).await
    }

    pub async fn update_user(&self, id: i32, changes: &Value) -> Result<PublicUser, ClientError> {
        Self::send(
            self.request(Method::PUT, &format!("/user/{}", id))
                .json(changes),
        )
        .await
    }

    // Recommendations

    pub async fn list_recommendations(
        &self,
        user_id: i32,
    ) -> Result<Vec<ReceivedRecommendation>, ClientError> {
        Self::send(
            self.request(Method::GET, "/recomendation")
                .query(&[("userId", user_id)]),
        )
        .await
    }

    pub async fn recommend(
        &self,
        book_id: i32,
        sender_id: i32,
        receiver_id: i32,
        message: Option<&str>,
    ) -> Result<Recommendation, ClientError> {
        let body = json!({
            "bookId": book_id,
            "senderId": sender_id,
            "receiverId": receiver_id,
            "message": message,
        });
        Self::send(self.request(Method::POST, "/recomendation").json(&body)).await
    }

    pub async fn delete_recommendation(&self, id: i32) -> Result<(), ClientError> {
        let _: Value = Self::send(
            self.request(Method::DELETE, "/recomendation")
                .query(&[("id", id)]),
        )
        .await?;
        Ok(())
    }
}
