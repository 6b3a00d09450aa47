//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Each function takes the shared `AppState` and returns `DomainError` on failure.

pub mod auth_service;
pub mod book_service;
pub mod category_service;
pub mod friendship_service;
pub mod recommendation_service;
pub mod user_service;
