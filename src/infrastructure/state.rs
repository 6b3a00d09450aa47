//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    BookRepository, CategoryRepository, FriendshipRepository, RecommendationRepository,
    UserRepository,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::rate_limit::RateLimiter;
use crate::infrastructure::storage::CoverStorage;
use crate::infrastructure::{
    SeaOrmBookRepository, SeaOrmCategoryRepository, SeaOrmFriendshipRepository,
    SeaOrmRecommendationRepository, SeaOrmUserRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub config: Arc<Config>,
    pub user_repo: Arc<dyn UserRepository>,
    pub book_repo: Arc<dyn BookRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub friendship_repo: Arc<dyn FriendshipRepository>,
    pub recommendation_repo: Arc<dyn RecommendationRepository>,
    /// Cover image files under the uploads directory
    pub covers: CoverStorage,
    /// Per-IP limiter for the auth routes
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let covers = CoverStorage::new(config.uploads.clone());

        Self {
            user_repo: Arc::new(SeaOrmUserRepository::new(db.clone())),
            book_repo: Arc::new(SeaOrmBookRepository::new(db.clone())),
            category_repo: Arc::new(SeaOrmCategoryRepository::new(db.clone())),
            friendship_repo: Arc::new(SeaOrmFriendshipRepository::new(db.clone())),
            recommendation_repo: Arc::new(SeaOrmRecommendationRepository::new(db.clone())),
            covers,
            rate_limiter,
            config: Arc::new(config),
            db,
        }
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Allow extracting DatabaseConnection from AppState
impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
