pub mod auth;
pub mod books;
pub mod categories;
pub mod error;
pub mod form;
pub mod friend;
pub mod middleware;
pub mod recommendation;
pub mod user;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::infrastructure::AppState;

/// Routes mounted under `/api`
pub fn api_router(state: AppState) -> Router {
    // Auth (rate limited, no token required)
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", get(auth::logout))
        .route("/auth/validate", post(auth::validate))
        .route_layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    let protected = Router::new()
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        // Friendships
        .route(
            "/friend",
            get(friend::list_friendships)
                .post(friend::send_request)
                .put(friend::update_friendship)
                .delete(friend::delete_friendship),
        )
        .route("/friend/request", post(friend::send_request))
        .route(
            "/friend/respond",
            get(friend::list_pending).put(friend::respond),
        )
        .route("/friend/list", get(friend::list_friends))
        // Users
        .route("/user/search", get(user::search_users))
        .route("/user/:id", get(user::get_user).put(user::update_user))
        // Recommendations
        .route(
            "/recomendation",
            get(recommendation::list_recommendations)
                .post(recommendation::create_recommendation)
                .delete(recommendation::delete_recommendation),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(auth_routes)
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.uploads.max_bytes))
        .with_state(state)
}
