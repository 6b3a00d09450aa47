//! Client-side state container.
//!
//! `State` is split into slices, each with its own `loading` flag and
//! last `error`. All changes go through [`reduce`], a pure function of
//! the previous state and an [`Action`]; [`Store`] just owns the state
//! and hands out search generations.

use std::collections::HashMap;

use crate::client::api::{BookQuery, SessionUser};
use crate::domain::{Category, PublicUser};
use crate::models::Book;
use crate::services::book_service::BookListing;
use crate::services::friendship_service::PendingRequest;
use crate::services::recommendation_service::ReceivedRecommendation;
use crate::services::user_service::UserSearchHit;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooksState {
    /// Books keyed by id
    pub by_id: HashMap<i32, Book>,
    /// Ids of the current page in server order
    pub order: Vec<i32>,
    pub filters: BookQuery,
    pub page: u64,
    pub total_books: u64,
    pub finished_books: u64,
    pub reading_books: u64,
    pub total_pages: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl BooksState {
    /// The current page, in order
    pub fn visible(&self) -> Vec<&Book> {
        self.order.iter().filter_map(|id| self.by_id.get(id)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoriesState {
    pub items: Vec<Category>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FriendsState {
    pub friends: Vec<PublicUser>,
    pub pending: Vec<PendingRequest>,
    pub search_results: Vec<UserSearchHit>,
    /// Generation of the latest search issued; older responses are dropped
    pub search_generation: u64,
    pub searching: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationsState {
    pub received: Vec<ReceivedRecommendation>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub auth: AuthState,
    pub books: BooksState,
    pub categories: CategoriesState,
    pub friends: FriendsState,
    pub recommendations: RecommendationsState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Auth
    AuthPending,
    LoginFulfilled { token: String, user: SessionUser },
    RegisterFulfilled,
    AuthRejected(String),
    LoggedOut,

    // Books
    BooksPending,
    BooksFulfilled { filters: BookQuery, listing: BookListing },
    BookSaved(Book),
    BookDeleted(i32),
    BooksRejected(String),

    // Categories
    CategoriesPending,
    CategoriesFulfilled(Vec<Category>),
    CategoryCreated(Category),
    CategoriesRejected(String),

    // Friends
    FriendsPending,
    FriendsFulfilled(Vec<PublicUser>),
    PendingFulfilled(Vec<PendingRequest>),
    RequestSent { receiver_id: i32 },
    RequestAccepted { request_id: i32, new_friend: PublicUser },
    RequestRejected { request_id: i32 },
    FriendRemoved { user_id: i32 },
    FriendsRejected(String),
    SearchPending { generation: u64 },
    SearchFulfilled { generation: u64, hits: Vec<UserSearchHit> },
    SearchRejected { generation: u64, error: String },

    // Recommendations
    RecommendationsPending,
    RecommendationsFulfilled(Vec<ReceivedRecommendation>),
    RecommendationDeleted(i32),
    RecommendationsRejected(String),
}

/// Apply one action to the state
pub fn reduce(state: &mut State, action: Action) {
    match action {
        Action::AuthPending => {
            state.auth.loading = true;
            state.auth.error = None;
        }
        Action::LoginFulfilled { token, user } => {
            state.auth = AuthState {
                user: Some(user),
                token: Some(token),
                loading: false,
                error: None,
            };
        }
        Action::RegisterFulfilled => {
            state.auth.loading = false;
        }
        Action::AuthRejected(error) => {
            state.auth.loading = false;
            state.auth.error = Some(error);
        }
        Action::LoggedOut => {
            *state = State::default();
        }

        Action::BooksPending => {
            state.books.loading = true;
            state.books.error = None;
        }
        Action::BooksFulfilled { filters, listing } => {
            let books = &mut state.books;
            books.order = listing.books.iter().map(|b| b.id).collect();
            books.by_id = listing.books.into_iter().map(|b| (b.id, b)).collect();
            books.filters = filters;
            books.page = listing.current_page;
            books.total_books = listing.total_books;
            books.finished_books = listing.finished_books;
            books.reading_books = listing.reading_books;
            books.total_pages = listing.total_pages;
            books.loading = false;
        }
        Action::BookSaved(book) => {
            let books = &mut state.books;
            if !books.order.contains(&book.id) {
                books.order.insert(0, book.id);
                books.total_books += 1;
            }
            books.by_id.insert(book.id, book);
            books.loading = false;
        }
        Action::BookDeleted(id) => {
            let books = &mut state.books;
            if books.by_id.remove(&id).is_some() {
                books.total_books = books.total_books.saturating_sub(1);
            }
            books.order.retain(|b| *b != id);
            books.loading = false;
        }
        Action::BooksRejected(error) => {
            state.books.loading = false;
            state.books.error = Some(error);
        }

        Action::CategoriesPending => {
            state.categories.loading = true;
            state.categories.error = None;
        }
        Action::CategoriesFulfilled(items) => {
            state.categories.items = items;
            state.categories.loading = false;
        }
        Action::CategoryCreated(category) => {
            let items = &mut state.categories.items;
            items.push(category);
            items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            state.categories.loading = false;
        }
        Action::CategoriesRejected(error) => {
            state.categories.loading = false;
            state.categories.error = Some(error);
        }

        Action::FriendsPending => {
            state.friends.loading = true;
            state.friends.error = None;
        }
        Action::FriendsFulfilled(friends) => {
            state.friends.friends = friends;
            state.friends.loading = false;
        }
        Action::PendingFulfilled(pending) => {
            state.friends.pending = pending;
            state.friends.loading = false;
        }
        Action::RequestSent { receiver_id } => {
            for hit in &mut state.friends.search_results {
                if hit.id == receiver_id {
                    hit.is_requested = true;
                }
            }
            state.friends.loading = false;
        }
        Action::RequestAccepted {
            request_id,
            new_friend,
        } => {
            let friends = &mut state.friends;
            friends.pending.retain(|p| p.request.id != request_id);
            if !friends.friends.iter().any(|f| f.id == new_friend.id) {
                friends.friends.push(new_friend.clone());
            }
            for hit in &mut friends.search_results {
                if hit.id == new_friend.id {
                    hit.is_friend = true;
                }
            }
            friends.loading = false;
        }
        Action::RequestRejected { request_id } => {
            state.friends.pending.retain(|p| p.request.id != request_id);
            state.friends.loading = false;
        }
        Action::FriendRemoved { user_id } => {
            let friends = &mut state.friends;
            friends.friends.retain(|f| f.id != user_id);
            for hit in &mut friends.search_results {
                if hit.id == user_id {
                    hit.is_friend = false;
                    hit.is_requested = false;
                }
            }
            friends.loading = false;
        }
        Action::FriendsRejected(error) => {
            state.friends.loading = false;
            state.friends.error = Some(error);
        }
        Action::SearchPending { generation } => {
            let friends = &mut state.friends;
            friends.search_generation = friends.search_generation.max(generation);
            friends.searching = true;
            friends.error = None;
        }
        Action::SearchFulfilled { generation, hits } => {
            let friends = &mut state.friends;
            if generation < friends.search_generation {
                tracing::debug!(
                    "Dropping stale search result {} (latest {})",
                    generation,
                    friends.search_generation
                );
                return;
            }
            friends.search_results = hits;
            friends.searching = false;
        }
        Action::SearchRejected { generation, error } => {
            let friends = &mut state.friends;
            if generation < friends.search_generation {
                return;
            }
            friends.searching = false;
            friends.error = Some(error);
        }

        Action::RecommendationsPending => {
            state.recommendations.loading = true;
            state.recommendations.error = None;
        }
        Action::RecommendationsFulfilled(received) => {
            state.recommendations.received = received;
            state.recommendations.loading = false;
        }
        Action::RecommendationDeleted(id) => {
            state
                .recommendations
                .received
                .retain(|r| r.recommendation.id != id);
            state.recommendations.loading = false;
        }
        Action::RecommendationsRejected(error) => {
            state.recommendations.loading = false;
            state.recommendations.error = Some(error);
        }
    }
}

/// Owns the state and the search generation counter
#[derive(Debug, Default)]
pub struct Store {
    state: State,
    next_generation: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        reduce(&mut self.state, action);
    }

    /// Issue a new search generation and mark the search as pending
    pub fn begin_search(&mut self) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.dispatch(Action::SearchPending { generation });
        generation
    }
}
