//! Async operations over the client and the store.
//!
//! Each thunk dispatches a pending action, calls the API, then dispatches
//! the fulfilled or rejected action. Errors are recorded in the store and
//! also returned to the caller.

use crate::client::api::{ApiClient, BookDraft, BookQuery, ClientError};
use crate::client::store::{Action, Store};
use crate::services::friendship_service::RespondOutcome;

pub async fn login(
    client: &mut ApiClient,
    store: &mut Store,
    email: &str,
    password: &str,
) -> Result<(), ClientError> {
    store.dispatch(Action::AuthPending);
    match client.login(email, password).await {
        Ok(response) => {
            store.dispatch(Action::LoginFulfilled {
                token: response.token,
                user: response.user,
            });
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::AuthRejected(e.to_string()));
            Err(e)
        }
    }
}

pub async fn register(
    client: &ApiClient,
    store: &mut Store,
    email: &str,
    password: &str,
    username: &str,
) -> Result<(), ClientError> {
    store.dispatch(Action::AuthPending);
    match client.register(email, password, username).await {
        Ok(_) => {
            store.dispatch(Action::RegisterFulfilled);
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::AuthRejected(e.to_string()));
            Err(e)
        }
    }
}

/// Local state is cleared even if the server call fails
pub async fn logout(client: &mut ApiClient, store: &mut Store) -> Result<(), ClientError> {
    let result = client.logout().await;
    client.set_token(None);
    store.dispatch(Action::LoggedOut);
    result
}

pub async fn fetch_books(
    client: &ApiClient,
    store: &mut Store,
    query: BookQuery,
) -> Result<(), ClientError> {
    store.dispatch(Action::BooksPending);
    match client.list_books(&query).await {
        Ok(listing) => {
            store.dispatch(Action::BooksFulfilled {
                filters: query,
                listing,
            });
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::BooksRejected(e.to_string()));
            Err(e)
        }
    }
}

pub async fn create_book(
    client: &ApiClient,
    store: &mut Store,
    draft: BookDraft,
) -> Result<i32, ClientError> {
    store.dispatch(Action::BooksPending);
    match client.create_book(draft).await {
        Ok(book) => {
            let id = book.id;
            store.dispatch(Action::BookSaved(book));
            Ok(id)
        }
        Err(e) => {
            store.dispatch(Action::BooksRejected(e.to_string()));
            Err(e)
        }
    }
}

pub async fn update_book(
    client: &ApiClient,
    store: &mut Store,
    id: i32,
    draft: BookDraft,
) -> Result<(), ClientError> {
    store.dispatch(Action::BooksPending);
    match client.update_book(id, draft).await {
        Ok(book) => {
            store.dispatch(Action::BookSaved(book));
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::BooksRejected(e.to_string()));
            Err(e)
        }
    }
}

pub async fn delete_book(client: &ApiClient, store: &mut Store, id: i32) -> Result<(), ClientError> {
    store.dispatch(Action::BooksPending);
    match client.delete_book(id).await {
        Ok(()) => {
            store.dispatch(Action::BookDeleted(id));
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::BooksRejected(e.to_string()));
            Err(e)
        }
    }
}

pub async fn fetch_categories(client: &ApiClient, store: &mut Store) -> Result<(), ClientError> {
    store.dispatch(Action::CategoriesPending);
    match client.list_categories().await {
        Ok(items) => {
            store.dispatch(Action::CategoriesFulfilled(items));
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::CategoriesRejected(e.to_string()));
            Err(e)
        }
    }
}

pub async fn create_category(
    client: &ApiClient,
    store: &mut Store,
    name: &str,
) -> Result<(), ClientError> {
    store.dispatch(Action::CategoriesPending);
    match client.create_category(name).await {
        Ok(category) => {
            store.dispatch(Action::CategoryCreated(category));
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::CategoriesRejected(e.to_string()));
            Err(e)
        }
    }
}

/// Friends and pending requests in one go
pub async fn fetch_friends(
    client: &ApiClient,
    store: &mut Store,
    user_id: i32,
) -> Result<(), ClientError> {
    store.dispatch(Action::FriendsPending);
    let result = async {
        let friends = client.list_friends(user_id).await?;
        let pending = client.list_pending(user_id).await?;
        Ok::<_, ClientError>((friends, pending))
    }
    .await;

    match result {
        Ok((friends, pending)) => {
            store.dispatch(Action::FriendsFulfilled(friends));
            store.dispatch(Action::PendingFulfilled(pending));
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::FriendsRejected(e.to_string()));
            Err(e)
        }
    }
}

pub async fn send_friend_request(
    client: &ApiClient,
    store: &mut Store,
    sender_id: i32,
    receiver_id: i32,
) -> Result<(), ClientError> {
    store.dispatch(Action::FriendsPending);
    match client.send_friend_request(sender_id, receiver_id).await {
        Ok(_) => {
            store.dispatch(Action::RequestSent { receiver_id });
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::FriendsRejected(e.to_string()));
            Err(e)
        }
    }
}

/// `action` is `accepted` or `rejected`
pub async fn respond_to_request(
    client: &ApiClient,
    store: &mut Store,
    request_id: i32,
    action: &str,
) -> Result<(), ClientError> {
    store.dispatch(Action::FriendsPending);
    match client.respond_to_request(request_id, action).await {
        Ok(RespondOutcome::Accepted {
            request_id,
            new_friend,
        }) => {
            store.dispatch(Action::RequestAccepted {
                request_id,
                new_friend,
            });
            Ok(())
        }
        Ok(RespondOutcome::Rejected { request_id }) => {
            store.dispatch(Action::RequestRejected { request_id });
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::FriendsRejected(e.to_string()));
            Err(e)
        }
    }
}

/// Delete the friendship row linking `user_id` and `friend_id`
pub async fn remove_friend(
    client: &ApiClient,
    store: &mut Store,
    user_id: i32,
    friend_id: i32,
) -> Result<(), ClientError> {
    store.dispatch(Action::FriendsPending);
    let result = async {
        let rows = client.list_friendships(user_id).await?;
        if let Some(row) = rows.iter().find(|r| r.counterpart(user_id) == friend_id) {
            client.delete_friendship(row.id).await?;
        }
        Ok::<_, ClientError>(())
    }
    .await;

    match result {
        Ok(()) => {
            store.dispatch(Action::FriendRemoved { user_id: friend_id });
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::FriendsRejected(e.to_string()));
            Err(e)
        }
    }
}

/// Responses from searches issued before a newer one are ignored by the store
pub async fn search_users(
    client: &ApiClient,
    store: &mut Store,
    query: &str,
    user_id: i32,
) -> Result<(), ClientError> {
    let generation = store.begin_search();
    match client.search_users(query, user_id).await {
        Ok(hits) => {
            store.dispatch(Action::SearchFulfilled { generation, hits });
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::SearchRejected {
                generation,
                error: e.to_string(),
            });
            Err(e)
        }
    }
}

pub async fn fetch_recommendations(
    client: &ApiClient,
    store: &mut Store,
    user_id: i32,
) -> Result<(), ClientError> {
    store.dispatch(Action::RecommendationsPending);
    match client.list_recommendations(user_id).await {
        Ok(received) => {
            store.dispatch(Action::RecommendationsFulfilled(received));
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::RecommendationsRejected(e.to_string()));
            Err(e)
        }
    }
}

pub async fn delete_recommendation(
    client: &ApiClient,
    store: &mut Store,
    id: i32,
) -> Result<(), ClientError> {
    store.dispatch(Action::RecommendationsPending);
    match client.delete_recommendation(id).await {
        Ok(()) => {
            store.dispatch(Action::RecommendationDeleted(id));
            Ok(())
        }
        Err(e) => {
            store.dispatch(Action::RecommendationsRejected(e.to_string()));
            Err(e)
        }
    }
}
