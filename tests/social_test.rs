mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::spawn_app;
use shelfmate::seed::seed_demo_data;

#[tokio::test]
async fn test_user_profile_is_public() {
    let app = spawn_app().await;
    let (id, token) = app.user("profile").await;

    let res = app.get(&format!("/api/user/{}", id), Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["username"], "profile");
    assert!(res.body.get("email").is_none());
    assert!(res.body.get("password").is_none());

    let res = app.get("/api/user/9999", Some(&token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "User not found");
}

#[tokio::test]
async fn test_update_profile() {
    let app = spawn_app().await;
    let (id, token) = app.user("editor").await;
    app.user("taken").await;

    let res = app
        .put_json(
            &format!("/api/user/{}", id),
            Some(&token),
            json!({ "username": "renamed", "photo_url": "/uploads/me.jpg" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["username"], "renamed");
    assert_eq!(res.body["photo_url"], "/uploads/me.jpg");

    // Missing photo_url leaves it alone
    let res = app
        .put_json(
            &format!("/api/user/{}", id),
            Some(&token),
            json!({ "email": "NEW@test.dev" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["photo_url"], "/uploads/me.jpg");

    // The new email is stored lowercased and works for login
    app.login("new@test.dev", "password").await;

    let res = app
        .put_json(
            &format!("/api/user/{}", id),
            Some(&token),
            json!({ "email": "taken@test.dev" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Email already in use");

    let res = app
        .put_json(
            &format!("/api/user/{}", id),
            Some(&token),
            json!({ "username": "   " }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_search_returns_nothing() {
    let app = spawn_app().await;
    let (_, token) = app.user("lonely").await;
    app.user("someone").await;

    let res = app.get("/api/user/search?query=", Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_categories() {
    let app = spawn_app().await;
    let (_, token) = app.user("librarian").await;

    let res = app
        .post_json("/api/categories", Some(&token), json!({ "name": "  Poetry " }))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["name"], "Poetry");

    let res = app
        .post_json("/api/categories", Some(&token), json!({ "name": "poetry" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post_json("/api/categories", Some(&token), json!({ "name": "" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Category name is required");

    app.post_json("/api/categories", Some(&token), json!({ "name": "Drama" }))
        .await;

    let res = app.get("/api/categories", Some(&token)).await;
    let names: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Drama", "Poetry"]);
}

#[tokio::test]
async fn test_categories_fold_non_ascii_case() {
    let app = spawn_app().await;
    let (_, token) = app.user("cataloguer").await;

    let res = app
        .post_json("/api/categories", Some(&token), json!({ "name": "Économie" }))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    for duplicate in ["Économie", "ÉCONOMIE", " économie "] {
        let res = app
            .post_json("/api/categories", Some(&token), json!({ "name": duplicate }))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{} was accepted", duplicate);
    }

    let res = app.get("/api/categories", Some(&token)).await;
    let categories = res.body.as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["name"], "Économie");
}

#[tokio::test]
async fn test_user_search_matches_literally() {
    let app = spawn_app().await;
    let (_, token) = app.user("searcher").await;
    app.user("someone").await;
    app.register("zoe@test.dev", "zoë", "password").await;

    let res = app.get("/api/user/search?query=%25", Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.as_array().unwrap().is_empty());

    let res = app.get("/api/user/search?query=_", Some(&token)).await;
    assert!(res.body.as_array().unwrap().is_empty());

    let res = app.get("/api/user/search?query=zo%C3%AB", Some(&token)).await;
    let hits = res.body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["username"], "zoë");
}

#[tokio::test]
async fn test_recommendations() {
    let app = spawn_app().await;
    let (alice, alice_token) = app.user("alice").await;
    let (bob, bob_token) = app.user("bob").await;
    let book = app.create_book(&alice_token, alice, "Dune", "finished").await;
    let book_id = book["id"].as_i64().unwrap();

    let res = app
        .post_json(
            "/api/recomendation",
            Some(&alice_token),
            json!({ "bookId": 4242, "senderId": alice, "receiverId": bob }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "Book not found");

    let res = app
        .post_json(
            "/api/recomendation",
            Some(&alice_token),
            json!({ "bookId": book_id, "senderId": alice }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post_json(
            "/api/recomendation",
            Some(&alice_token),
            json!({
                "bookId": book_id,
                "senderId": alice,
                "receiverId": bob,
                "message": "  You will love it  "
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["message"], "You will love it");
    let id = res.body["id"].as_i64().unwrap();

    let res = app.get("/api/recomendation", Some(&bob_token)).await;
    assert_eq!(res.status, StatusCode::OK);
    let received = res.body.as_array().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["book"]["title"], "Dune");
    assert_eq!(received[0]["sender"]["username"], "alice");

    // Nothing was sent to alice
    let res = app
        .get(&format!("/api/recomendation?userId={}", alice), Some(&bob_token))
        .await;
    assert!(res.body.as_array().unwrap().is_empty());

    let res = app
        .delete(&format!("/api/recomendation?id={}", id), Some(&bob_token))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .delete(&format!("/api/recomendation?id={}", id), Some(&bob_token))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let app = spawn_app().await;

    seed_demo_data(app.state.db()).await.unwrap();
    seed_demo_data(app.state.db()).await.unwrap();

    let token = app.login("alice@shelfmate.test", "alice").await;
    let alice = shelfmate::auth::decode_jwt(&app.state.config.jwt, &token)
        .unwrap()
        .user_id;

    let books = app
        .get(&format!("/api/books?userId={}", alice), Some(&token))
        .await;
    assert_eq!(books.body["totalBooks"], 4);

    let categories = app.get("/api/categories", Some(&token)).await;
    assert_eq!(categories.body.as_array().unwrap().len(), 4);

    let friends = app.get("/api/friend/list", Some(&token)).await;
    let friends = friends.body.as_array().unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0]["username"], "bob");
}
