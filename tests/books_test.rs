mod common;

use axum::http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};

use common::{TestApp, cover_path, multipart_request, png_bytes, spawn_app};
use shelfmate::domain::{NewBook, ReadingStatus};
use shelfmate::models::{book_category_links, recommendation};

// Helper to insert a book straight through the repository
async fn insert_book(app: &TestApp, user_id: i32, title: &str, status: ReadingStatus) -> i32 {
    app.state
        .book_repo
        .create(NewBook {
            user_id,
            title: title.to_string(),
            author: "Seeded Author".to_string(),
            category: None,
            status,
            description: None,
            isbn: None,
            publisher: None,
            publication_place: None,
            pages: None,
            language: Some("English".to_string()),
            cover_image: format!("/uploads/{}.jpg", title.replace(' ', "-")),
        })
        .await
        .expect("Failed to insert book")
        .id
}

fn titles(body: &Value) -> Vec<String> {
    body["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_book_stores_jpeg_cover() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("owner").await;

    let user = user_id.to_string();
    let res = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[
                ("userId", user.as_str()),
                ("title", "Dune"),
                ("author", "Frank Herbert"),
                ("status", "reading"),
                ("pages", "412 pages"),
                ("categories", "Science Fiction, Classic"),
            ],
            Some(png_bytes(1200, 600)),
        ))
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["title"], "Dune");
    assert_eq!(res.body["status"], "reading");
    assert_eq!(res.body["pages"], 412);
    assert_eq!(res.body["categories"], json!(["Classic", "Science Fiction"]));

    let public = res.body["coverImage"].as_str().unwrap();
    assert!(public.starts_with("/uploads/") && public.ends_with(".jpg"));

    // Re-encoded as JPEG and downscaled to the configured width
    let stored = std::fs::read(cover_path(&app, public)).unwrap();
    assert_eq!(&stored[..2], &[0xFF, 0xD8]);
    let decoded = image::load_from_memory(&stored).unwrap();
    assert_eq!(decoded.width(), app.state.config.uploads.max_width);

    // Served back as a static file
    let served = app.get(public, None).await;
    assert_eq!(served.status, StatusCode::OK);

    // Categories were created on demand
    let categories = app.get("/api/categories", Some(&token)).await;
    assert_eq!(categories.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_book_without_cover_names_the_image() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("nocover").await;
    let user = user_id.to_string();

    let res = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[
                ("userId", user.as_str()),
                ("title", "Dune"),
                ("author", "Frank Herbert"),
                ("status", "unread"),
            ],
            None,
        ))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Cover image is required");
}

#[tokio::test]
async fn test_create_book_validation_order() {
    let app = spawn_app().await;
    let (_, token) = app.user("order").await;

    let missing_title = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[("author", "A"), ("status", "unread")],
            None,
        ))
        .await;
    assert_eq!(missing_title.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        missing_title.body["error"],
        "Title, author and status are required"
    );

    let missing_both = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[("title", "T"), ("author", "A"), ("status", "unread")],
            None,
        ))
        .await;
    assert_eq!(
        missing_both.body["error"],
        "User ID and cover image are required"
    );

    let missing_user = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[("title", "T"), ("author", "A"), ("status", "unread")],
            Some(png_bytes(4, 4)),
        ))
        .await;
    assert_eq!(missing_user.body["error"], "User ID is required");

    let bad_status = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[
                ("userId", "1"),
                ("title", "T"),
                ("author", "A"),
                ("status", "lost"),
            ],
            Some(png_bytes(4, 4)),
        ))
        .await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);

    let not_an_image = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[
                ("userId", "1"),
                ("title", "T"),
                ("author", "A"),
                ("status", "unread"),
            ],
            Some(b"plain text".to_vec()),
        ))
        .await;
    assert_eq!(not_an_image.status, StatusCode::BAD_REQUEST);

    // Nothing was written for the rejected uploads
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_list_books_paginates() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("pager").await;
    for i in 0..20 {
        insert_book(&app, user_id, &format!("Book {:02}", i), ReadingStatus::Unread).await;
    }

    let uri = format!("/api/books?userId={}&page=1&limit=15", user_id);
    let first = app.get(&uri, Some(&token)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["books"].as_array().unwrap().len(), 15);
    assert_eq!(first.body["totalBooks"], 20);
    assert_eq!(first.body["totalPages"], 2);
    assert_eq!(first.body["currentPage"], 1);

    // Ordered by title descending
    assert_eq!(titles(&first.body)[0], "Book 19");

    let uri = format!("/api/books?userId={}&page=2&limit=15", user_id);
    let second = app.get(&uri, Some(&token)).await;
    assert_eq!(titles(&second.body), vec!["Book 04", "Book 03", "Book 02", "Book 01", "Book 00"]);

    // Defaults: page 1, ten per page
    let uri = format!("/api/books?userId={}", user_id);
    let defaults = app.get(&uri, Some(&token)).await;
    assert_eq!(defaults.body["books"].as_array().unwrap().len(), 10);
    assert_eq!(defaults.body["totalPages"], 2);
}

#[tokio::test]
async fn test_list_books_requires_user_id() {
    let app = spawn_app().await;
    let (_, token) = app.user("anon").await;

    let res = app.get("/api/books", Some(&token)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "User ID is required");
}

#[tokio::test]
async fn test_list_books_filters_and_counts() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("filter").await;
    let (other_id, _) = app.user("other").await;

    insert_book(&app, user_id, "The Hobbit", ReadingStatus::Finished).await;
    insert_book(&app, user_id, "Dune", ReadingStatus::Reading).await;
    insert_book(&app, user_id, "Dune Messiah", ReadingStatus::Unread).await;
    insert_book(&app, other_id, "Dune Again", ReadingStatus::Reading).await;

    let uri = format!("/api/books?userId={}&query=dune", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(titles(&res.body), vec!["Dune Messiah", "Dune"]);
    assert_eq!(res.body["totalBooks"], 2);
    // Shelf counters ignore the filter
    assert_eq!(res.body["finishedBooks"], 1);
    assert_eq!(res.body["readingBooks"], 1);

    let uri = format!("/api/books?userId={}&status=finished", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(titles(&res.body), vec!["The Hobbit"]);

    let uri = format!("/api/books?userId={}&title=HOBBIT", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(res.body["totalBooks"], 1);
}

#[tokio::test]
async fn test_update_book_replaces_cover_and_keeps_other_fields() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("editor").await;
    let created = app.create_book(&token, user_id, "Old Title", "unread").await;
    let id = created["id"].as_i64().unwrap();
    let old_cover = cover_path(&app, created["coverImage"].as_str().unwrap());
    assert!(old_cover.exists());

    let res = app
        .send(multipart_request(
            "PUT",
            &format!("/api/books/{}", id),
            &token,
            &[("title", "New Title"), ("pages", "abc")],
            Some(png_bytes(6, 6)),
        ))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], "New Title");
    assert_eq!(res.body["author"], "Test Author");
    assert_eq!(res.body["status"], "unread");
    assert_eq!(res.body["pages"], Value::Null);

    let new_cover = cover_path(&app, res.body["coverImage"].as_str().unwrap());
    assert_ne!(new_cover, old_cover);
    assert!(new_cover.exists());
    assert!(!old_cover.exists());
}

#[tokio::test]
async fn test_update_missing_book_is_not_found() {
    let app = spawn_app().await;
    let (_, token) = app.user("ghost").await;

    let res = app
        .send(multipart_request(
            "PUT",
            "/api/books/999",
            &token,
            &[("title", "Nope")],
            None,
        ))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "Book not found");
}

#[tokio::test]
async fn test_delete_book_with_missing_cover_succeeds() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("deleter").await;
    let created = app.create_book(&token, user_id, "Short Lived", "unread").await;
    let id = created["id"].as_i64().unwrap();

    std::fs::remove_file(cover_path(&app, created["coverImage"].as_str().unwrap())).unwrap();

    let res = app.delete(&format!("/api/books/{}", id), Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get(&format!("/api/books/{}", id), Some(&token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.delete(&format!("/api/books/{}", id), Some(&token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_book_removes_cover_file() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("cleaner").await;
    let created = app.create_book(&token, user_id, "Gone", "finished").await;
    let cover = cover_path(&app, created["coverImage"].as_str().unwrap());

    let res = app
        .delete(&format!("/api/books/{}", created["id"]), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!cover.exists());
}

#[tokio::test]
async fn test_category_filter_matches_linked_categories() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("linker").await;
    let user = user_id.to_string();

    let res = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[
                ("userId", user.as_str()),
                ("title", "Foundation"),
                ("author", "Isaac Asimov"),
                ("status", "unread"),
                ("categories", "Space Opera"),
            ],
            Some(png_bytes(4, 4)),
        ))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    app.create_book(&token, user_id, "Unrelated", "unread").await;

    let uri = format!("/api/books?userId={}&category=opera", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(titles(&res.body), vec!["Foundation"]);
}

#[tokio::test]
async fn test_list_books_clamps_oversized_pages() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("bulk").await;
    for i in 0..120 {
        insert_book(&app, user_id, &format!("Bulk {:03}", i), ReadingStatus::Unread).await;
    }

    let uri = format!("/api/books?userId={}&limit=1000", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["books"].as_array().unwrap().len(), 100);
    assert_eq!(res.body["totalBooks"], 120);
    assert_eq!(res.body["totalPages"], 2);

    let uri = format!("/api/books?userId={}&limit=18446744073709551615", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["books"].as_array().unwrap().len(), 100);

    let uri = format!(
        "/api/books?userId={}&page=8589934592&limit=8589934592",
        user_id
    );
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["books"].as_array().unwrap().is_empty());
    assert_eq!(res.body["currentPage"], 8589934592u64);
    assert_eq!(res.body["totalPages"], 2);

    // Zero is treated as one
    let uri = format!("/api/books?userId={}&page=0&limit=0", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(res.body["books"].as_array().unwrap().len(), 1);
    assert_eq!(res.body["currentPage"], 1);
}

#[tokio::test]
async fn test_filters_match_wildcards_literally() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("literal").await;
    insert_book(&app, user_id, "100% Pure", ReadingStatus::Unread).await;
    insert_book(&app, user_id, "Plain", ReadingStatus::Unread).await;
    insert_book(&app, user_id, "snake_case", ReadingStatus::Unread).await;

    let uri = format!("/api/books?userId={}&query=%25", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(titles(&res.body), vec!["100% Pure"]);

    let uri = format!("/api/books?userId={}&query=100%25", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(titles(&res.body), vec!["100% Pure"]);

    let uri = format!("/api/books?userId={}&title=_", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(titles(&res.body), vec!["snake_case"]);

    let uri = format!("/api/books?userId={}&category=%25", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(res.body["totalBooks"], 0);
}

#[tokio::test]
async fn test_non_ascii_title_filter() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("accents").await;
    insert_book(&app, user_id, "Économie politique", ReadingStatus::Unread).await;
    insert_book(&app, user_id, "Economics", ReadingStatus::Unread).await;

    let uri = format!("/api/books?userId={}&title=%C3%89conomie", user_id);
    let res = app.get(&uri, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(titles(&res.body), vec!["Économie politique"]);
}

#[tokio::test]
async fn test_create_book_reuses_non_ascii_category() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("economist").await;
    let user = user_id.to_string();

    let res = app
        .post_json("/api/categories", Some(&token), json!({ "name": "économie" }))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &token,
            &[
                ("userId", user.as_str()),
                ("title", "Le Capital"),
                ("author", "Karl Marx"),
                ("status", "unread"),
                ("categories", "Économie, ÉCONOMIE"),
            ],
            Some(png_bytes(4, 4)),
        ))
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
    assert_eq!(res.body["categories"], json!(["économie"]));

    let categories = app.get("/api/categories", Some(&token)).await;
    assert_eq!(categories.body.as_array().unwrap().len(), 1);

    let uri = format!("/api/books?userId={}", user_id);
    let listed = app.get(&uri, Some(&token)).await;
    assert_eq!(listed.body["totalBooks"], 1);
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_update_book_with_category_replaces_cover() {
    let app = spawn_app().await;
    let (user_id, token) = app.user("recover").await;
    app.post_json("/api/categories", Some(&token), json!({ "name": "économie" }))
        .await;
    let created = app.create_book(&token, user_id, "Wealth of Nations", "unread").await;
    let id = created["id"].as_i64().unwrap();
    let old_cover = cover_path(&app, created["coverImage"].as_str().unwrap());

    let res = app
        .send(multipart_request(
            "PUT",
            &format!("/api/books/{}", id),
            &token,
            &[("categories", "Économie")],
            Some(png_bytes(6, 6)),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK, "update failed: {}", res.body);
    assert_eq!(res.body["categories"], json!(["économie"]));

    let new_cover = cover_path(&app, res.body["coverImage"].as_str().unwrap());
    assert!(new_cover.exists());
    assert!(!old_cover.exists());
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_delete_book_cascades_links_and_recommendations() {
    let app = spawn_app().await;
    let (alice, alice_token) = app.user("alice").await;
    let (bob, bob_token) = app.user("bob").await;
    let user = alice.to_string();

    let res = app
        .send(multipart_request(
            "POST",
            "/api/books",
            &alice_token,
            &[
                ("userId", user.as_str()),
                ("title", "Middlemarch"),
                ("author", "George Eliot"),
                ("status", "finished"),
                ("categories", "Classic, Realism"),
            ],
            Some(png_bytes(4, 4)),
        ))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let book_id = res.body["id"].as_i64().unwrap();

    let res = app
        .post_json(
            "/api/recomendation",
            Some(&alice_token),
            json!({ "bookId": book_id, "senderId": alice, "receiverId": bob }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let db = app.state.db();
    assert_eq!(book_category_links::Entity::find().count(db).await.unwrap(), 2);

    let res = app
        .delete(&format!("/api/books/{}", book_id), Some(&alice_token))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    assert_eq!(book_category_links::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(recommendation::Entity::find().count(db).await.unwrap(), 0);

    let received = app.get("/api/recomendation", Some(&bob_token)).await;
    assert!(received.body.as_array().unwrap().is_empty());

    // Categories themselves stay
    let categories = app.get("/api/categories", Some(&alice_token)).await;
    assert_eq!(categories.body.as_array().unwrap().len(), 2);
}
