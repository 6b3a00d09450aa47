use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::domain::{DomainError, FriendshipStatus, ReadingStatus, category_key};
use crate::infrastructure::auth::hash_password;
use crate::models::{book, category, friendship, user};

/// Cover path used by seeded books; the file itself is not shipped
const DEMO_COVER: &str = "/uploads/demo-cover.jpg";

const DEMO_USERS: [(&str, &str, &str); 2] = [
    ("alice@shelfmate.test", "alice", "alice"),
    ("bob@shelfmate.test", "bob", "bob"),
];

const DEMO_CATEGORIES: [&str; 4] = ["Fantasy", "Science Fiction", "Classic", "History"];

const DEMO_BOOKS: [(&str, &str, &str, ReadingStatus); 4] = [
    ("Dune", "Frank Herbert", "Science Fiction", ReadingStatus::Reading),
    ("The Hobbit", "J.R.R. Tolkien", "Fantasy", ReadingStatus::Finished),
    ("Foundation", "Isaac Asimov", "Science Fiction", ReadingStatus::Unread),
    ("The Histories", "Herodotus", "History", ReadingStatus::Unread),
];

/// Seed demo users, categories, books and one accepted friendship.
/// Safe to run on every start: existing rows are left alone.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DomainError> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Users
    let mut user_ids = Vec::new();
    for (email, username, password) in DEMO_USERS {
        let model = user::ActiveModel {
            email: Set(email.to_owned()),
            username: Set(username.to_owned()),
            password: Set(hash_password(password)?),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };

        user::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(db)
            .await?;

        let id = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?
            .map(|u| u.id)
            .ok_or_else(|| DomainError::Internal(format!("Seed user {} missing", email)))?;
        user_ids.push(id);
    }

    // 2. Categories
    for name in DEMO_CATEGORIES {
        let model = category::ActiveModel {
            name: Set(name.to_owned()),
            name_key: Set(category_key(name)),
            created_at: Set(now.clone()),
            ..Default::default()
        };
        category::Entity::insert(model)
            .on_conflict(
                OnConflict::column(category::Column::NameKey)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(db)
            .await?;
    }

    // 3. Books for the first demo user, only on an empty shelf
    let owner = user_ids[0];
    let shelf = book::Entity::find()
        .filter(book::Column::UserId.eq(owner))
        .count(db)
        .await?;
    if shelf == 0 {
        for (title, author, category, status) in DEMO_BOOKS {
            let model = book::ActiveModel {
                user_id: Set(owner),
                title: Set(title.to_owned()),
                author: Set(author.to_owned()),
                category: Set(Some(category.to_owned())),
                status: Set(status.as_str().to_owned()),
                cover_image: Set(DEMO_COVER.to_owned()),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            };
            book::Entity::insert(model).exec(db).await?;
        }
    }

    // 4. Accepted friendship between the two demo users
    let (a, b) = (user_ids[0], user_ids[1]);
    let linked = friendship::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(friendship::Column::SenderId.eq(a))
                        .add(friendship::Column::ReceiverId.eq(b)),
                )
                .add(
                    Condition::all()
                        .add(friendship::Column::SenderId.eq(b))
                        .add(friendship::Column::ReceiverId.eq(a)),
                ),
        )
        .count(db)
        .await?;
    if linked == 0 {
        let model = friendship::ActiveModel {
            sender_id: Set(a),
            receiver_id: Set(b),
            status: Set(FriendshipStatus::Accepted.as_str().to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        friendship::Entity::insert(model).exec(db).await?;
    }

    tracing::info!("Demo data ready: {} users", user_ids.len());
    Ok(())
}
