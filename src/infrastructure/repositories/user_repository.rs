//! SeaORM implementation of UserRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::contains_literal;
use crate::domain::{DomainError, NewUser, PublicUser, User, UserChanges, UserRepository};
use crate::models::user::{ActiveModel, Column, Entity as UserEntity};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        Ok(UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(User::from))
    }

    async fn find_public(&self, ids: &[i32]) -> Result<HashMap<i32, PublicUser>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = UserEntity::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;

        Ok(users
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    PublicUser {
                        id: u.id,
                        username: u.username,
                        photo_url: u.photo_url,
                    },
                )
            })
            .collect())
    }

    async fn search(&self, fragment: &str, exclude_id: i32) -> Result<Vec<User>, DomainError> {
        let users = UserEntity::find()
            .filter(contains_literal(Column::Username, fragment))
            .filter(Column::Id.ne(exclude_id))
            .order_by_asc(Column::Username)
            .all(&self.db)
            .await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn create(&self, input: NewUser) -> Result<User, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let user = ActiveModel {
            email: Set(input.email),
            username: Set(input.username),
            password: Set(input.password_hash),
            photo_url: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = user.insert(&self.db).await?;
        Ok(User::from(result))
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<User, DomainError> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;

        let mut active: ActiveModel = existing.into();
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(photo_url) = changes.photo_url {
            active.photo_url = Set(photo_url);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(User::from(result))
    }
}
