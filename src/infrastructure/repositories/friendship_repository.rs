//! SeaORM implementation of FriendshipRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{DomainError, Friendship, FriendshipRepository, FriendshipStatus};
use crate::models::friendship::{ActiveModel, Column, Entity as FriendshipEntity};

pub struct SeaOrmFriendshipRepository {
    db: DatabaseConnection,
}

impl SeaOrmFriendshipRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FriendshipRepository for SeaOrmFriendshipRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Friendship>, DomainError> {
        Ok(FriendshipEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Friendship::from))
    }

    async fn find_between(&self, a: i32, b: i32) -> Result<Option<Friendship>, DomainError> {
        let pair = Condition::any()
            .add(
                Condition::all()
                    .add(Column::SenderId.eq(a))
                    .add(Column::ReceiverId.eq(b)),
            )
            .add(
                Condition::all()
                    .add(Column::SenderId.eq(b))
                    .add(Column::ReceiverId.eq(a)),
            );

        Ok(FriendshipEntity::find()
            .filter(pair)
            .one(&self.db)
            .await?
            .map(Friendship::from))
    }

    async fn find_involving(
        &self,
        user_id: i32,
        status: Option<FriendshipStatus>,
    ) -> Result<Vec<Friendship>, DomainError> {
        let mut query = FriendshipEntity::find().filter(
            Condition::any()
                .add(Column::SenderId.eq(user_id))
                .add(Column::ReceiverId.eq(user_id)),
        );

        if let Some(status) = status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let rows = query.order_by_asc(Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(Friendship::from).collect())
    }

    async fn find_pending_for(&self, receiver_id: i32) -> Result<Vec<Friendship>, DomainError> {
        let rows = FriendshipEntity::find()
            .filter(Column::ReceiverId.eq(receiver_id))
            .filter(Column::Status.eq(FriendshipStatus::Pending.as_str()))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Friendship::from).collect())
    }

    async fn create(&self, sender_id: i32, receiver_id: i32) -> Result<Friendship, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let row = ActiveModel {
            sender_id: Set(sender_id),
            receiver_id: Set(receiver_id),
            status: Set(FriendshipStatus::Pending.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = row.insert(&self.db).await?;
        Ok(Friendship::from(result))
    }

    async fn update_status(
        &self,
        id: i32,
        status: FriendshipStatus,
    ) -> Result<Friendship, DomainError> {
        let existing = FriendshipEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Friendship"))?;

        let mut active: ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(Friendship::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = FriendshipEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Friendship"));
        }

        Ok(())
    }
}
