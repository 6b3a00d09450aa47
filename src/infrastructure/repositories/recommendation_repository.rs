//! SeaORM implementation of RecommendationRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{DomainError, NewRecommendation, Recommendation, RecommendationRepository};
use crate::models::recommendation::{ActiveModel, Column, Entity as RecommendationEntity};

pub struct SeaOrmRecommendationRepository {
    db: DatabaseConnection,
}

impl SeaOrmRecommendationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecommendationRepository for SeaOrmRecommendationRepository {
    async fn create(&self, input: NewRecommendation) -> Result<Recommendation, DomainError> {
        let row = ActiveModel {
            book_id: Set(input.book_id),
            sender_id: Set(input.sender_id),
            receiver_id: Set(input.receiver_id),
            message: Set(input.message),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = row.insert(&self.db).await?;
        Ok(Recommendation::from(result))
    }

    async fn find_received(&self, receiver_id: i32) -> Result<Vec<Recommendation>, DomainError> {
        let rows = RecommendationEntity::find()
            .filter(Column::ReceiverId.eq(receiver_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Recommendation::from).collect())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = RecommendationEntity::delete_by_id(id)
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Recommendation"));
        }

        Ok(())
    }
}
