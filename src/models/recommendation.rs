use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::Recommendation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recommendations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub message: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_delete = "Cascade"
    )]
    Book,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Recommendation {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            book_id: model.book_id,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            message: model.message,
            created_at: model.created_at,
        }
    }
}
