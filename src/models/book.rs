use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub author: String,
    pub category: Option<String>, // legacy free text
    #[sea_orm(default_value = "unread")]
    pub status: String,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub cover_image: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_category_links::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_category_links::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub title: String,
    pub author: String,
    pub category: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub status: String,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    #[serde(rename = "coverImage")]
    pub cover_image: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            author: model.author,
            category: model.category,
            categories: Vec::new(), // filled from book_category_links by the repository
            status: model.status,
            description: model.description,
            isbn: model.isbn,
            publisher: model.publisher,
            publication_place: model.publication_place,
            pages: model.pages,
            language: model.language,
            cover_image: model.cover_image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
