//! SeaORM implementation of CategoryRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

use crate::domain::{Category, CategoryRepository, DomainError, category_key};
use crate::models::book_category_links;
use crate::models::category::{ActiveModel, Column, Entity as CategoryEntity};

pub struct SeaOrmCategoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_all(&self) -> Result<Vec<Category>, DomainError> {
        let categories = CategoryEntity::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await?;
        Ok(categories.into_iter().map(Category::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
        let category = CategoryEntity::find()
            .filter(Column::NameKey.eq(category_key(name)))
            .one(&self.db)
            .await?;
        Ok(category.map(Category::from))
    }

    async fn create(&self, name: &str) -> Result<Category, DomainError> {
        let name = name.trim();
        let category = ActiveModel {
            name: Set(name.to_string()),
            name_key: Set(category_key(name)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        match category.insert(&self.db).await {
            Ok(result) => Ok(Category::from(result)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                DomainError::Conflict(format!("Category '{}' already exists", name)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_links(&self, book_id: i32, category_ids: &[i32]) -> Result<(), DomainError> {
        book_category_links::Entity::delete_many()
            .filter(book_category_links::Column::BookId.eq(book_id))
            .exec(&self.db)
            .await?;

        if category_ids.is_empty() {
            return Ok(());
        }

        let mut ids = category_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let links = ids.into_iter().map(|category_id| book_category_links::ActiveModel {
            book_id: Set(book_id),
            category_id: Set(category_id),
        });
        book_category_links::Entity::insert_many(links)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
