//! SeaORM implementation of BookRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::{
    BookChanges, BookFilter, BookRepository, DomainError, NewBook, PaginatedBooks, ReadingStatus,
};
use crate::models::book::{self, ActiveModel, Column, Entity as BookEntity};
use crate::infrastructure::repositories::contains_literal;
use crate::models::{Book, book_category_links, category};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Ids of books linked to a category whose name contains `fragment`
    async fn linked_book_ids(&self, fragment: &str) -> Result<Vec<i32>, DomainError> {
        let category_ids: Vec<i32> = category::Entity::find()
            .filter(contains_literal(category::Column::Name, fragment))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let links = book_category_links::Entity::find()
            .filter(book_category_links::Column::CategoryId.is_in(category_ids))
            .all(&self.db)
            .await?;

        Ok(links.into_iter().map(|l| l.book_id).collect())
    }

    /// Convert models to DTOs with their relational category names
    async fn with_categories(&self, models: Vec<book::Model>) -> Result<Vec<Book>, DomainError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let links = book_category_links::Entity::find()
            .filter(book_category_links::Column::BookId.is_in(ids))
            .find_also_related(category::Entity)
            .all(&self.db)
            .await?;

        let mut names: HashMap<i32, Vec<String>> = HashMap::new();
        for (link, category) in links {
            if let Some(category) = category {
                names.entry(link.book_id).or_default().push(category.name);
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let id = model.id;
                let mut dto = Book::from(model);
                if let Some(mut categories) = names.remove(&id) {
                    categories.sort();
                    dto.categories = categories;
                }
                dto
            })
            .collect())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_page(&self, filter: &BookFilter) -> Result<PaginatedBooks, DomainError> {
        let mut condition = Condition::all().add(Column::UserId.eq(filter.user_id));

        // SQLite LIKE is case-insensitive for ASCII only
        let substring_filters = [
            (Column::Isbn, &filter.isbn),
            (Column::Publisher, &filter.publisher),
            (Column::PublicationPlace, &filter.publication_place),
            (Column::Status, &filter.status),
            (Column::Title, &filter.title),
            (Column::Language, &filter.language),
        ];
        for (column, value) in substring_filters {
            if let Some(value) = non_empty(value) {
                condition = condition.add(contains_literal(column, value));
            }
        }

        if let Some(category) = non_empty(&filter.category) {
            let linked = self.linked_book_ids(category).await?;
            condition = condition.add(
                Condition::any()
                    .add(contains_literal(Column::Category, category))
                    .add(Column::Id.is_in(linked)),
            );
        }

        if let Some(q) = non_empty(&filter.query) {
            condition = condition.add(
                Condition::any()
                    .add(contains_literal(Column::Title, q))
                    .add(contains_literal(Column::Author, q))
                    .add(contains_literal(Column::Category, q))
                    .add(contains_literal(Column::Isbn, q))
                    .add(contains_literal(Column::Language, q)),
            );
        }

        let query = BookEntity::find().filter(condition);
        let total = query.clone().count(&self.db).await?;

        let limit = filter.page_size();
        let skip = filter.offset();
        tracing::debug!(
            "Listing books for user {}: skip={} limit={} total={}",
            filter.user_id,
            skip,
            limit,
            total
        );

        let models = query
            .order_by_desc(Column::Title)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(PaginatedBooks {
            books: self.with_categories(models).await?,
            total,
        })
    }

    async fn count_by_status(
        &self,
        user_id: i32,
        status: ReadingStatus,
    ) -> Result<u64, DomainError> {
        let count = BookEntity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        match BookEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(self.with_categories(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create(&self, input: NewBook) -> Result<Book, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_book = ActiveModel {
            user_id: Set(input.user_id),
            title: Set(input.title),
            author: Set(input.author),
            category: Set(input.category),
            status: Set(input.status.as_str().to_string()),
            description: Set(input.description),
            isbn: Set(input.isbn),
            publisher: Set(input.publisher),
            publication_place: Set(input.publication_place),
            pages: Set(input.pages),
            language: Set(input.language),
            cover_image: Set(input.cover_image),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_book.insert(&self.db).await?;
        Ok(Book::from(result))
    }

    async fn update(&self, id: i32, changes: BookChanges) -> Result<Book, DomainError> {
        let existing = BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Book"))?;

        let mut active: ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(author) = changes.author {
            active.author = Set(author);
        }
        if let Some(category) = changes.category {
            active.category = Set(Some(category));
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(isbn) = changes.isbn {
            active.isbn = Set(Some(isbn));
        }
        if let Some(publisher) = changes.publisher {
            active.publisher = Set(Some(publisher));
        }
        if let Some(place) = changes.publication_place {
            active.publication_place = Set(Some(place));
        }
        if let Some(pages) = changes.pages {
            active.pages = Set(pages);
        }
        if let Some(language) = changes.language {
            active.language = Set(Some(language));
        }
        if let Some(cover_image) = changes.cover_image {
            active.cover_image = Set(cover_image);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        self.with_categories(vec![result])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("updated book vanished".to_string()))
    }

    /// Category links and recommendations go with the row (`ON DELETE CASCADE`)
    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = BookEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Book"));
        }

        Ok(())
    }
}
