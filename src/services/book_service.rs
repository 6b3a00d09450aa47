//! Book Service - Pure business logic without HTTP layer
//!
//! Book rows and their cover files are written in two independent steps.
//! A crash between them can leave an orphaned file or a row pointing at a
//! missing file; readers must tolerate both.

use serde::{Deserialize, Serialize};

use crate::domain::{BookChanges, BookFilter, DomainError, NewBook, ReadingStatus};
use crate::infrastructure::AppState;
use crate::infrastructure::storage::Upload;
use crate::models::Book;
use crate::services::category_service;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Raw book fields as received from a multipart form
#[derive(Debug, Default, Clone)]
pub struct BookForm {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub categories: Option<Vec<String>>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub pages: Option<String>,
    pub language: Option<String>,
    pub cover_image: Option<Upload>,
}

/// Listing query; everything optional as it comes from the query string
#[derive(Debug, Default, Clone)]
pub struct ListBooksQuery {
    pub user_id: Option<i32>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_place: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListing {
    pub books: Vec<Book>,
    pub total_books: u64,
    pub finished_books: u64,
    pub reading_books: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Base-10 parse of the leading digits, like a lenient form parser.
/// Anything without leading digits becomes `None`.
pub fn parse_pages(raw: &str) -> Option<i32> {
    let s = raw.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i32>().ok().map(|n| sign * n)
}

pub fn total_pages(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1))
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// List one page of a user's books with shelf counters
pub async fn list_books(state: &AppState, query: ListBooksQuery) -> Result<BookListing, DomainError> {
    let user_id = query
        .user_id
        .ok_or_else(|| DomainError::validation("User ID is required"))?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    tracing::info!(
        "List books - user={} page={} limit={} status={:?} query={:?}",
        user_id,
        page,
        limit,
        query.status,
        query.query
    );

    let filter = BookFilter {
        user_id,
        page,
        limit,
        category: query.category,
        isbn: query.isbn,
        publisher: query.publisher,
        publication_place: query.publication_place,
        status: query.status,
        title: query.title,
        language: query.language,
        query: query.query,
    };

    let result = state.book_repo.find_page(&filter).await?;
    let finished_books = state
        .book_repo
        .count_by_status(user_id, ReadingStatus::Finished)
        .await?;
    let reading_books = state
        .book_repo
        .count_by_status(user_id, ReadingStatus::Reading)
        .await?;

    Ok(BookListing {
        total_pages: total_pages(result.total, limit),
        books: result.books,
        total_books: result.total,
        finished_books,
        reading_books,
        current_page: page,
    })
}

pub async fn get_book(state: &AppState, id: i32) -> Result<Book, DomainError> {
    state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))
}

/// Validate the form in the order the client reports missing fields
fn validate_new_book(form: &BookForm) -> Result<(i32, ReadingStatus), DomainError> {
    if present(&form.title).is_none()
        || present(&form.author).is_none()
        || present(&form.status).is_none()
    {
        return Err(DomainError::validation(
            "Title, author and status are required",
        ));
    }

    let user_id = present(&form.user_id);
    match (user_id.is_none(), form.cover_image.is_none()) {
        (true, true) => {
            return Err(DomainError::validation(
                "User ID and cover image are required",
            ));
        }
        (true, false) => return Err(DomainError::validation("User ID is required")),
        (false, true) => return Err(DomainError::validation("Cover image is required")),
        (false, false) => {}
    }

    let user_id = user_id
        .and_then(|id| id.parse::<i32>().ok())
        .ok_or_else(|| DomainError::validation("User ID must be a number"))?;
    let status = form.status.as_deref().unwrap_or_default().parse()?;

    Ok((user_id, status))
}

pub async fn create_book(state: &AppState, form: BookForm) -> Result<Book, DomainError> {
    let (user_id, status) = validate_new_book(&form)?;

    if state.user_repo.find_by_id(user_id).await?.is_none() {
        return Err(DomainError::not_found("User"));
    }

    let BookForm {
        title,
        author,
        category,
        categories,
        description,
        isbn,
        publisher,
        publication_place,
        pages,
        language,
        cover_image,
        ..
    } = form;

    let Some(upload) = cover_image else {
        return Err(DomainError::validation("Cover image is required"));
    };

    let cover_path = state.covers.save(upload).await?;

    // Resolved before the row exists so a failure leaves no book behind
    let category_ids = match resolve_category_ids(state, categories.as_deref()).await {
        Ok(ids) => ids,
        Err(e) => {
            state.covers.remove(&cover_path).await;
            return Err(e);
        }
    };

    let input = NewBook {
        user_id,
        title: title.unwrap_or_default().trim().to_string(),
        author: author.unwrap_or_default().trim().to_string(),
        category,
        status,
        description,
        isbn,
        publisher,
        publication_place,
        pages: pages.as_deref().and_then(parse_pages),
        language,
        cover_image: cover_path.clone(),
    };

    let book = match state.book_repo.create(input).await {
        Ok(book) => book,
        Err(e) => {
            state.covers.remove(&cover_path).await;
            return Err(e);
        }
    };

    if let Some(ids) = category_ids
        && let Err(e) = state.category_repo.replace_links(book.id, &ids).await
    {
        tracing::warn!("Linking categories to book {} failed, rolling back: {}", book.id, e);
        if let Err(cleanup) = state.book_repo.delete(book.id).await {
            tracing::warn!("Failed to roll back book {}: {}", book.id, cleanup);
        }
        state.covers.remove(&cover_path).await;
        return Err(e);
    }

    tracing::info!("Created book {} for user {}", book.id, user_id);
    get_book(state, book.id).await
}

async fn resolve_category_ids(
    state: &AppState,
    names: Option<&[String]>,
) -> Result<Option<Vec<i32>>, DomainError> {
    let Some(names) = names else {
        return Ok(None);
    };
    let resolved = category_service::ensure_categories(state, names).await?;
    Ok(Some(resolved.iter().map(|c| c.id).collect()))
}

pub async fn update_book(state: &AppState, id: i32, form: BookForm) -> Result<Book, DomainError> {
    let existing = get_book(state, id).await?;

    let status = match present(&form.status) {
        Some(raw) => Some(raw.parse::<ReadingStatus>()?),
        None => None,
    };

    let new_cover = match form.cover_image {
        Some(upload) => Some(state.covers.save(upload).await?),
        None => None,
    };

    let category_ids = match resolve_category_ids(state, form.categories.as_deref()).await {
        Ok(ids) => ids,
        Err(e) => {
            if let Some(path) = &new_cover {
                state.covers.remove(path).await;
            }
            return Err(e);
        }
    };

    let changes = BookChanges {
        title: present(&form.title),
        author: present(&form.author),
        category: form.category,
        status,
        description: form.description,
        isbn: form.isbn,
        publisher: form.publisher,
        publication_place: form.publication_place,
        pages: form.pages.as_deref().map(parse_pages),
        language: form.language,
        cover_image: new_cover.clone(),
    };

    if let Err(e) = state.book_repo.update(id, changes).await {
        if let Some(path) = &new_cover {
            state.covers.remove(path).await;
        }
        return Err(e);
    }

    // The row now points at the new cover; the old file is unreachable
    if new_cover.is_some() {
        state.covers.remove(&existing.cover_image).await;
    }

    if let Some(ids) = category_ids {
        state.category_repo.replace_links(id, &ids).await?;
    }

    tracing::info!("Updated book {}", id);
    get_book(state, id).await
}

pub async fn delete_book(state: &AppState, id: i32) -> Result<(), DomainError> {
    let existing = get_book(state, id).await?;

    state.book_repo.delete(id).await?;
    state.covers.remove(&existing.cover_image).await;

    tracing::info!("Deleted book {}", id);
    Ok(())
}
