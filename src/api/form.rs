use axum::extract::Multipart;

use crate::api::error::ApiError;
use crate::infrastructure::storage::Upload;
use crate::services::book_service::BookForm;

/// Multipart field carrying the cover file
pub const COVER_FIELD: &str = "coverImage";

/// Collect a book multipart form. Unknown fields are ignored; an empty
/// file part counts as no file.
pub async fn read_book_form(mut multipart: Multipart) -> Result<BookForm, ApiError> {
    let mut form = BookForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == COVER_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read cover image: {}", e)))?;
            if !bytes.is_empty() {
                form.cover_image = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid field '{}': {}", name, e)))?;

        match name.as_str() {
            "userId" | "user_id" => form.user_id = Some(value),
            "title" => form.title = Some(value),
            "author" => form.author = Some(value),
            "category" => form.category = Some(value),
            "categories" | "categories[]" => form
                .categories
                .get_or_insert_with(Vec::new)
                .extend(split_categories(&value)),
            "status" => form.status = Some(value),
            "description" => form.description = Some(value),
            "isbn" => form.isbn = Some(value),
            "publisher" => form.publisher = Some(value),
            "publication_place" | "publicationPlace" => form.publication_place = Some(value),
            "pages" => form.pages = Some(value),
            "language" => form.language = Some(value),
            other => tracing::debug!("Ignoring unknown book field '{}'", other),
        }
    }

    Ok(form)
}

/// Categories arrive either as repeated fields or one comma-separated value
pub fn split_categories(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_categories_are_split_and_trimmed() {
        let names: Vec<String> = split_categories(" Fantasy, ,Sci-Fi ,").collect();
        assert_eq!(names, vec!["Fantasy".to_string(), "Sci-Fi".to_string()]);
    }
}
