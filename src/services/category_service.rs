//! Category Service - list, create and create-on-demand

use crate::domain::{Category, DomainError};
use crate::infrastructure::AppState;

pub async fn list_categories(state: &AppState) -> Result<Vec<Category>, DomainError> {
    state.category_repo.find_all().await
}

pub async fn create_category(state: &AppState, name: &str) -> Result<Category, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Category name is required"));
    }

    if state.category_repo.find_by_name(name).await?.is_some() {
        return Err(DomainError::Conflict(format!(
            "Category '{}' already exists",
            name
        )));
    }

    let category = state.category_repo.create(name).await?;
    tracing::info!("Created category {} ({})", category.id, category.name);
    Ok(category)
}

/// Resolve names to categories, creating the missing ones.
/// Blank names are skipped and case-insensitive duplicates collapse.
pub async fn ensure_categories(
    state: &AppState,
    names: &[String],
) -> Result<Vec<Category>, DomainError> {
    let mut resolved: Vec<Category> = Vec::new();

    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let category = match state.category_repo.find_by_name(name).await? {
            Some(existing) => existing,
            None => {
                tracing::debug!("Creating category on demand: {}", name);
                match state.category_repo.create(name).await {
                    Ok(created) => created,
                    // Created concurrently since the lookup
                    Err(DomainError::Conflict(_)) => state
                        .category_repo
                        .find_by_name(name)
                        .await?
                        .ok_or_else(|| DomainError::Internal(format!("Category '{}' vanished", name)))?,
                    Err(e) => return Err(e),
                }
            }
        };

        if !resolved.iter().any(|c| c.id == category.id) {
            resolved.push(category);
        }
    }

    Ok(resolved)
}
