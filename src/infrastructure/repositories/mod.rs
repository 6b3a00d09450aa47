//! Repository implementations using SeaORM

pub mod book_repository;
pub mod category_repository;
pub mod friendship_repository;
pub mod recommendation_repository;
pub mod user_repository;

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};

pub use book_repository::SeaOrmBookRepository;
pub use category_repository::SeaOrmCategoryRepository;
pub use friendship_repository::SeaOrmFriendshipRepository;
pub use recommendation_repository::SeaOrmRecommendationRepository;
pub use user_repository::SeaOrmUserRepository;

/// `column LIKE '%value%'` with `%`, `_` and `\` in `value` matched literally
pub(crate) fn contains_literal<C: ColumnTrait>(column: C, value: &str) -> SimpleExpr {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::col((column.entity_name(), column))
        .like(LikeExpr::new(format!("%{}%", escaped)).escape('\\'))
}
