pub mod book;
pub mod book_category_links;
pub mod category;
pub mod friendship;
pub mod recommendation;
pub mod user;

pub use book::Book;
