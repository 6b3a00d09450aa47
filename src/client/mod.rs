//! Client side of the app: a typed REST client, a reducer-driven store
//! and the async thunks tying them together.

pub mod api;
pub mod store;
pub mod thunks;

pub use api::{ApiClient, BookDraft, BookQuery, ClientError, CoverFile, SessionUser};
pub use store::{Action, State, Store, reduce};
