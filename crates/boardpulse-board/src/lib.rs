pub mod client;
pub mod error;
pub mod oauth;
pub mod source;

pub use client::{TrelloClient, TrelloCredentials, DEFAULT_BASE_URL};
pub use error::BoardApiError;
pub use source::BoardSource;
