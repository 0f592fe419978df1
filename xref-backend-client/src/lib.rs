//! HTTP client for the cross-reference database backend.
//!
//! Wraps the three endpoints the client consumes: `POST /semantic-search/`,
//! `GET /suggestions/` and `POST /token`. Search responses come in two
//! shapes depending on whether the backend served them from its cache; both
//! are resolved into one [`SearchResult`] at this boundary so cache status
//! never leaks into the rest of the client.

mod client;
mod error;
mod protocol;

pub use client::BackendClient;
pub use error::SearchError;
pub use protocol::NO_RESULTS_TEXT;
pub use protocol::SearchEnvelope;
pub use protocol::SearchResult;
