use thiserror::Error;

/// Failure taxonomy for backend requests.
///
/// Exactly one variant is attached to a failed query; the UI renders the
/// variant, not the raw transport error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream usage limit is exhausted.
    #[error("usage quota exhausted: {0}")]
    Quota(String),

    /// The backend failed to embed the query text.
    #[error("query embedding failed: {0}")]
    Embedding(String),

    /// Anything else the backend reported.
    #[error("{0}")]
    Backend(String),
}

impl SearchError {
    /// Classify unstructured error text from the backend.
    ///
    /// Best-effort substring heuristic, first match wins: quota, then
    /// embedding, then generic. The backend exposes no structured error
    /// code to key on.
    pub fn from_detail(detail: String) -> Self {
        let lowered = detail.to_lowercase();
        if lowered.contains("quota") {
            SearchError::Quota(detail)
        } else if lowered.contains("embedding") {
            SearchError::Embedding(detail)
        } else {
            SearchError::Backend(detail)
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        // A decode failure means a response did arrive; everything else is
        // treated as the request never completing.
        if err.is_decode() {
            SearchError::Backend(err.to_string())
        } else {
            SearchError::Network(err.to_string())
        }
    }
}
