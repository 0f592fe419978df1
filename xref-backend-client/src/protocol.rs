use serde::Deserialize;
use serde::Serialize;

/// Answer text substituted when the backend returns an empty response.
pub const NO_RESULTS_TEXT: &str = "No results found";

/// Canonical search result handed to the view layer.
///
/// Immutable once constructed; replaced wholesale on the next submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub answer: String,
    /// Source tags in backend order, e.g. "db1".."db4".
    pub sources: Vec<String>,
    pub was_cached: bool,
}

/// Raw envelope returned by `POST /semantic-search/`.
///
/// The caching layer nests a previously computed answer under `results`; a
/// live computation puts the same fields at the top level. Both shapes
/// deserialize here and are resolved exactly once by [`Self::normalize`].
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    cached: bool,
    #[serde(default)]
    gpt_response: Option<String>,
    #[serde(default)]
    sources: Option<Vec<String>>,
    #[serde(default)]
    results: Option<AnswerFields>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnswerFields {
    #[serde(default)]
    gpt_response: Option<String>,
    #[serde(default)]
    sources: Option<Vec<String>>,
}

/// Which of the two payload shapes the envelope carried.
enum Payload {
    Cached(AnswerFields),
    Direct(AnswerFields),
}

impl SearchEnvelope {
    fn resolve(self) -> (bool, Payload) {
        let was_cached = self.cached;
        match self.results {
            Some(fields) if was_cached => (was_cached, Payload::Cached(fields)),
            _ => (
                was_cached,
                Payload::Direct(AnswerFields {
                    gpt_response: self.gpt_response,
                    sources: self.sources,
                }),
            ),
        }
    }

    /// Flatten either payload shape into a [`SearchResult`].
    pub fn normalize(self) -> SearchResult {
        let (was_cached, payload) = self.resolve();
        let fields = match payload {
            Payload::Cached(fields) | Payload::Direct(fields) => fields,
        };
        let answer = match fields.gpt_response {
            Some(text) if !text.is_empty() => text,
            _ => NO_RESULTS_TEXT.to_string(),
        };
        SearchResult {
            answer,
            sources: fields.sources.unwrap_or_default(),
            was_cached,
        }
    }
}

/// Error body shared by all backend endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionsBody {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenBody {
    pub access_token: String,
}
