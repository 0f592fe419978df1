use crate::debounce::Debouncer;
use crate::suggest::filter_suggestions;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use xref_backend_client::BackendClient;
use xref_backend_client::SearchError;
use xref_backend_client::SearchResult;

/// Delay before re-fetching suggestions after a successful search, giving
/// the backend time to record the new query.
pub const SUGGESTION_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Window applied to keystroke-driven suggestion fetches.
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(250);

/// Longest accepted query, matching the input cap of the web UI.
pub const MAX_QUERY_LEN: usize = 500;

/// Lifecycle of the current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Everything the rendering layer needs to draw the query view.
///
/// Owned exclusively by [`QueryController`]; mutated only through its
/// transition methods.
#[derive(Debug, Default)]
pub struct QueryState {
    pub text: String,
    pub suggestions_visible: bool,
    pub loading: bool,
    pub result: Option<SearchResult>,
    pub error: Option<SearchError>,
}

impl QueryState {
    pub fn phase(&self) -> QueryPhase {
        if self.loading {
            QueryPhase::Loading
        } else if self.result.is_some() {
            QueryPhase::Success
        } else if self.error.is_some() {
            QueryPhase::Failed
        } else {
            QueryPhase::Idle
        }
    }
}

/// Tag for one in-flight search, carrying the query it was issued for.
/// A completion whose tag no longer matches the controller's in-flight
/// query is discarded instead of applied.
#[derive(Debug)]
pub struct SubmitTicket {
    query: String,
}

impl SubmitTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Orchestrates the search lifecycle on a single logical thread.
///
/// Only one query is supported in flight at a time; the embedding UI keeps
/// the submit affordance disabled while `loading` is set.
#[derive(Debug)]
pub struct QueryController {
    client: BackendClient,
    state: QueryState,
    suggestions: Vec<String>,
    debounce: Debouncer,
    in_flight: Option<String>,
    pending_refresh: bool,
}

impl QueryController {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            state: QueryState::default(),
            suggestions: Vec::new(),
            debounce: Debouncer::new(SUGGESTION_DEBOUNCE),
            in_flight: None,
            pending_refresh: false,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Unfiltered suggestion set, in backend order.
    pub fn all_suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Suggestions matching the current input, capped for rendering.
    pub fn visible_suggestions(&self) -> Vec<String> {
        filter_suggestions(&self.suggestions, &self.state.text)
    }

    /// Initial suggestion fetch, run once when the query view mounts.
    pub async fn mount(&mut self) {
        self.fetch_suggestions().await;
    }

    /// Record an edit to the query text.
    ///
    /// Suggestions become visible iff the text is non-empty and at least
    /// one stored suggestion matches it.
    pub fn input_changed(&mut self, text: &str) {
        self.state.text = if text.chars().count() > MAX_QUERY_LEN {
            text.chars().take(MAX_QUERY_LEN).collect()
        } else {
            text.to_string()
        };
        self.state.suggestions_visible =
            !self.state.text.is_empty() && !self.visible_suggestions().is_empty();
    }

    /// Adopt a suggestion as the query text and close the dropdown.
    pub fn apply_suggestion(&mut self, suggestion: &str) {
        self.state.text = suggestion.to_string();
        self.state.suggestions_visible = false;
    }

    /// Reset text, result, error, and suggestion visibility.
    pub fn clear(&mut self) {
        self.state.text.clear();
        self.state.result = None;
        self.state.error = None;
        self.state.suggestions_visible = false;
    }

    /// Start a submission. Returns `None` when the trimmed query is empty,
    /// in which case no state changes at all.
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        let query = self.state.text.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_string();
        self.state.loading = true;
        self.state.result = None;
        self.state.error = None;
        self.state.suggestions_visible = false;
        self.in_flight = Some(query.clone());
        Some(SubmitTicket { query })
    }

    /// Apply the outcome of a submission started with [`Self::begin_submit`].
    ///
    /// Returns whether the completion was applied. A ticket that no longer
    /// matches the in-flight query belongs to a superseded request and is
    /// dropped without touching state.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<SearchResult, SearchError>,
    ) -> bool {
        if self.in_flight.as_deref() != Some(ticket.query.as_str()) {
            debug!(query = %ticket.query, "discarding stale search completion");
            return false;
        }
        self.in_flight = None;
        self.state.loading = false;
        match outcome {
            Ok(result) => {
                debug!(query = %ticket.query, cached = result.was_cached, "search succeeded");
                self.state.result = Some(result);
                self.pending_refresh = true;
            }
            Err(err) => {
                debug!(query = %ticket.query, error = %err, "search failed");
                self.state.result = None;
                self.state.error = Some(err);
            }
        }
        true
    }

    /// Submit the current query and drive it to a terminal phase.
    pub async fn submit(&mut self) -> QueryPhase {
        if let Some(ticket) = self.begin_submit() {
            let outcome = self.client.search(&ticket.query).await;
            self.complete_submit(ticket, outcome);
        }
        self.state.phase()
    }

    /// Whether a post-success suggestion refresh is still owed.
    pub fn has_pending_refresh(&self) -> bool {
        self.pending_refresh
    }

    /// Run the deferred post-success refresh, waiting out the documented
    /// delay first. No-op when nothing is owed.
    pub async fn run_pending_refresh(&mut self) -> bool {
        if !self.pending_refresh {
            return false;
        }
        self.pending_refresh = false;
        sleep(SUGGESTION_REFRESH_DELAY).await;
        self.fetch_suggestions().await;
        true
    }

    /// Keystroke-driven refresh, gated by the debounce window.
    pub async fn maybe_refresh_suggestions(&mut self) -> bool {
        if !self.debounce.try_trigger() {
            return false;
        }
        self.fetch_suggestions().await;
        true
    }

    async fn fetch_suggestions(&mut self) {
        self.suggestions = self.client.suggestions().await;
        if self.state.suggestions_visible && self.visible_suggestions().is_empty() {
            self.state.suggestions_visible = false;
        }
    }
}
