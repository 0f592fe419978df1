use crate::error::SearchError;
use crate::protocol::ErrorBody;
use crate::protocol::SearchEnvelope;
use crate::protocol::SearchResult;
use crate::protocol::SuggestionsBody;
use crate::protocol::TokenBody;
use log::warn;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the cross-reference database backend.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a bearer token to every subsequent request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Submit one query. Exactly one request per call, no automatic retry;
    /// the caller guarantees the query is non-empty after trimming.
    pub async fn search(&self, query: &str) -> Result<SearchResult, SearchError> {
        let url = format!("{}/semantic-search/", self.base_url);
        let mut request = self.http.post(url).query(&[("query", query)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("search request failed: {status}"));
            return Err(SearchError::from_detail(detail));
        }

        let envelope: SearchEnvelope = resp.json().await?;
        Ok(envelope.normalize())
    }

    /// Fetch the stored query suggestions.
    ///
    /// Suggestions are a non-critical enhancement: any failure degrades to
    /// an empty list with a warning rather than surfacing to the user.
    pub async fn suggestions(&self) -> Vec<String> {
        match self.try_suggestions().await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!("failed to fetch suggestions: {err}");
                Vec::new()
            }
        }
    }

    async fn try_suggestions(&self) -> Result<Vec<String>, SearchError> {
        let url = format!("{}/suggestions/", self.base_url);
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Backend(format!(
                "suggestions request failed: {status}"
            )));
        }
        let body: SuggestionsBody = resp.json().await?;
        Ok(body.suggestions)
    }

    /// Exchange credentials for a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, SearchError> {
        let url = format!("{}/token", self.base_url);
        let resp = self
            .http
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| "Invalid credentials".to_string());
            return Err(SearchError::from_detail(detail));
        }

        let body: TokenBody = resp.json().await?;
        Ok(body.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::NO_RESULTS_TEXT;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::body_string_contains;
    use wiremock::matchers::header;
    use wiremock::matchers::method;
    use wiremock::matchers::path;
    use wiremock::matchers::query_param;

    async fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(&server.uri()).unwrap()
    }

    #[tokio::test]
    async fn search_normalizes_a_direct_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/semantic-search/"))
            .and(query_param("query", "vendor deadlines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cached": false,
                "gpt_response": "Three contracts close this month.",
                "sources": ["db1", "db3"]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .await
            .search("vendor deadlines")
            .await
            .unwrap();
        assert_eq!(result.answer, "Three contracts close this month.");
        assert_eq!(result.sources, vec!["db1".to_string(), "db3".to_string()]);
        assert!(!result.was_cached);
    }

    #[tokio::test]
    async fn search_normalizes_a_cached_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/semantic-search/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cached": true,
                "results": { "gpt_response": "Cached answer", "sources": ["db2"] }
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).await.search("anything").await.unwrap();
        assert_eq!(result.answer, "Cached answer");
        assert!(result.was_cached);
    }

    #[tokio::test]
    async fn search_substitutes_placeholder_for_empty_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/semantic-search/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "cached": false, "gpt_response": "" })),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).await.search("anything").await.unwrap();
        assert_eq!(result.answer, NO_RESULTS_TEXT);
    }

    #[tokio::test]
    async fn search_forwards_the_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/semantic-search/"))
            .and(header("authorization", "Bearer t0k3n"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "cached": false, "gpt_response": "ok" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await.with_token(Some("t0k3n".to_string()));
        client.search("anything").await.unwrap();
    }

    #[tokio::test]
    async fn quota_detail_is_classified_as_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/semantic-search/"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "detail": "OpenAI quota exceeded" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.search("anything").await.unwrap_err();
        assert_eq!(err, SearchError::Quota("OpenAI quota exceeded".to_string()));
    }

    #[tokio::test]
    async fn embedding_detail_is_classified_as_embedding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/semantic-search/"))
            .respond_with(
                ResponseTemplate::new(502)
                    .set_body_json(json!({ "detail": "embedding generation failed" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.search("anything").await.unwrap_err();
        assert!(matches!(err, SearchError::Embedding(_)));
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/semantic-search/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.search("anything").await.unwrap_err();
        match err {
            SearchError::Backend(detail) => assert!(detail.contains("503")),
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        drop(server);

        let err = client.search("anything").await.unwrap_err();
        assert!(matches!(err, SearchError::Network(_)));
    }

    #[tokio::test]
    async fn suggestions_are_returned_in_backend_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/suggestions/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestions": ["AI contract", "Defense vendor", "Raytheon"]
            })))
            .mount(&server)
            .await;

        let suggestions = client_for(&server).await.suggestions().await;
        assert_eq!(
            suggestions,
            vec![
                "AI contract".to_string(),
                "Defense vendor".to_string(),
                "Raytheon".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn suggestion_failures_degrade_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/suggestions/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(client_for(&server).await.suggestions().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_suggestions_to_empty() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        drop(server);

        assert!(client.suggestions().await.is_empty());
    }

    #[tokio::test]
    async fn login_returns_the_issued_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("username=alice"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "abc.def.ghi" })),
            )
            .mount(&server)
            .await;

        let token = client_for(&server)
            .await
            .login("alice", "hunter2")
            .await
            .unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[tokio::test]
    async fn login_failure_surfaces_the_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Bad credentials" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .login("alice", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err, SearchError::Backend("Bad credentials".to_string()));
    }
}
