use super::{ BookmarkApi, BookmarkApiError };
use crate::cli::Session;
use crate::models::bookmark::{ BookmarkPayload, FetchFailure };
use async_trait::async_trait;
use log::{ error, info, warn };
use reqwest::Client as HttpClient;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpBookmarkClient {
    http: HttpClient,
    base_url: String,
}

impl HttpBookmarkClient {
    pub fn new(base_url: &str) -> Result<Self, BookmarkApiError> {
        let parsed = Url::parse(base_url.trim())?;
        Ok(Self {
            http: HttpClient::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub async fn try_fetch(&self, session: &Session) -> Result<BookmarkPayload, BookmarkApiError> {
        let url = format!("{}/bookmark", self.base_url);
        let resp = self.http
            .get(&url)
            .query(
                &[
                    ("user_id", session.user_id.as_str()),
                    ("tenant_id", session.tenant_id.as_str()),
                ]
            )
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BookmarkApiError::Api { status: status.as_u16(), body });
        }

        let body = resp.text().await?;
        serde_json::from_str::<BookmarkPayload>(&body).map_err(|e| BookmarkApiError::Decode(e.to_string()))
    }

    pub async fn try_delete(&self, session: &Session, query_id: &str) -> Result<(), BookmarkApiError> {
        let url = format!("{}/deletebookmarks", self.base_url);
        let resp = self.http
            .get(&url)
            .query(
                &[
                    ("user_id", session.user_id.as_str()),
                    ("tenant_id", session.tenant_id.as_str()),
                    ("query_id", query_id),
                ]
            )
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BookmarkApiError::Api { status: status.as_u16(), body });
        }
        Ok(())
    }
}

#[async_trait]
impl BookmarkApi for HttpBookmarkClient {
    async fn fetch_bookmarks(&self, session: &Session) -> BookmarkPayload {
        match self.try_fetch(session).await {
            Ok(payload) => {
                info!(
                    "Successfully fetched {} bookmarks for user {}",
                    payload.records().len(),
                    session.user_id
                );
                payload
            }
            Err(BookmarkApiError::Api { status, body }) => {
                error!("API request failed with status {}: {}", status, body);
                BookmarkPayload::failed(FetchFailure::Api { status })
            }
            Err(e) => {
                error!("Error fetching bookmarks: {}", e);
                BookmarkPayload::failed(FetchFailure::Transport { message: e.to_string() })
            }
        }
    }

    async fn delete_bookmark(&self, session: &Session, query_id: &str) {
        match self.try_delete(session, query_id).await {
            Ok(()) => info!("Deleted bookmark {} for user {}", query_id, session.user_id),
            Err(BookmarkApiError::Api { status, body }) => {
                warn!("Delete of bookmark {} returned status {}: {}", query_id, status, body);
            }
            Err(e) => error!("Error deleting bookmark: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{ method, path, query_param };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    fn session() -> Session {
        Session::new("alice", "acme")
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            HttpBookmarkClient::new("not a url"),
            Err(BookmarkApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let client = HttpBookmarkClient::new("http://localhost:9000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[tokio::test]
    async fn fetch_sends_session_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bookmark"))
            .and(query_param("user_id", "alice"))
            .and(query_param("tenant_id", "acme"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    json!({
                        "success": true,
                        "data": [{ "query_id": "q1", "query": "What?", "response": "**That**", "is_bookmark": true }]
                    })
                )
            )
            .expect(1)
            .mount(&server).await;

        let client = HttpBookmarkClient::new(&server.uri()).unwrap();
        let payload = client.fetch_bookmarks(&session()).await;

        assert!(payload.is_success());
        assert!(payload.failure.is_none());
        assert_eq!(payload.records().len(), 1);
        assert_eq!(payload.records()[0].query_id.as_deref(), Some("q1"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bookmark"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server).await;

        let client = HttpBookmarkClient::new(&server.uri()).unwrap();
        let payload = client.fetch_bookmarks(&session()).await;

        assert_eq!(payload.success, Some(false));
        assert_eq!(payload.status_code, Some(503));
        assert_eq!(payload.failure, Some(FetchFailure::Api { status: 503 }));
        assert_eq!(payload.errors(), ["API request failed with status 503".to_string()]);
    }

    #[tokio::test]
    async fn undecodable_body_is_a_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bookmark"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server).await;

        let client = HttpBookmarkClient::new(&server.uri()).unwrap();
        let payload = client.fetch_bookmarks(&session()).await;

        assert_eq!(payload.status_code, Some(500));
        assert!(matches!(payload.failure, Some(FetchFailure::Transport { .. })));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let client = HttpBookmarkClient::new("http://127.0.0.1:1").unwrap();
        let payload = client.fetch_bookmarks(&session()).await;

        assert!(!payload.is_success());
        assert_eq!(payload.status_code, Some(500));
        assert!(payload.errors()[0].starts_with("Network error: "));
        assert!(matches!(payload.failure, Some(FetchFailure::Transport { .. })));
    }

    #[tokio::test]
    async fn delete_targets_the_bookmark() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/deletebookmarks"))
            .and(query_param("user_id", "alice"))
            .and(query_param("tenant_id", "acme"))
            .and(query_param("query_id", "q 1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server).await;

        let client = HttpBookmarkClient::new(&server.uri()).unwrap();
        client.delete_bookmark(&session(), "q 1").await;
    }

    #[tokio::test]
    async fn failed_delete_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/deletebookmarks"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server).await;

        let client = HttpBookmarkClient::new(&server.uri()).unwrap();
        let result = client.try_delete(&session(), "q1").await;
        assert!(matches!(result, Err(BookmarkApiError::Api { status: 500, .. })));

        // The trait method swallows the failure.
        client.delete_bookmark(&session(), "q1").await;
    }
}
