//! HTTP plumbing shared by every endpoint.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Span, debug, error, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::{ApiError, ApiResponse};
use crate::config::ApiConfig;
use crate::session::SessionHandle;
use crate::ui::{Navigator, routes};

/// Header carrying a per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client for the Vastraverse backend.
///
/// Attaches the current bearer token to every request and owns the 401
/// teardown: any unauthorized response purges the session and redirects to
/// the login route before the error reaches the caller.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &ApiConfig,
        session: SessionHandle,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                session,
                navigator,
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    /// Base URL all endpoint paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    pub(super) fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build an endpoint URL with query-string pairs.
    pub(super) fn url_with_query(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Url, ApiError> {
        let mut url = self.url(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    pub(super) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(Method::GET, url, None::<&()>).await
    }

    pub(super) async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(Method::POST, url, Some(body)).await
    }

    pub(super) async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(Method::PUT, url, Some(body)).await
    }

    pub(super) async fn delete<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(Method::DELETE, url, None::<&()>).await
    }

    /// Send a request and decode the response envelope.
    #[instrument(
        skip(self, body),
        fields(method = %method, path = %url.path(), request_id = tracing::field::Empty)
    )]
    async fn execute<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        let mut request = self
            .inner
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, &request_id);

        if let Some(token) = self.inner.session.token() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected session, signing out");
            self.inner.session.teardown();
            self.inner.navigator.redirect(routes::LOGIN);
            return Err(ApiError::Unauthorized);
        }

        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&response_text)
                .ok()
                .and_then(|envelope| envelope.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP {status}"));

            debug!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }

        match serde_json::from_str(&response_text) {
            Ok(envelope) => Ok(envelope),
            Err(e) => {
                error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::session::MemorySessionStore;
    use crate::ui::RecordingNavigator;

    use super::*;

    fn client(base: &str) -> ApiClient {
        let session = SessionHandle::new(Arc::new(MemorySessionStore::new()));
        ApiClient::new(
            &ApiConfig::with_base_url(base).unwrap(),
            session,
            Arc::new(RecordingNavigator::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_url_appends_segments_to_base_path() {
        let api = client("http://localhost:5000/api");
        assert_eq!(
            api.url(&["cart", "11"]).unwrap().as_str(),
            "http://localhost:5000/api/cart/11"
        );

        let api = client("http://localhost:5000/api/");
        assert_eq!(
            api.url(&["products"]).unwrap().as_str(),
            "http://localhost:5000/api/products"
        );
    }

    #[test]
    fn test_url_encodes_segments_and_query() {
        let api = client("http://localhost:5000/api");
        let url = api
            .url_with_query(
                &["products", "category", "silk sarees"],
                &[("search", "red & gold".to_owned())],
            )
            .unwrap();
        assert_eq!(url.path(), "/api/products/category/silk%20sarees");
        assert_eq!(url.query(), Some("search=red+%26+gold"));
    }

    #[test]
    fn test_url_without_query_has_no_question_mark() {
        let api = client("http://localhost:5000/api");
        assert!(api.url_with_query(&["products"], &[]).unwrap().query().is_none());
    }
}
