use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::common::{ApiErrorDetails, ApiErrorResponse};
use super::error::ApiError;

/// Contentstack Management API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    debug: bool,
}

#[derive(Clone)]
pub struct ClientConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Log request and response bodies
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "terraform-provider-contentstack".to_string(),
            debug: false,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(host: &str, api_key: &str, management_token: &str) -> Result<Self, ApiError> {
        Self::with_config(host, api_key, management_token, ClientConfig::default())
    }

    /// Create a new API client with custom configuration
    pub fn with_config(
        host: &str,
        api_key: &str,
        management_token: &str,
        config: ClientConfig,
    ) -> Result<Self, ApiError> {
        let parsed =
            url::Url::parse(host).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", host, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                host
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert("api_key", header_value("api_key", api_key)?);
        headers.insert(AUTHORIZATION, header_value("management_token", management_token)?);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let base_url = format!("{}/v3", host.trim_end_matches('/'));

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                debug: config.debug,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Locale operations
    pub fn locales(&self) -> crate::api::locales::LocalesApi<'_> {
        crate::api::locales::LocalesApi::new(self)
    }

    /// Publishing environment operations
    pub fn environments(&self) -> crate::api::environments::EnvironmentsApi<'_> {
        crate::api::environments::EnvironmentsApi::new(self)
    }

    /// Global field operations
    pub fn global_fields(&self) -> crate::api::global_fields::GlobalFieldsApi<'_> {
        crate::api::global_fields::GlobalFieldsApi::new(self)
    }

    /// Execute a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("GET request to: {}", url);

        let response = self.inner.http_client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Execute a POST request with a JSON body
    pub async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("POST request to: {}", url);
        self.log_body(body);

        let response = self.inner.http_client.post(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Execute a PUT request with a JSON body
    pub async fn put<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("PUT request to: {}", url);
        self.log_body(body);

        let response = self.inner.http_client.put(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Execute a DELETE request
    pub async fn delete<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("DELETE request to: {}", url);

        let response = self.inner.http_client.delete(&url).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status.is_success() {
            self.parse_success_response(response).await
        } else {
            self.handle_error_response(response).await
        }
    }

    /// Parse successful response
    async fn parse_success_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        if self.inner.debug {
            tracing::debug!("API response body: {}", text);
        }

        serde_json::from_str::<T>(&text).map_err(|e| {
            if self.inner.debug {
                tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            } else {
                tracing::error!("Failed to deserialize response: {}", e);
            }
            ApiError::Parse(format!("Failed to parse response: {}", e))
        })
    }

    /// Handle error response
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!("API error response (HTTP {}): {}", status, text);

        let parsed = serde_json::from_str::<ApiErrorResponse>(&text).ok();
        let message = parsed
            .as_ref()
            .and_then(|e| e.error_message.clone())
            .unwrap_or_else(|| text.clone());

        match status {
            401 => Err(ApiError::Unauthorized(message)),
            404 => Err(ApiError::NotFound(message)),
            _ => Err(ApiError::Api {
                status,
                message,
                details: parsed.map(|e| {
                    Box::new(ApiErrorDetails {
                        error_code: e.error_code,
                        errors: e.errors,
                    })
                }),
            }),
        }
    }

    fn log_body<B: Serialize>(&self, body: &B) {
        if self.inner.debug {
            match serde_json::to_string(body) {
                Ok(json) => tracing::debug!("API request body: {}", json),
                Err(e) => tracing::warn!("Failed to serialize request body for logging: {}", e),
            }
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ApiError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|e| ApiError::InvalidHeader(format!("{}: {}", name, e)))?;
    header.set_sensitive(true);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::Notice;
    use crate::api::test_helpers::CapturedLogs;
    use mockito::Server;

    #[tokio::test]
    async fn client_sends_stack_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/locales")
            .match_header("api_key", "blt-stack")
            .match_header("authorization", "cs-token")
            .match_header("user-agent", "terraform-provider-contentstack")
            .with_body(r#"{"locales":[]}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "blt-stack", "cs-token").unwrap();
        let body: serde_json::Value = client.get("/locales").await.unwrap();

        assert_eq!(body, serde_json::json!({"locales": []}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_maps_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/locales")
            .with_status(401)
            .with_body(r#"{"error_message":"You're not allowed in here unless you're logged in.","error_code":105}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key", "bad-token").unwrap();
        let result = client.get::<serde_json::Value>("/locales").await;

        match result {
            Err(ApiError::Unauthorized(message)) => {
                assert!(message.contains("not allowed"));
            }
            other => panic!("Expected Unauthorized, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn client_maps_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/v3/environments/gone")
            .with_status(404)
            .with_body("not here")
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key", "token").unwrap();
        let result = client.delete::<Notice>("/environments/gone").await;

        let err = result.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: not here");
    }

    #[tokio::test]
    async fn client_keeps_error_details() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v3/locales")
            .with_status(422)
            .with_body(
                r#"{"error_message":"Language creation failed.","error_code":247,"errors":{"code":["is not valid."]}}"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key", "token").unwrap();
        let result = client
            .post::<Notice, _>("/locales", &serde_json::json!({"locale": {"code": "xx"}}))
            .await;

        match result {
            Err(ApiError::Api {
                status,
                message,
                details,
            }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "Language creation failed.");
                let details = details.unwrap();
                assert_eq!(details.error_code, Some(247));
                assert!(details.errors.unwrap().contains_key("code"));
            }
            other => panic!("Expected Api error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn client_strips_trailing_slash_from_host() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/locales")
            .with_body(r#"{"locales":[]}"#)
            .create_async()
            .await;

        let client = Client::new(&format!("{}/", server.url()), "key", "token").unwrap();
        assert_eq!(client.base_url(), format!("{}/v3", server.url()));

        let _ = client.get::<serde_json::Value>("/locales").await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_reports_unparseable_bodies() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/locales/en-us")
            .with_body("<html>")
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key", "token").unwrap();
        let result = client.get::<Notice>("/locales/en-us").await;

        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn parse_failures_log_body_only_in_debug_mode() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/locales/en-us")
            .with_body("<html>session-secret</html>")
            .expect(2)
            .create_async()
            .await;

        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let quiet = Client::new(&server.url(), "key", "token").unwrap();
        let result = quiet.get::<Notice>("/locales/en-us").await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
        assert!(logs.contents().contains("Failed to deserialize response"));
        assert!(!logs.contents().contains("session-secret"));

        let verbose = Client::with_config(
            &server.url(),
            "key",
            "token",
            ClientConfig {
                debug: true,
                ..Default::default()
            },
        )
        .unwrap();
        let result = verbose.get::<Notice>("/locales/en-us").await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
        assert!(logs.contents().contains("session-secret"));
    }

    #[tokio::test]
    async fn client_handles_network_errors() {
        let client = Client::new("http://localhost:1", "key", "token").unwrap();

        let result = client.get::<Notice>("/locales").await;
        assert!(matches!(result, Err(ApiError::Request(_))));
    }

    #[test]
    fn client_rejects_invalid_hosts() {
        assert!(matches!(
            Client::new("not a url", "key", "token"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            Client::new("ftp://api.contentstack.io", "key", "token"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn client_rejects_header_unsafe_credentials() {
        assert!(Client::new("https://api.contentstack.io", "key\n", "token").is_err());
    }
}
