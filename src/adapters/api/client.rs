use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::ports::{AppConfig, RepositoryError, RepositoryResult};

const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Envelope of every successful call: the decoded body plus the total count
/// reported by paginated list endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub total_count: Option<u64>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("projects-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepositoryError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> RepositoryResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<ApiResponse<T>> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, R: Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> RepositoryResult<ApiResponse<T>> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self.send(self.client.post(&url).json(body)).await?;
        self.handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, R: Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> RepositoryResult<ApiResponse<T>> {
        let url = self.url(path);
        tracing::debug!("PUT {}", url);

        let response = self.send(self.client.put(&url).json(body)).await?;
        self.handle_response(response).await
    }

    pub async fn patch<T: DeserializeOwned, R: Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> RepositoryResult<ApiResponse<T>> {
        let url = self.url(path);
        tracing::debug!("PATCH {}", url);

        let response = self
            .send(
                self.client
                    .patch(&url)
                    .header(reqwest::header::CONTENT_TYPE, "application/merge-patch+json")
                    .body(serde_json::to_vec(body).map_err(|e| RepositoryError::Serialization(e.to_string()))?),
            )
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete(&self, path: &str) -> RepositoryResult<ApiResponse<()>> {
        let url = self.url(path);
        tracing::debug!("DELETE {}", url);

        let response = self.send(self.client.delete(&url)).await?;
        let status = response.status().as_u16();
        if (200..=299).contains(&status) {
            return Ok(ApiResponse { data: (), total_count: None });
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RepositoryResult<ApiResponse<T>> {
        let status = response.status().as_u16();
        let total_count = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        let response_text = response
            .text()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        if !(200..=299).contains(&status) {
            return Err(status_error(status, response_text));
        }

        tracing::debug!("API Response: {}", response_text);

        let data = serde_json::from_str(&response_text).map_err(|e| {
            RepositoryError::Serialization(format!(
                "Failed to parse response: {}. Response was: {}",
                e, response_text
            ))
        })?;
        Ok(ApiResponse { data, total_count })
    }
}

/// Maps a non-2xx status and its body to the repository error taxonomy.
pub fn status_error(status: u16, body: String) -> RepositoryError {
    let detail = if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        body
    };

    match status {
        400 => RepositoryError::BadRequest(detail),
        401 => RepositoryError::Authentication("Invalid or missing API token".to_string()),
        404 => RepositoryError::NotFound(detail),
        _ => RepositoryError::Api(format!("HTTP {}: {}", status, detail)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&AppConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_base_and_path() {
        assert_eq!(
            client("http://localhost:8080/").url("api/tasks"),
            "http://localhost:8080/api/tasks"
        );
        assert_eq!(
            client("https://tracker.example.com/app").url("/api/tasks/3"),
            "https://tracker.example.com/app/api/tasks/3"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(400, "name must not be null".to_string()),
            RepositoryError::BadRequest("name must not be null".to_string())
        );
        assert!(matches!(status_error(401, String::new()), RepositoryError::Authentication(_)));
        assert_eq!(
            status_error(404, String::new()),
            RepositoryError::NotFound("HTTP 404".to_string())
        );
        assert_eq!(
            status_error(500, "boom".to_string()),
            RepositoryError::Api("HTTP 500: boom".to_string())
        );
    }
}
