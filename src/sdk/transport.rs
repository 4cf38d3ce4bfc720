//! HTTP request handling shared by the service clients.

use reqwest::{header::ACCEPT, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, de::IgnoredAny, Serialize};
use std::time::Duration;
use tracing::{debug, error, trace};
use url::Url;

use super::ApiError;

/// Request timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 60;

const USER_AGENT: &str = concat!("nimbus-cli/", env!("CARGO_PKG_VERSION"));

/// Authenticated JSON client bound to one service endpoint
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Append path segments to the base URL. Segments are percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn url_with_query<Q: Serialize>(&self, segments: &[&str], query: &Q) -> Result<Url, ApiError> {
        let mut url = self.url(segments)?;
        let encoded = serde_urlencoded::to_string(query)?;
        if !encoded.is_empty() {
            url.set_query(Some(&encoded));
        }
        Ok(url)
    }

    pub async fn get<T>(&self, segments: &[&str]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        self.execute(self.client.get(url)).await
    }

    pub async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize,
    {
        let url = self.url_with_query(segments, query)?;
        self.execute(self.client.get(url)).await
    }

    pub async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = self.url(segments)?;
        self.execute(self.client.post(url).json(body)).await
    }

    pub async fn patch<T, B>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = self.url(segments)?;
        self.execute(self.client.patch(url).json(body)).await
    }

    /// DELETE, ignoring any response body.
    pub async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.url(segments)?;
        self.execute::<IgnoredAny>(self.client.delete(url)).await?;
        Ok(())
    }

    async fn execute<T>(&self, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        let response_text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&response_text),
            });
        }
        trace!("Raw response text for deserialization: {}", response_text);

        let body = if response_text.trim().is_empty() {
            "null"
        } else {
            response_text.as_str()
        };
        serde_json::from_str::<T>(body).map_err(|e| {
            error!(
                "Failed to deserialize response: {}. Raw response: {}",
                e, response_text
            );
            ApiError::Decode(e)
        })
    }
}

/// The `message` field of a JSON error body, or the body itself.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string));
    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => "no details provided".to_string(),
        None => body.trim().to_string(),
    }
}
