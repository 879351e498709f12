use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{SourceError, SourceResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Build the HTTP client shared by one fetcher
pub fn get_http_client(user_agent: &str) -> SourceResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);

    let client = reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(DEFAULT_TIMEOUT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Execute a GET request, mapping transport and status failures
async fn execute_request(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> SourceResult<reqwest::Response> {
    tracing::debug!(url, "GET");

    let response = client.get(url).headers(headers).send().await.map_err(|e| {
        if e.is_timeout() {
            SourceError::Timeout(url.to_string())
        } else {
            SourceError::Network(e)
        }
    })?;

    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Download and parse JSON response from URL
pub async fn download_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> SourceResult<T> {
    let response = execute_request(client, url, headers).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(SourceError::from)
}

/// Download text content from URL
pub async fn download_text(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> SourceResult<String> {
    let response = execute_request(client, url, headers).await?;
    response.text().await.map_err(SourceError::from)
}

/// Download binary data from URL
pub async fn download_binary(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> SourceResult<Vec<u8>> {
    let response = execute_request(client, url, headers).await?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}
