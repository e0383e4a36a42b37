//! Authenticated HTTP access to the music API.
//!
//! The adapter only ever talks to a [`MusicTransport`]; credentials, base
//! URL and timeouts live here so that request building stays pure.

use crate::error::{MusicError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use elevenconf::ApiConfig;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "xi-api-key";

/// Pre-authenticated call capability.
#[async_trait]
pub trait MusicTransport: Send + Sync {
    /// POST a JSON body and return the raw response bytes.
    async fn post_audio(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Bytes>;

    /// POST a JSON body and decode a JSON response.
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value>;

    /// GET a JSON document.
    async fn get_json(&self, path: &str) -> Result<Value>;
}

/// [`MusicTransport`] over reqwest.
pub struct HttpTransport {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `base_url` authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_key, None)
    }

    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MusicError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let timeout = (api.timeout_secs > 0).then(|| Duration::from_secs(api.timeout_secs));
        Self::with_timeout(&api.base_url, &api.api_key, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header(API_KEY_HEADER, &self.api_key)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| MusicError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "music API returned an error status");
            return Err(MusicError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode_json(response: reqwest::Response) -> Result<Value> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| MusicError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| MusicError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MusicTransport for HttpTransport {
    #[tracing::instrument(skip(self, query, body), fields(http.url = %self.url(path)))]
    async fn post_audio(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Bytes> {
        let builder = self.client.post(self.url(path)).query(query).json(body);
        let response = self.send(builder).await?;

        let audio = response
            .bytes()
            .await
            .map_err(|e| MusicError::Transport(e.to_string()))?;
        tracing::debug!(bytes = audio.len(), "received audio");
        Ok(audio)
    }

    #[tracing::instrument(skip(self, body), fields(http.url = %self.url(path)))]
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let builder = self.client.post(self.url(path)).json(body);
        let response = self.send(builder).await?;
        Self::decode_json(response).await
    }

    #[tracing::instrument(skip(self), fields(http.url = %self.url(path)))]
    async fn get_json(&self, path: &str) -> Result<Value> {
        let builder = self.client.get(self.url(path));
        let response = self.send(builder).await?;
        Self::decode_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let transport = HttpTransport::new("https://api.example.com/", "key").unwrap();
        assert_eq!(transport.base_url(), "https://api.example.com");
        assert_eq!(transport.url("/v1/music"), "https://api.example.com/v1/music");
        assert_eq!(transport.url("v1/user"), "https://api.example.com/v1/user");
    }

    #[test]
    fn from_config_uses_base_url() {
        let api = ApiConfig {
            api_key: "k".into(),
            base_url: "http://localhost:9999".into(),
            timeout_secs: 5,
        };
        let transport = HttpTransport::from_config(&api).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:9999");
    }
}
