use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;

use crate::trip::ChatResponse;

/// HTTP client for the Yorimichi recommendation backend.
///
/// The backend takes a POST with the payload entirely in the query
/// string and no body; `prompt` is user text and gets percent-encoded
/// by the query builder.
#[derive(Clone)]
pub struct YorimichiClient {
    client: Client,
    base_url: String,
}

impl YorimichiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn generate_response(&self, prompt: &str, thread_id: &str) -> Result<ChatResponse> {
        let url = format!("{}/generate_response", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("prompt", prompt), ("thread_id", thread_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Yorimichi request failed with status: {}",
                response.status()
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = YorimichiClient::new("http://127.0.0.1:8000/", Duration::from_secs(30)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        // Port 1 is never listening; the connect fails immediately.
        let client = YorimichiClient::new("http://127.0.0.1:1", Duration::from_secs(5)).unwrap();
        let result = client.generate_response("Find ramen shops", "thread-1").await;
        assert!(result.is_err());
    }
}
