use crate::{
    error::{Error, Result},
    models::{ChatCompletionRequest, ChatCompletionResponse},
    openai::ChatService,
};
use async_trait::async_trait;
use reqwest::Client;

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Single round trip against `/chat/completions`; returns the first
    /// choice's content.
    pub async fn complete(&self, request: ChatCompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        log::info!("Requesting chat completion with model: {}", request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::TransportError {
                message: format!("chat completion request failed: {}", e),
                body: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Chat completion returned {}: {}", status, body);
            return Err(Error::TransportError {
                message: format!("chat completion returned status {}", status),
                body: Some(body),
            });
        }

        let body = response.text().await.map_err(|e| Error::TransportError {
            message: format!("failed reading chat completion response: {}", e),
            body: None,
        })?;

        parse_chat_response(&body)
    }
}

#[async_trait]
impl ChatService for ChatClient {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String> {
        ChatClient::complete(self, request).await
    }
}

/// Deserializes a chat completion body, surfacing an empty `choices` array
/// as `EmptyResult`.
pub fn parse_chat_response(body: &str) -> Result<String> {
    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| Error::ParseError(e.to_string()))?;

    response.first_content().map(str::to_string)
}
