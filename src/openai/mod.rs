pub mod chat_client;
pub mod image_client;

use crate::{
    config::OpenAiConfig,
    error::{Error, Result},
    fetch::ImageFetcher,
    models::{ChatCompletionRequest, ImageEditRequest, ImageGenerationRequest, ImageResponse},
};
use async_trait::async_trait;
use reqwest::Client;

pub use chat_client::ChatClient;
pub use image_client::ImageClient;

/// Image generation and editing against a remote endpoint. Object-safe so
/// sessions and tests can substitute implementations.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate(&self, request: ImageGenerationRequest) -> Result<ImageResponse>;
    async fn edit(&self, request: ImageEditRequest) -> Result<ImageResponse>;
}

/// Chat completion returning the first choice's content.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String>;
}

#[derive(Clone)]
pub struct OpenAiClient {
    image_client: ImageClient,
    chat_client: ChatClient,
    fetcher: ImageFetcher,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::ConfigError("OpenAI API key is required".into()))?;

        let client = Client::new();

        Ok(Self {
            image_client: ImageClient::new(client.clone(), api_key.clone(), config.base_url.clone()),
            chat_client: ChatClient::new(client.clone(), api_key, config.base_url),
            fetcher: ImageFetcher::new(client),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn chat(&self) -> &ChatClient {
        &self.chat_client
    }

    pub fn fetcher(&self) -> &ImageFetcher {
        &self.fetcher
    }
}
