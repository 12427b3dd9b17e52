use crate::error::{Error, Result};
use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;

/// Second-hop fetch of a generated image URL.
#[async_trait]
pub trait ImageFetchService: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<DynamicImage>;
}

#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Plain GET of a returned image URL. No auth header: the URL is
    /// pre-signed by the generation API.
    pub async fn fetch(&self, url: &str) -> Result<DynamicImage> {
        log::info!("Downloading image from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::TransportError {
                message: format!("image download failed: {}", e),
                body: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Image download returned {}", status);
            return Err(Error::TransportError {
                message: format!("image download returned status {}", status),
                body: Some(body),
            });
        }

        let bytes = response.bytes().await.map_err(|e| Error::TransportError {
            message: format!("failed reading image bytes: {}", e),
            body: None,
        })?;

        decode_image(&bytes)
    }
}

#[async_trait]
impl ImageFetchService for ImageFetcher {
    async fn fetch(&self, url: &str) -> Result<DynamicImage> {
        ImageFetcher::fetch(self, url).await
    }
}

/// Decodes raw response bytes as an image, format sniffed from content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::DecodeError(e.to_string()))
}
