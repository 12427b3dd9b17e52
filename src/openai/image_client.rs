use crate::{
    error::{Error, Result},
    models::{ImageEditRequest, ImageGenerationRequest, ImageResponse},
    openai::ImageGenerationService,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ImageClient {
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Single round trip against `/images/generations`. No retry; the
    /// caller owns any retry policy.
    pub async fn generate(&self, request: ImageGenerationRequest) -> Result<ImageResponse> {
        let url = format!("{}/images/generations", self.base_url);

        log::info!("Requesting image generation with model: {}", request.model);
        log::debug!("Prompt: {}", request.prompt);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::TransportError {
                message: format!("image generation request failed: {}", e),
                body: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Image generation returned {}: {}", status, body);
            return Err(Error::TransportError {
                message: format!("image generation returned status {}", status),
                body: Some(body),
            });
        }

        let body = response.text().await.map_err(|e| Error::TransportError {
            message: format!("failed reading image generation response: {}", e),
            body: None,
        })?;

        parse_image_response(&body)
    }

    /// Single round trip against `/images/edits`. The image and mask go as
    /// binary form parts; reqwest sets the boundary content type.
    pub async fn edit(&self, request: ImageEditRequest) -> Result<ImageResponse> {
        let url = format!("{}/images/edits", self.base_url);

        log::info!("Requesting image edit with model: {}", request.model);

        let image_part = Part::bytes(request.image)
            .file_name(request.image_filename)
            .mime_str("image/png")
            .map_err(|e| Error::TransportError {
                message: format!("failed building image form part: {}", e),
                body: None,
            })?;
        let mask_part = Part::bytes(request.mask)
            .file_name(request.mask_filename)
            .mime_str("image/png")
            .map_err(|e| Error::TransportError {
                message: format!("failed building mask form part: {}", e),
                body: None,
            })?;

        let form = Form::new()
            .text("model", request.model)
            .part("image", image_part)
            .part("mask", mask_part)
            .text("prompt", request.prompt)
            .text("n", request.n.to_string())
            .text("size", request.size);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::TransportError {
                message: format!("image edit request failed: {}", e),
                body: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Image edit returned {}: {}", status, body);
            return Err(Error::TransportError {
                message: format!("image edit returned status {}", status),
                body: Some(body),
            });
        }

        let body = response.text().await.map_err(|e| Error::TransportError {
            message: format!("failed reading image edit response: {}", e),
            body: None,
        })?;

        parse_image_response(&body)
    }
}

#[async_trait]
impl ImageGenerationService for ImageClient {
    async fn generate(&self, request: ImageGenerationRequest) -> Result<ImageResponse> {
        ImageClient::generate(self, request).await
    }

    async fn edit(&self, request: ImageEditRequest) -> Result<ImageResponse> {
        ImageClient::edit(self, request).await
    }
}

/// Deserializes a generation/edit response body. An empty `data` array is
/// reported as `EmptyResult` here so no caller ever indexes into it blind.
pub fn parse_image_response(body: &str) -> Result<ImageResponse> {
    let response: ImageResponse =
        serde_json::from_str(body).map_err(|e| Error::ParseError(e.to_string()))?;

    if response.data.is_empty() {
        return Err(Error::EmptyResult);
    }

    Ok(response)
}
