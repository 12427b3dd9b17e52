use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Body for `POST /v1/images/generations`.
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

impl ImageGenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            n: 1,
            size: size.into(),
        }
    }
}

/// Inputs for `POST /v1/images/edits`. The image and mask travel as binary
/// multipart parts; reading them off disk is the caller's concern.
#[derive(Debug, Clone)]
pub struct ImageEditRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
    pub image: Vec<u8>,
    pub image_filename: String,
    pub mask: Vec<u8>,
    pub mask_filename: String,
}

/// Response shape shared by the generation and edit endpoints. `created`
/// is absent in some variants.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub created: Option<i64>,
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

impl ImageResponse {
    /// URL of the first generated image. An empty `data` array, or a first
    /// entry without a URL, is a reportable failure rather than an index
    /// fault.
    pub fn first_url(&self) -> Result<&str> {
        self.data
            .first()
            .and_then(|d| d.url.as_deref())
            .ok_or(Error::EmptyResult)
    }

    /// Raw bytes of the first image when the response carried an embedded
    /// `b64_json` payload instead of a URL.
    pub fn first_image_bytes(&self) -> Result<Vec<u8>> {
        let encoded = self
            .data
            .first()
            .and_then(|d| d.b64_json.as_deref())
            .ok_or(Error::EmptyResult)?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::DecodeError(format!("invalid base64 image payload: {}", e)))
    }
}
