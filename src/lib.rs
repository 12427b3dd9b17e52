pub mod config;
pub mod error;
pub mod fetch;
pub mod logger;
pub mod models;
pub mod openai;
pub mod session;
pub mod sink;

pub use config::{OpenAiConfig, SaveConfig, DEFAULT_SYSTEM_PROMPT};
pub use error::{Error, Result};
pub use fetch::{ImageFetchService, ImageFetcher};
pub use models::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageData, ImageEditRequest,
    ImageGenerationRequest, ImageResponse,
};
pub use openai::{ChatClient, ChatService, ImageClient, ImageGenerationService, OpenAiClient};
pub use session::{Applied, ImageSession, Phase, PhaseListener};
pub use sink::{display, DisplaySurface, ImageSaver, ImageSlot};
