use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// System message sent with chat completions unless overridden. Kept
/// TTS-friendly: plain alphanumerics and basic punctuation only.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer questions concisely \
     using only standard alphanumeric characters and basic punctuation (e.g., periods, commas). \
     Avoid symbols, emojis, or markdown formatting to ensure compatibility with text-to-speech APIs.";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_model: Option<String>,
    pub chat_model: Option<String>,
    pub size: Option<String>,
    pub default_prompt: Option<String>,
    pub system_prompt: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: None,
            chat_model: None,
            size: None,
            default_prompt: None,
            system_prompt: None,
        }
    }
}

impl OpenAiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("OPENAI_API_KEY").ok();
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let image_model = env::var("OPENAI_IMAGE_MODEL").ok();
        let chat_model = env::var("OPENAI_CHAT_MODEL").ok();
        let size = env::var("OPENAI_IMAGE_SIZE").ok();

        OpenAiConfig {
            api_key,
            base_url,
            image_model,
            chat_model,
            size,
            default_prompt: None,
            system_prompt: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = Some(model.into());
        self
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_default_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_prompt = Some(prompt.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct SaveConfig {
    pub directory: Option<String>,
    pub prefix: Option<String>,
}

impl Default for SaveConfig {
    fn default() -> Self {
        SaveConfig {
            directory: None,
            prefix: None,
        }
    }
}

impl SaveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let directory = env::var("PROMPTBRUSH_SAVE_DIR").ok();
        let prefix = env::var("PROMPTBRUSH_SAVE_PREFIX").ok();

        SaveConfig { directory, prefix }
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}
