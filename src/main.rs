use promptbrush::{
    ChatCompletionRequest, ImageSaver, ImageSession, ImageSlot, OpenAiClient, OpenAiConfig,
    Phase, SaveConfig, DEFAULT_SYSTEM_PROMPT,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    promptbrush::logger::init_with_config(
        promptbrush::logger::LoggerConfig::development(),
    )?;

    match dotenv::dotenv() {
        Ok(_) => log::info!(".env file loaded"),
        Err(_) => log::warn!("No .env file found, using system environment variables"),
    }

    let config = OpenAiConfig::from_env()
        .with_default_prompt("a white siamese cat")
        .with_system_prompt(DEFAULT_SYSTEM_PROMPT);

    let image_model = config
        .image_model
        .clone()
        .unwrap_or_else(|| "dall-e-3".to_string());
    let chat_model = config
        .chat_model
        .clone()
        .unwrap_or_else(|| "gpt-4o-mini".to_string());
    let size = config.size.clone().unwrap_or_else(|| "1024x1024".to_string());
    let prompt = config.default_prompt.clone().unwrap_or_default();
    let system_prompt = config.system_prompt.clone().unwrap_or_default();

    log::info!("Creating OpenAI client...");
    let client = OpenAiClient::new(config)?;

    let saver = ImageSaver::new(SaveConfig::from_env());
    let session = ImageSession::new(
        Arc::new(client.image().clone()),
        Arc::new(client.fetcher().clone()),
        &image_model,
        &size,
    )
    .with_surface(Box::new(ImageSlot::new()))
    .with_saver(saver)
    .with_phase_listener(Arc::new(|phase: Phase| {
        log::info!("Status: {:?}", phase);
    }));

    log::info!("Generating image for prompt: {}", prompt);
    match session.generate_and_display(&prompt).await {
        Ok(outcome) => {
            log::info!("Image applied ({:?})", outcome);
            if let Some(path) = session.save_current().await? {
                log::info!("Saved to {}", path.display());
            }
        }
        Err(e) => log::error!("Image generation failed: {}", e),
    }

    log::info!("Requesting chat completion with model: {}", chat_model);
    let chat_request = ChatCompletionRequest::new(
        &chat_model,
        &system_prompt,
        "Describe a white siamese cat in one sentence.",
    );
    match client.chat().complete(chat_request).await {
        Ok(content) => log::info!("Chat response: {}", content),
        Err(e) => log::error!("Chat completion failed: {}", e),
    }

    Ok(())
}
