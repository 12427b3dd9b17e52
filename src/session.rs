use crate::{
    error::Result,
    fetch::{decode_image, ImageFetchService},
    models::{ImageEditRequest, ImageGenerationRequest},
    openai::ImageGenerationService,
    sink::{display, DisplaySurface, ImageSaver},
};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lifecycle of one user-triggered action:
/// Idle → Requesting → Downloading → Applying | Failed → Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Requesting,
    Downloading,
    Applying,
    Failed,
}

/// Status callback registered at construction time.
pub trait PhaseListener: Send + Sync {
    fn on_phase(&self, phase: Phase);
}

impl<F> PhaseListener for F
where
    F: Fn(Phase) + Send + Sync,
{
    fn on_phase(&self, phase: Phase) {
        self(phase)
    }
}

/// Outcome of a flow that ran to completion. A flow that finished after a
/// newer one had already started discards its own result and reports
/// `Stale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Fresh,
    Stale,
}

/// One generate → fetch → apply pipeline bound to a single display target.
///
/// Overlapping calls are not cancelled; instead each call takes a
/// monotonically increasing sequence number, and any call that observes a
/// newer sequence after one of its await points drops its result. The
/// latest request always wins the surface.
pub struct ImageSession {
    generator: Arc<dyn ImageGenerationService>,
    fetcher: Arc<dyn ImageFetchService>,
    surface: Mutex<Option<Box<dyn DisplaySurface>>>,
    current: Mutex<Option<DynamicImage>>,
    saver: Option<ImageSaver>,
    listeners: Vec<Arc<dyn PhaseListener>>,
    model: String,
    size: String,
    seq: AtomicU64,
}

impl ImageSession {
    pub fn new(
        generator: Arc<dyn ImageGenerationService>,
        fetcher: Arc<dyn ImageFetchService>,
        model: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            fetcher,
            surface: Mutex::new(None),
            current: Mutex::new(None),
            saver: None,
            listeners: Vec::new(),
            model: model.into(),
            size: size.into(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn with_surface(mut self, surface: Box<dyn DisplaySurface>) -> Self {
        self.surface = Mutex::new(Some(surface));
        self
    }

    pub fn with_saver(mut self, saver: ImageSaver) -> Self {
        self.saver = Some(saver);
        self
    }

    pub fn with_phase_listener(mut self, listener: Arc<dyn PhaseListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Full cycle for a prompt: request a generation, download the first
    /// returned URL, apply the decoded image to the surface and keep it as
    /// the current image.
    pub async fn generate_and_display(&self, prompt: &str) -> Result<Applied> {
        let seq = self.begin();

        let request = ImageGenerationRequest::new(&self.model, prompt, &self.size);
        let response = match self.generator.generate(request).await {
            Ok(response) => response,
            Err(e) => return self.fail(e),
        };

        self.finish(seq, &response).await
    }

    /// Same cycle for the edit endpoint: source image plus mask plus
    /// prompt.
    pub async fn edit_and_display(&self, request: ImageEditRequest) -> Result<Applied> {
        let seq = self.begin();

        let response = match self.generator.edit(request).await {
            Ok(response) => response,
            Err(e) => return self.fail(e),
        };

        self.finish(seq, &response).await
    }

    /// Persists the current image, if any. Returns `Ok(None)` when there
    /// is nothing to save or no saver was configured; that mirrors the
    /// save action being a silent no-op without a texture.
    pub async fn save_current(&self) -> Result<Option<PathBuf>> {
        let saver = match &self.saver {
            Some(saver) => saver,
            None => {
                log::warn!("No save location configured; image not saved");
                return Ok(None);
            }
        };

        let current = self.current.lock().await;
        match current.as_ref() {
            Some(image) => saver.save(image).map(Some),
            None => {
                log::warn!("No image to save");
                Ok(None)
            }
        }
    }

    fn begin(&self) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.emit(Phase::Requesting);
        seq
    }

    async fn finish(&self, seq: u64, response: &crate::models::ImageResponse) -> Result<Applied> {
        if self.superseded(seq) {
            return self.discard(seq);
        }

        // The response carries either a URL to download or an embedded
        // base64 payload; embedded payloads skip the download hop.
        let image = if let Ok(url) = response.first_url() {
            let url = url.to_string();
            self.emit(Phase::Downloading);
            match self.fetcher.fetch(&url).await {
                Ok(image) => image,
                Err(e) => return self.fail(e),
            }
        } else {
            let bytes = match response.first_image_bytes() {
                Ok(bytes) => bytes,
                Err(e) => return self.fail(e),
            };
            match decode_image(&bytes) {
                Ok(image) => image,
                Err(e) => return self.fail(e),
            }
        };

        if self.superseded(seq) {
            return self.discard(seq);
        }

        self.emit(Phase::Applying);
        {
            let mut surface = self.surface.lock().await;
            display(&image, surface.as_deref_mut());
        }
        *self.current.lock().await = Some(image);

        self.emit(Phase::Idle);
        Ok(Applied::Fresh)
    }

    /// A flow is superseded once any newer flow has taken a sequence
    /// number.
    fn superseded(&self, seq: u64) -> bool {
        self.seq.load(Ordering::SeqCst) != seq
    }

    fn discard(&self, seq: u64) -> Result<Applied> {
        log::info!("Discarding stale result for request #{}", seq);
        self.emit(Phase::Idle);
        Ok(Applied::Stale)
    }

    fn fail(&self, error: crate::error::Error) -> Result<Applied> {
        log::error!("Image request failed: {}", error);
        self.emit(Phase::Failed);
        self.emit(Phase::Idle);
        Err(error)
    }

    fn emit(&self, phase: Phase) {
        log::debug!("Session phase: {:?}", phase);
        for listener in &self.listeners {
            listener.on_phase(phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{ImageData, ImageResponse};
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    fn url_response(url: &str) -> ImageResponse {
        ImageResponse {
            created: Some(1700000000),
            data: vec![ImageData {
                url: Some(url.to_string()),
                b64_json: None,
            }],
        }
    }

    fn shaded_image(shade: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([shade, 0, 0])))
    }

    fn shade_of(image: &DynamicImage) -> u8 {
        image.to_rgb8().get_pixel(0, 0)[0]
    }

    struct MockGenerator {
        responses: StdMutex<VecDeque<Result<ImageResponse>>>,
    }

    impl MockGenerator {
        fn new(responses: Vec<Result<ImageResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: StdMutex::new(responses.into_iter().collect()),
            })
        }
    }

    #[async_trait]
    impl ImageGenerationService for MockGenerator {
        async fn generate(&self, _request: ImageGenerationRequest) -> Result<ImageResponse> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected generate call")
        }

        async fn edit(&self, _request: ImageEditRequest) -> Result<ImageResponse> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected edit call")
        }
    }

    /// Maps URLs to images; the image whose URL is `gate_url` is withheld
    /// until another fetch has completed, simulating its download
    /// resolving last.
    struct MockFetcher {
        calls: AtomicUsize,
        gate_url: Option<String>,
        gate: Notify,
    }

    impl MockFetcher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate_url: None,
                gate: Notify::new(),
            })
        }

        fn gated(url: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate_url: Some(url.to_string()),
                gate: Notify::new(),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageFetchService for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<DynamicImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.gate_url.as_deref() == Some(url) {
                self.gate.notified().await;
                // Slow download: shade 1.
                return Ok(shaded_image(1));
            }

            self.gate.notify_one();
            // Fast download: shade 2.
            Ok(shaded_image(2))
        }
    }

    struct RecordingSurface {
        applied: Arc<StdMutex<Vec<u8>>>,
    }

    impl DisplaySurface for RecordingSurface {
        fn set_image(&mut self, image: &DynamicImage) {
            self.applied.lock().unwrap().push(shade_of(image));
        }
    }

    fn recording_surface() -> (Box<RecordingSurface>, Arc<StdMutex<Vec<u8>>>) {
        let applied = Arc::new(StdMutex::new(Vec::new()));
        (
            Box::new(RecordingSurface {
                applied: applied.clone(),
            }),
            applied,
        )
    }

    #[tokio::test]
    async fn test_successful_cycle_applies_exactly_once() {
        let generator = MockGenerator::new(vec![Ok(url_response("http://x/img.png"))]);
        let fetcher = MockFetcher::new();
        let (surface, applied) = recording_surface();

        let phases = Arc::new(StdMutex::new(Vec::new()));
        let seen = phases.clone();
        let session = ImageSession::new(generator, fetcher.clone(), "dall-e-3", "1024x1024")
            .with_surface(surface)
            .with_phase_listener(Arc::new(move |phase: Phase| {
                seen.lock().unwrap().push(phase)
            }));

        let outcome = session.generate_and_display("a red bicycle").await.unwrap();

        assert_eq!(outcome, Applied::Fresh);
        assert_eq!(applied.lock().unwrap().len(), 1);
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(
            *phases.lock().unwrap(),
            vec![
                Phase::Requesting,
                Phase::Downloading,
                Phase::Applying,
                Phase::Idle
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_skips_download() {
        let generator = MockGenerator::new(vec![Err(Error::TransportError {
            message: "image generation returned status 401 Unauthorized".into(),
            body: Some(r#"{"error": "invalid api key"}"#.into()),
        })]);
        let fetcher = MockFetcher::new();
        let (surface, applied) = recording_surface();

        let phases = Arc::new(StdMutex::new(Vec::new()));
        let seen = phases.clone();
        let session = ImageSession::new(generator, fetcher.clone(), "dall-e-3", "1024x1024")
            .with_surface(surface)
            .with_phase_listener(Arc::new(move |phase: Phase| {
                seen.lock().unwrap().push(phase)
            }));

        let result = session.generate_and_display("a red bicycle").await;

        assert!(matches!(result, Err(Error::TransportError { .. })));
        assert_eq!(fetcher.call_count(), 0);
        assert!(applied.lock().unwrap().is_empty());
        assert!(phases.lock().unwrap().contains(&Phase::Failed));
    }

    #[tokio::test]
    async fn test_empty_data_skips_download() {
        let generator = MockGenerator::new(vec![Ok(ImageResponse {
            created: None,
            data: vec![],
        })]);
        let fetcher = MockFetcher::new();
        let (surface, applied) = recording_surface();

        let session = ImageSession::new(generator, fetcher.clone(), "dall-e-3", "1024x1024")
            .with_surface(surface);

        let result = session.generate_and_display("a red bicycle").await;

        assert!(matches!(result, Err(Error::EmptyResult)));
        assert_eq!(fetcher.call_count(), 0);
        assert!(applied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embedded_payload_applies_without_download() {
        use base64::Engine;
        use image::ImageFormat;
        use std::io::Cursor;

        let mut png = Vec::new();
        shaded_image(7)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);

        let generator = MockGenerator::new(vec![Ok(ImageResponse {
            created: None,
            data: vec![ImageData {
                url: None,
                b64_json: Some(encoded),
            }],
        })]);
        let fetcher = MockFetcher::new();
        let (surface, applied) = recording_surface();

        let session = ImageSession::new(generator, fetcher.clone(), "dall-e-3", "1024x1024")
            .with_surface(surface);

        let outcome = session.generate_and_display("a red bicycle").await.unwrap();

        assert_eq!(outcome, Applied::Fresh);
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(*applied.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_stale_download_is_discarded() {
        let generator = MockGenerator::new(vec![
            Ok(url_response("http://x/slow.png")),
            Ok(url_response("http://x/fast.png")),
        ]);
        let fetcher = MockFetcher::gated("http://x/slow.png");
        let (surface, applied) = recording_surface();

        let session = ImageSession::new(generator, fetcher.clone(), "dall-e-3", "1024x1024")
            .with_surface(surface);

        // The first request's download resolves only after the second has
        // completed; its result must be dropped.
        let (first, second) = tokio::join!(
            session.generate_and_display("first prompt"),
            session.generate_and_display("second prompt"),
        );

        assert_eq!(first.unwrap(), Applied::Stale);
        assert_eq!(second.unwrap(), Applied::Fresh);
        assert_eq!(fetcher.call_count(), 2);

        // Only the newer request's image reached the surface.
        assert_eq!(*applied.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_edit_cycle_applies_result() {
        let generator = MockGenerator::new(vec![Ok(url_response("http://x/edited.png"))]);
        let fetcher = MockFetcher::new();
        let (surface, applied) = recording_surface();

        let session = ImageSession::new(generator, fetcher.clone(), "dall-e-3", "1024x1024")
            .with_surface(surface);

        let request = ImageEditRequest {
            model: "dall-e-3".to_string(),
            prompt: "a flamingo in the pool".to_string(),
            n: 1,
            size: "1024x1024".to_string(),
            image: vec![0u8; 8],
            image_filename: "lounge.png".to_string(),
            mask: vec![0u8; 8],
            mask_filename: "mask.png".to_string(),
        };

        let outcome = session.edit_and_display(request).await.unwrap();

        assert_eq!(outcome, Applied::Fresh);
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(applied.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_current_without_image_is_none() {
        let generator = MockGenerator::new(vec![]);
        let fetcher = MockFetcher::new();
        let saver = ImageSaver::new(
            crate::config::SaveConfig::new().with_directory(
                std::env::temp_dir()
                    .join("promptbrush_session_save")
                    .to_string_lossy(),
            ),
        );

        let session =
            ImageSession::new(generator, fetcher, "dall-e-3", "1024x1024").with_saver(saver);

        assert!(session.save_current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_current_after_cycle_writes_file() {
        let generator = MockGenerator::new(vec![Ok(url_response("http://x/img.png"))]);
        let fetcher = MockFetcher::new();
        let dir = std::env::temp_dir().join(format!(
            "promptbrush_session_{}",
            uuid::Uuid::new_v4()
        ));
        let saver = ImageSaver::new(
            crate::config::SaveConfig::new().with_directory(dir.to_string_lossy()),
        );

        let session =
            ImageSession::new(generator, fetcher, "dall-e-3", "1024x1024").with_saver(saver);

        session.generate_and_display("a red bicycle").await.unwrap();
        let path = session.save_current().await.unwrap().expect("path");
        assert!(path.exists());
    }
}
