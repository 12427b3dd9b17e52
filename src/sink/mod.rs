pub mod save;

use image::DynamicImage;

pub use save::ImageSaver;

/// A mutable slot that can receive a decoded image: a 2D image view, a 3D
/// surface texture, or anything else downstream of a generation.
pub trait DisplaySurface: Send {
    fn set_image(&mut self, image: &DynamicImage);
}

/// Applies `image` to `target`. An unset target is logged and skipped, not
/// an error. The trait object is `'static` so owned surfaces held behind
/// locks can be passed by guard.
pub fn display(image: &DynamicImage, target: Option<&mut (dyn DisplaySurface + 'static)>) {
    match target {
        Some(surface) => {
            surface.set_image(image);
            log::info!("Image applied to display surface");
        }
        None => log::warn!("No display surface set; image not applied"),
    }
}

/// Built-in surface that keeps the most recent image, the way a texture
/// slot holds the current texture for a later save action.
#[derive(Debug, Default)]
pub struct ImageSlot {
    image: Option<DynamicImage>,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    pub fn take(&mut self) -> Option<DynamicImage> {
        self.image.take()
    }
}

impl DisplaySurface for ImageSlot {
    fn set_image(&mut self, image: &DynamicImage) {
        self.image = Some(image.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_display_applies_to_slot() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let mut slot = ImageSlot::new();

        display(&image, Some(&mut slot));

        let held = slot.current().expect("slot should hold the image");
        assert_eq!(held.width(), 4);
    }

    #[test]
    fn test_display_with_unset_target_is_a_noop() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        display(&image, None);
    }

    #[test]
    fn test_display_through_boxed_surface_option() {
        use std::sync::{Arc, Mutex};

        // Owned surfaces are boxed and kept behind a lock; the held
        // Option<Box<dyn DisplaySurface>> must feed display() directly via
        // as_deref_mut.
        struct CountingSurface(Arc<Mutex<usize>>);

        impl DisplaySurface for CountingSurface {
            fn set_image(&mut self, _image: &DynamicImage) {
                *self.0.lock().unwrap() += 1;
            }
        }

        let applied = Arc::new(Mutex::new(0));
        let mut holder: Option<Box<dyn DisplaySurface>> =
            Some(Box::new(CountingSurface(applied.clone())));

        let image = DynamicImage::ImageRgb8(RgbImage::new(3, 3));
        display(&image, holder.as_deref_mut());

        assert_eq!(*applied.lock().unwrap(), 1);
    }

    #[test]
    fn test_slot_take_clears() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(1, 1));
        let mut slot = ImageSlot::new();
        slot.set_image(&image);

        assert!(slot.take().is_some());
        assert!(slot.current().is_none());
    }
}
