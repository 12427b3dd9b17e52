use crate::{
    config::SaveConfig,
    error::{Error, Result},
};
use chrono::{DateTime, Local};
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const DEFAULT_SAVE_DIRECTORY: &str = "GeneratedImages";
pub const DEFAULT_SAVE_PREFIX: &str = "DalleImage";

/// Writes decoded images to disk as PNG, named
/// `<prefix>_<yyyyMMddHHmmssfff>.png` from the local time.
#[derive(Debug, Clone)]
pub struct ImageSaver {
    directory: PathBuf,
    prefix: String,
}

impl ImageSaver {
    pub fn new(config: SaveConfig) -> Self {
        Self {
            directory: PathBuf::from(
                config
                    .directory
                    .unwrap_or_else(|| DEFAULT_SAVE_DIRECTORY.to_string()),
            ),
            prefix: config
                .prefix
                .unwrap_or_else(|| DEFAULT_SAVE_PREFIX.to_string()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn save(&self, image: &DynamicImage) -> Result<PathBuf> {
        self.save_at(image, Local::now())
    }

    /// Save with an explicit timestamp. Two saves within the same
    /// millisecond map to the same filename and the second overwrites the
    /// first; overwriting is the defined behavior.
    pub fn save_at(&self, image: &DynamicImage, timestamp: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            Error::IoError(format!(
                "failed creating directory {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| Error::EncodeError(e.to_string()))?;

        let filename = format!("{}_{}.png", self.prefix, timestamp.format("%Y%m%d%H%M%S%3f"));
        let path = self.directory.join(filename);

        fs::write(&path, bytes)
            .map_err(|e| Error::IoError(format!("failed writing {}: {}", path.display(), e)))?;

        log::info!("Image saved to {}", path.display());
        Ok(path)
    }
}
