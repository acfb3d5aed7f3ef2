use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;

pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn detected_format(&self) -> Option<ImageFormat> {
        image::guess_format(&self.bytes).ok()
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|value| value.to_str())
        .map(|ext| {
            SUPPORTED_IMAGE_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

pub fn load_image(path: &Path) -> Result<UploadedImage> {
    if !is_supported_image(path) {
        bail!(
            "{} is not a supported image (expected {})",
            path.display(),
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        );
    }
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadedImage::new(name, bytes))
}

pub fn encode_image(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub fn encode_images(images: &[UploadedImage]) -> Vec<String> {
    images
        .iter()
        .map(|image| encode_image(&image.bytes))
        .collect()
}
