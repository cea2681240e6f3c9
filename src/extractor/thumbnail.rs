use crate::error::{FlagColorsError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// サムネイル設定
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailOptions {
    /// 最大幅 (px)。高さは縦横比から決まる
    pub max_width: u32,
    /// JPEG品質 (1-100)
    pub jpeg_quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            max_width: 120,
            jpeg_quality: 85,
        }
    }
}

impl ThumbnailOptions {
    /// 縮小後のサイズ。最大幅以下の画像は拡大しない
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width {
            return (width, height);
        }
        let scaled = (height as u64 * self.max_width as u64 + width as u64 / 2) / width as u64;
        (self.max_width, scaled.max(1) as u32)
    }
}

pub fn save_thumbnail(image: &RgbImage, path: &Path, options: &ThumbnailOptions) -> Result<()> {
    let (width, height) = options.target_size(image.width(), image.height());
    let resized;
    let thumb = if (width, height) == image.dimensions() {
        image
    } else {
        resized = imageops::thumbnail(image, width, height);
        &resized
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, options.jpeg_quality);
        encoder
            .encode_image(thumb)
            .map_err(|e| FlagColorsError::Thumbnail(format!("{}: {}", path.display(), e)))?;
    }
    writer.flush()?;

    Ok(())
}
