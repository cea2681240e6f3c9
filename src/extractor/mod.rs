//! 特徴量抽出
//!
//! 画像1枚を平均色 (R, G, B ∈ [0,1]) に縮約し、サムネイルJPEGを書き出す。
//! 読み込めない画像はスキップしてログに残す。

mod thumbnail;

pub use thumbnail::{save_thumbnail, ThumbnailOptions};

use crate::error::{FlagColorsError, Result};
use crate::scanner::{thumbnail_stem, ImageInfo};
use flag_colors_common::Rgb;
use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::Path;

/// サムネイルを置くディレクトリ（スナップショットからの相対）
pub const THUMBS_DIR_NAME: &str = "thumbs";

/// クラスタ番号が付く前の旗1枚分
#[derive(Debug, Clone, PartialEq)]
pub struct FlagFeature {
    pub name: String,
    pub source_file: String,
    /// `thumbs/<slug>.jpg`
    pub thumbnail_path: String,
    pub rgb: Rgb,
}

/// 全画像の抽出結果
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub features: Vec<FlagFeature>,
    /// (ファイル名, 理由)
    pub skipped: Vec<(String, String)>,
}

/// チャンネルごとの平均輝度を [0,1] で返す
pub fn mean_rgb(image: &RgbImage) -> Result<Rgb> {
    let pixel_count = image.width() as u64 * image.height() as u64;
    if pixel_count == 0 {
        return Err(FlagColorsError::ImageDecode("画像が空です".into()));
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, &value) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += value as u64;
        }
    }

    let denom = pixel_count as f64 * 255.0;
    Ok([
        sums[0] as f64 / denom,
        sums[1] as f64 / denom,
        sums[2] as f64 / denom,
    ])
}

/// 使用済みのスラッグと重ならないよう `_2`, `_3`, ... を付ける
fn unique_stem(stem: String, used: &HashSet<String>) -> String {
    if !used.contains(&stem) {
        return stem;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", stem, n);
        if !used.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// 1枚分: デコード → 平均色 → サムネイル保存
pub fn extract_one(info: &ImageInfo, build_dir: &Path, options: &ThumbnailOptions) -> Result<FlagFeature> {
    extract_as(info, &thumbnail_stem(&info.file_name), build_dir, options)
}

fn extract_as(info: &ImageInfo, stem: &str, build_dir: &Path, options: &ThumbnailOptions) -> Result<FlagFeature> {
    let decoded = image::open(&info.path)
        .map_err(|e| FlagColorsError::ImageDecode(format!("{}: {}", info.file_name, e)))?;
    let rgb_image = decoded.to_rgb8();

    let rgb = mean_rgb(&rgb_image)?;

    let thumbnail_path = format!("{}/{}.jpg", THUMBS_DIR_NAME, stem);
    save_thumbnail(&rgb_image, &build_dir.join(&thumbnail_path), options)?;

    Ok(FlagFeature {
        name: info.name.clone(),
        source_file: info.file_name.clone(),
        thumbnail_path,
        rgb,
    })
}

/// 全画像を順に処理する。失敗した画像はスキップして `skipped` に記録。
/// スラッグが重なる画像（`new_york.png` と `new-york.png` など）は別のサムネイル名になる
pub fn extract_all(
    images: &[ImageInfo],
    build_dir: &Path,
    options: &ThumbnailOptions,
    verbose: bool,
) -> Result<ExtractionReport> {
    std::fs::create_dir_all(build_dir.join(THUMBS_DIR_NAME))?;

    let progress = ProgressBar::new(images.len() as u64);
    let style = ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);

    let mut report = ExtractionReport::default();
    let mut used_stems = HashSet::new();

    for info in images {
        progress.set_message(info.name.clone());

        let stem = unique_stem(thumbnail_stem(&info.file_name), &used_stems);
        match extract_as(info, &stem, build_dir, options) {
            Ok(feature) => {
                used_stems.insert(stem);
                if verbose {
                    progress.println(format!(
                        "  {} [{:.3}, {:.3}, {:.3}]",
                        feature.name, feature.rgb[0], feature.rgb[1], feature.rgb[2]
                    ));
                }
                report.features.push(feature);
            }
            Err(e) => {
                progress.println(format!("⚠ スキップ: {}", e));
                report.skipped.push((info.file_name.clone(), e.to_string()));
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::Rgb as Pixel;

    #[test]
    fn test_mean_rgb_solid() {
        let image = RgbImage::from_pixel(4, 3, Pixel([255, 0, 0]));
        let rgb = mean_rgb(&image).unwrap();
        assert_abs_diff_eq!(rgb[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_rgb_half_split() {
        // 左半分が白、右半分が黒 → 0.5
        let image = RgbImage::from_fn(10, 2, |x, _| {
            if x < 5 {
                Pixel([255, 255, 255])
            } else {
                Pixel([0, 0, 0])
            }
        });
        let rgb = mean_rgb(&image).unwrap();
        for c in rgb {
            assert_abs_diff_eq!(c, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_unique_stem() {
        let mut used = HashSet::new();
        assert_eq!(unique_stem("new_york".into(), &used), "new_york");

        used.insert("new_york".to_string());
        assert_eq!(unique_stem("new_york".into(), &used), "new_york_2");

        used.insert("new_york_2".to_string());
        assert_eq!(unique_stem("new_york".into(), &used), "new_york_3");
        assert_eq!(unique_stem("texas".into(), &used), "texas");
    }

    #[test]
    fn test_mean_rgb_empty() {
        let image = RgbImage::new(0, 0);
        assert!(matches!(mean_rgb(&image), Err(FlagColorsError::ImageDecode(_))));
    }
}
