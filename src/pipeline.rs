//! バッチ処理: スキャン → 特徴量抽出 → クラスタリング → スナップショット保存
//!
//! パス・k・シードなどはすべて `PipelineOptions` で明示的に渡す。

use crate::config::Config;
use crate::error::{FlagColorsError, Result};
use crate::extractor::{self, FlagFeature, ThumbnailOptions};
use crate::scanner::{self, ImageInfo};
use crate::snapshot::{self, SNAPSHOT_FILE_NAME};
use flag_colors_common::{kmeans, FlagState, KMeansConfig, KMeansFit, Rgb, Snapshot};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub input_dir: PathBuf,
    /// サムネイルとスナップショットの出力先
    pub build_dir: PathBuf,
    /// 入力画像の必要枚数
    pub expected_count: usize,
    pub kmeans: KMeansConfig,
    pub thumbnail: ThumbnailOptions,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            input_dir: config.input_dir.clone(),
            build_dir: config.build_dir.clone(),
            expected_count: config.expected_count,
            kmeans: config.kmeans(),
            thumbnail: ThumbnailOptions {
                max_width: config.thumb_width,
                jpeg_quality: config.jpeg_quality,
            },
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.build_dir.join(SNAPSHOT_FILE_NAME)
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub snapshot: Snapshot,
    pub snapshot_path: PathBuf,
    /// 読み込めずにスキップした画像 (ファイル名, 理由)
    pub skipped: Vec<(String, String)>,
    pub iterations: usize,
}

/// 枚数が一致しなければ検出した旗の一覧付きでエラー
pub fn check_count(images: &[ImageInfo], expected: usize) -> Result<()> {
    if images.len() == expected {
        return Ok(());
    }

    let mut names: Vec<String> = images.iter().map(|i| i.name.clone()).collect();
    names.sort();
    names.dedup();

    Err(FlagColorsError::CountMismatch {
        expected,
        found: images.len(),
        names,
    })
}

/// 特徴量をクラスタリングし、クラスタ番号付きの `FlagState` にする
pub fn cluster_features(
    features: Vec<FlagFeature>,
    config: &KMeansConfig,
) -> Result<(Vec<FlagState>, KMeansFit)> {
    if features.len() < config.k {
        return Err(FlagColorsError::NotEnoughImages {
            decoded: features.len(),
            k: config.k,
        });
    }

    let points: Vec<Rgb> = features.iter().map(|f| f.rgb).collect();
    let fit = kmeans::fit(&points, config)?;

    let states = features
        .into_iter()
        .zip(&fit.labels)
        .map(|(feature, &cluster_id)| FlagState {
            name: feature.name,
            source_file: feature.source_file,
            thumbnail_path: feature.thumbnail_path,
            rgb: feature.rgb,
            cluster_id,
        })
        .collect();

    Ok((states, fit))
}

pub fn run(options: &PipelineOptions, verbose: bool) -> Result<PipelineOutput> {
    // 1. 画像スキャン
    println!("[1/3] 画像をスキャン中...");
    let images = scanner::scan_folder(&options.input_dir)?;
    check_count(&images, options.expected_count)?;
    println!("✔ {}枚の画像を検出\n", images.len());

    // 2. 平均色・サムネイル
    println!("[2/3] 平均色を計算中...");
    let report = extractor::extract_all(&images, &options.build_dir, &options.thumbnail, verbose)?;
    println!(
        "✔ {}枚を処理{}\n",
        report.features.len(),
        if report.skipped.is_empty() {
            String::new()
        } else {
            format!("（{}枚スキップ）", report.skipped.len())
        }
    );

    // 3. クラスタリングと保存
    println!("[3/3] クラスタリング中... (k={}, seed={})", options.kmeans.k, options.kmeans.seed);
    let (states, fit) = cluster_features(report.features, &options.kmeans)?;
    if verbose {
        println!("  反復回数: {}, 慣性: {:.6}", fit.iterations, fit.inertia);
    }

    let created_at = chrono::Local::now().to_rfc3339();
    let snapshot = Snapshot::new(options.kmeans.k, created_at, fit.centroids, states);

    let snapshot_path = options.snapshot_path();
    snapshot::write_snapshot(&snapshot, &snapshot_path)?;
    println!("✔ スナップショットを保存: {}", snapshot_path.display());

    Ok(PipelineOutput {
        snapshot,
        snapshot_path,
        skipped: report.skipped,
        iterations: fit.iterations,
    })
}

/// クラスタごとの件数と重心を表示
pub fn print_summary(snapshot: &Snapshot) {
    println!("\nクラスタ件数: {:?}", snapshot.cluster_sizes());
    println!("重心 (RGB):");
    for (i, c) in snapshot.centroids.iter().enumerate() {
        println!("  Cluster {}: [{:.4}, {:.4}, {:.4}]", i, c[0], c[1], c[2]);
    }
}
