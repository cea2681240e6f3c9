//! スナップショットの型定義
//!
//! バッチ処理とビューアの境界になる唯一の成果物:
//! - FlagState: 旗1枚分の平均色とクラスタ番号
//! - SnapshotMeta: k・作成日時・件数
//! - Snapshot: メタ情報 + 重心 + 全旗

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 正規化済みRGB (各成分 0.0〜1.0)
pub type Rgb = [f64; 3];

/// 旗1枚分の特徴量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagState {
    /// 表示名（ファイル名から生成）
    #[serde(rename = "state")]
    pub name: String,

    /// 元画像のファイル名
    #[serde(rename = "file")]
    pub source_file: String,

    /// サムネイルのパス（スナップショットのディレクトリからの相対パス）
    #[serde(rename = "thumb")]
    pub thumbnail_path: String,

    /// 平均色
    pub rgb: Rgb,

    /// 所属クラスタ (0..k)
    #[serde(rename = "cluster")]
    pub cluster_id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub k: usize,
    /// ISO 8601 形式
    pub created_at: String,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub centroids: Vec<Rgb>,
    pub states: Vec<FlagState>,
}

impl Snapshot {
    /// `n` は `states` の件数から決まる
    pub fn new(k: usize, created_at: String, centroids: Vec<Rgb>, states: Vec<FlagState>) -> Self {
        Self {
            meta: SnapshotMeta {
                k,
                created_at,
                n: states.len(),
            },
            centroids,
            states,
        }
    }

    /// JSONファイルから読み込み、整合性を検証する
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 不変条件のチェック
    ///
    /// - 重心はちょうど k 個
    /// - n == states の件数
    /// - 全 cluster_id が 0..k の範囲
    /// - 全成分が [0, 1]
    pub fn validate(&self) -> Result<()> {
        let k = self.meta.k;

        if self.centroids.len() != k {
            return Err(Error::InvalidSnapshot(format!(
                "k={} but {} centroids",
                k,
                self.centroids.len()
            )));
        }

        if self.meta.n != self.states.len() {
            return Err(Error::InvalidSnapshot(format!(
                "n={} but {} states",
                self.meta.n,
                self.states.len()
            )));
        }

        for (i, centroid) in self.centroids.iter().enumerate() {
            if !in_unit_range(centroid) {
                return Err(Error::InvalidSnapshot(format!(
                    "centroid {} out of range: {:?}",
                    i, centroid
                )));
            }
        }

        for state in &self.states {
            if state.cluster_id >= k {
                return Err(Error::InvalidSnapshot(format!(
                    "{}: cluster {} is not below k={}",
                    state.name, state.cluster_id, k
                )));
            }
            if !in_unit_range(&state.rgb) {
                return Err(Error::InvalidSnapshot(format!(
                    "{}: rgb out of range: {:?}",
                    state.name, state.rgb
                )));
            }
        }

        Ok(())
    }

    /// クラスタごとの件数
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.meta.k];
        for state in &self.states {
            if let Some(size) = sizes.get_mut(state.cluster_id) {
                *size += 1;
            }
        }
        sizes
    }

    /// 指定クラスタに属する旗（入力順）
    pub fn members(&self, cluster_id: usize) -> impl Iterator<Item = &FlagState> {
        self.states.iter().filter(move |s| s.cluster_id == cluster_id)
    }
}

fn in_unit_range(rgb: &Rgb) -> bool {
    rgb.iter().all(|c| c.is_finite() && (0.0..=1.0).contains(c))
}
