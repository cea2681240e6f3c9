//! クラスタ配色

use serde::{Deserialize, Serialize};

const DEFAULT_COLORS: &[&str] = &["#e41a1c", "#377eb8", "#4daf4a", "#ff7f00"];

/// クラスタ番号 → 表示色。色数が k より少なければ循環する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// 空のリストは既定の配色に置き換える
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }

    pub fn color(&self, cluster_id: usize) -> &str {
        &self.colors[cluster_id % self.colors.len()]
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// 先頭 k 色
    pub fn take(&self, k: usize) -> Vec<&str> {
        (0..k).map(|i| self.color(i)).collect()
    }
}

impl From<Vec<String>> for Palette {
    fn from(colors: Vec<String>) -> Self {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<String> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}
