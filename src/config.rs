use crate::error::{FlagColorsError, Result};
use flag_colors_common::{KMeansConfig, Palette};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `~/.config/flag-colors/config.json` の内容。
/// 項目が欠けていれば既定値で補う
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_dir: PathBuf,
    pub build_dir: PathBuf,
    pub expected_count: usize,
    pub k: usize,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub thumb_width: u32,
    pub jpeg_quality: u8,
    pub palette: Palette,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("state_flags_png"),
            build_dir: PathBuf::from("build"),
            expected_count: 50,
            k: 4,
            seed: 42,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            thumb_width: 120,
            jpeg_quality: 85,
            palette: Palette::default(),
            port: 8501,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FlagColorsError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("flag-colors").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(FlagColorsError::Config("k は1以上にしてください".into()));
        }
        if self.thumb_width == 0 {
            return Err(FlagColorsError::Config("thumb_width は1以上にしてください".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(FlagColorsError::Config(format!(
                "jpeg_quality は1〜100で指定してください: {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    pub fn kmeans(&self) -> KMeansConfig {
        KMeansConfig::new(self.k)
            .with_seed(self.seed)
            .with_n_init(self.n_init)
            .with_max_iter(self.max_iter)
            .with_tolerance(self.tolerance)
    }

    /// スナップショットの既定パス
    pub fn snapshot_path(&self) -> PathBuf {
        self.build_dir.join(crate::snapshot::SNAPSHOT_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.expected_count, 50);
        assert_eq!(config.k, 4);
        assert_eq!(config.seed, 42);
        assert_eq!(config.thumb_width, 120);
        assert_eq!(config.snapshot_path(), PathBuf::from("build/points.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"k": 3, "seed": 7}"#).unwrap();
        assert_eq!(config.k, 3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.expected_count, 50);
        assert_eq!(config.palette, Palette::default());

        let kmeans = config.kmeans();
        assert_eq!(kmeans.k, 3);
        assert_eq!(kmeans.seed, 7);
        assert_eq!(kmeans.n_init, 10);
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let config = Config {
            k: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FlagColorsError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let config = Config {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
