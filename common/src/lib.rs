//! flag-colors Common Library
//!
//! CLIとビューアで共有される型とユーティリティ:
//! スナップショットのデータモデル、k-meansクラスタリング、クラスタ配色

pub mod error;
pub mod kmeans;
pub mod palette;
pub mod types;

pub use error::{Error, Result};
pub use kmeans::{fit, KMeansConfig, KMeansFit};
pub use palette::Palette;
pub use types::{FlagState, Rgb, Snapshot, SnapshotMeta};
