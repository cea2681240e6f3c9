use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flag-colors")]
#[command(about = "旗画像の平均色クラスタリングと3Dビューア", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（省略時は ~/.config/flag-colors/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像フォルダから平均色を計算し、クラスタリング結果をJSONに保存
    Build(BuildArgs),

    /// スナップショットからダッシュボードHTMLを生成
    View {
        /// スナップショットJSON（省略時: ビルドディレクトリ/points.json）
        snapshot: Option<PathBuf>,

        /// 出力HTML（省略時: スナップショットと同じ場所の index.html）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ページタイトル
        #[arg(short, long)]
        title: Option<String>,
    },

    /// ダッシュボードをローカルで配信
    Serve {
        /// スナップショットJSON（省略時: ビルドディレクトリ/points.json）
        snapshot: Option<PathBuf>,

        /// ポート番号
        #[arg(short, long)]
        port: Option<u16>,

        /// バインドするアドレス
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// build から view まで一括実行
    Run(BuildArgs),

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// 画像フォルダのパス
    pub folder: Option<PathBuf>,

    /// 出力ディレクトリ（サムネイルと points.json）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// クラスタ数
    #[arg(short)]
    pub k: Option<usize>,

    /// 乱数シード
    #[arg(long)]
    pub seed: Option<u64>,

    /// 必要な画像枚数
    #[arg(long)]
    pub expected: Option<usize>,

    /// サムネイルの最大幅 (px)
    #[arg(long)]
    pub thumb_width: Option<u32>,
}

impl BuildArgs {
    /// 指定された項目だけ設定を上書きする
    pub fn apply(&self, config: &mut Config) {
        if let Some(folder) = &self.folder {
            config.input_dir = folder.clone();
        }
        if let Some(output) = &self.output {
            config.build_dir = output.clone();
        }
        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(expected) = self.expected {
            config.expected_count = expected;
        }
        if let Some(width) = self.thumb_width {
            config.thumb_width = width;
        }
    }
}
