use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlagColorsError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error(
        "画像の枚数が一致しません: {found}枚検出、{expected}枚必要\n検出した旗: {}",
        .names.join(", ")
    )]
    CountMismatch {
        expected: usize,
        found: usize,
        names: Vec<String>,
    },

    #[error("画像読み込みエラー: {0}")]
    ImageDecode(String),

    #[error("サムネイル保存エラー: {0}")]
    Thumbnail(String),

    #[error("読み込めた画像が{decoded}枚しかありません（クラスタ数 {k}）")]
    NotEnoughImages { decoded: usize, k: usize },

    #[error("スナップショットが見つかりません: {0}（先に `flag-colors build` を実行してください）")]
    SnapshotNotFound(String),

    #[error("ビューアサーバーエラー: {0}")]
    Server(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] flag_colors_common::Error),
}

pub type Result<T> = std::result::Result<T, FlagColorsError>;
