//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use flag_colors::config::Config;
use flag_colors::error::FlagColorsError;
use flag_colors::scanner;
use flag_colors::snapshot::load_snapshot;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(FlagColorsError::FolderNotFound(_))));
}

/// ファイルをフォルダとして渡した場合
#[test]
fn test_scan_file_instead_of_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let file = dir.path().join("flag.png");
    std::fs::write(&file, b"x").unwrap();

    assert!(matches!(
        scanner::scan_folder(&file),
        Err(FlagColorsError::FolderNotFound(_))
    ));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_folder(dir.path()).unwrap();
    assert!(result.is_empty());
}

/// 枚数不一致のメッセージに検出した旗が並ぶ
#[test]
fn test_count_mismatch_message() {
    let err = FlagColorsError::CountMismatch {
        expected: 50,
        found: 2,
        names: vec!["Ohio".to_string(), "Utah".to_string()],
    };
    let display = format!("{}", err);

    assert!(display.contains("50"));
    assert!(display.contains("2枚検出"));
    assert!(display.contains("Ohio, Utah"));
}

/// FlagColorsErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        FlagColorsError::Config("テスト設定エラー".to_string()),
        FlagColorsError::FolderNotFound("/path/to/folder".to_string()),
        FlagColorsError::ImageDecode("broken.png".to_string()),
        FlagColorsError::Thumbnail("thumbs/a.jpg".to_string()),
        FlagColorsError::NotEnoughImages { decoded: 1, k: 4 },
        FlagColorsError::SnapshotNotFound("build/points.json".to_string()),
        FlagColorsError::Server("127.0.0.1:80".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// スナップショット未作成時の案内
#[test]
fn test_snapshot_not_found() {
    let dir = tempdir().unwrap();
    let err = load_snapshot(&dir.path().join("points.json")).unwrap_err();

    assert!(matches!(err, FlagColorsError::SnapshotNotFound(_)));
    assert!(err.to_string().contains("flag-colors build"));
}

/// 壊れたスナップショット
#[test]
fn test_snapshot_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("points.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = load_snapshot(&path).unwrap_err();
    assert!(matches!(
        err,
        FlagColorsError::Common(flag_colors_common::Error::Json(_))
    ));
}

/// 不正な設定ファイル
#[test]
fn test_config_invalid_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"k": 0}"#).unwrap();

    assert!(matches!(Config::load_from(&path), Err(FlagColorsError::Config(_))));
}

/// 設定ファイルが無ければ既定値
#[test]
fn test_config_missing_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("missing.json")).unwrap();
    assert_eq!(config.k, 4);
    assert_eq!(config.expected_count, 50);
}

/// 設定の保存と読み込み
#[test]
fn test_config_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        seed: 1234,
        thumb_width: 64,
        ..Default::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.seed, 1234);
    assert_eq!(loaded.thumb_width, 64);
    assert_eq!(loaded.palette, config.palette);
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: FlagColorsError = io_err.into();

    assert!(matches!(err, FlagColorsError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: FlagColorsError = json_err.into();

    assert!(matches!(err, FlagColorsError::JsonParse(_)));
}

/// common::Errorは透過的に表示される
#[test]
fn test_common_error_transparent() {
    let common_err = flag_colors_common::Error::Clustering("k must be at least 1".to_string());
    let err: FlagColorsError = common_err.into();

    assert!(matches!(err, FlagColorsError::Common(_)));
    assert_eq!(format!("{}", err), "Clustering error: k must be at least 1");
}
