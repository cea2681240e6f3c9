//! ビューア: スナップショットを読み込んでダッシュボードを描画する
//!
//! 読み取り専用。スナップショットやサムネイルへの書き戻しはしない。

pub mod figure;
pub mod page;
pub mod server;

pub use figure::build_figure;
pub use page::{escape_html, render_page, PageOptions};
pub use server::ViewerServer;

use crate::error::Result;
use crate::snapshot::load_snapshot;
use flag_colors_common::Palette;
use std::path::{Path, PathBuf};

pub const PAGE_FILE_NAME: &str = "index.html";

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// HTMLの出力先。未指定ならスナップショットと同じディレクトリ
pub fn default_page_path(snapshot_path: &Path) -> PathBuf {
    parent_dir(snapshot_path).join(PAGE_FILE_NAME)
}

/// 絶対パスを `file://` URLにする。パス区切り以外の予約文字はパーセントエンコード
pub fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut url = String::from("file://");
    if !raw.starts_with('/') {
        url.push('/');
    }
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                url.push(byte as char)
            }
            _ => url.push_str(&format!("%{:02X}", byte)),
        }
    }
    url
}

/// HTMLとスナップショットが別のディレクトリにある場合、サムネイルは絶対パスで参照する
fn thumb_base(snapshot_path: &Path, page_path: &Path) -> Result<String> {
    let snapshot_dir = std::fs::canonicalize(parent_dir(snapshot_path))?;
    let page_dir = std::fs::canonicalize(parent_dir(page_path))?;

    if snapshot_dir == page_dir {
        Ok(String::new())
    } else {
        Ok(file_url(&snapshot_dir))
    }
}

/// スナップショットからダッシュボードHTMLを書き出し、出力パスを返す
pub fn write_page(
    snapshot_path: &Path,
    output: Option<&Path>,
    palette: &Palette,
    options: &PageOptions,
) -> Result<PathBuf> {
    let snapshot = load_snapshot(snapshot_path)?;

    let page_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_page_path(snapshot_path));
    std::fs::create_dir_all(parent_dir(&page_path))?;

    let options = PageOptions {
        thumb_base: thumb_base(snapshot_path, &page_path)?,
        ..options.clone()
    };

    let html = render_page(&snapshot, palette, &options)?;
    std::fs::write(&page_path, html)?;

    Ok(page_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_path() {
        assert_eq!(
            default_page_path(Path::new("build/points.json")),
            PathBuf::from("build/index.html")
        );
        assert_eq!(default_page_path(Path::new("points.json")), PathBuf::from("./index.html"));
    }

    #[test]
    fn test_file_url() {
        assert_eq!(file_url(Path::new("/srv/build")), "file:///srv/build");
        assert_eq!(
            file_url(Path::new("/home/me/my build #1/50%")),
            "file:///home/me/my%20build%20%231/50%25"
        );
        assert_eq!(file_url(Path::new("/tmp/旗")), "file:///tmp/%E6%97%97");
    }
}
