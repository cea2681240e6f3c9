mod naming;

pub use naming::{state_name, thumbnail_stem};

use crate::error::{FlagColorsError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    /// ファイル名から生成した表示名
    pub name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(FlagColorsError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_image = path
            .extension()
            .map(|ext| is_image_extension(&ext.to_string_lossy()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        images.push(ImageInfo {
            path: path.to_path_buf(),
            name: state_name(&file_name),
            file_name,
        });
    }

    // ファイル名でソート（クラスタリング結果の再現性のため入力順を固定）
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("png"));
        assert!(is_image_extension("PNG"));
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("Jpeg"));
        assert!(!is_image_extension("gif"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("svg"));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(FlagColorsError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let temp_dir = dir.path();
        fs::create_dir_all(temp_dir.join("nested")).unwrap();

        File::create(temp_dir.join("texas.png")).unwrap().write_all(b"dummy").unwrap();
        File::create(temp_dir.join("new_york.JPG")).unwrap().write_all(b"dummy").unwrap();
        File::create(temp_dir.join("alaska.jpeg")).unwrap().write_all(b"dummy").unwrap();
        File::create(temp_dir.join("readme.txt")).unwrap().write_all(b"text").unwrap();
        File::create(temp_dir.join("nested").join("ohio.png")).unwrap();

        let result = scan_folder(temp_dir).unwrap();
        let names: Vec<&str> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["alaska.jpeg", "new_york.JPG", "texas.png"]);
        assert_eq!(result[1].name, "New York");
    }
}
