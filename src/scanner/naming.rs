//! ファイル名 → 表示名・サムネイル名

use std::path::Path;

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// `new_york.png` → `New York`
///
/// `_` と `-` を空白にし、英字の連なりごとに先頭だけ大文字にする
pub fn state_name(file_name: &str) -> String {
    let stem = file_stem(file_name).replace(['_', '-'], " ");

    let mut out = String::with_capacity(stem.len());
    let mut prev_is_alpha = false;
    for ch in stem.chars() {
        if ch.is_alphabetic() {
            if prev_is_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(ch);
            prev_is_alpha = false;
        }
    }
    out
}

/// URLにそのまま使えるサムネイルのファイル名（拡張子なし）
pub fn thumbnail_stem(file_name: &str) -> String {
    let slug: String = file_stem(file_name)
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if slug.is_empty() {
        "flag".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_name() {
        assert_eq!(state_name("new_york.png"), "New York");
        assert_eq!(state_name("north-carolina.jpg"), "North Carolina");
        assert_eq!(state_name("TEXAS.PNG"), "Texas");
        assert_eq!(state_name("Flag_of_Ohio.svg.png"), "Flag Of Ohio.Svg");
    }

    #[test]
    fn test_state_name_digits_split_words() {
        assert_eq!(state_name("flag2x.png"), "Flag2X");
    }

    #[test]
    fn test_thumbnail_stem() {
        assert_eq!(thumbnail_stem("New York.png"), "new_york");
        assert_eq!(thumbnail_stem("rhode-island.JPG"), "rhode_island");
        assert_eq!(thumbnail_stem(".png"), "_png");
    }
}
