//! ダッシュボードHTMLの生成
//!
//! 3Dグラフ（Plotly.js）と、クラスタごとの折りたたみ可能なサムネイル一覧。

use super::figure::build_figure;
use crate::error::Result;
use flag_colors_common::{Palette, Snapshot};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const GRID_COLUMNS: usize = 4;

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 1100px; margin: 0 auto; padding: 1rem; color: #222; }
#chart { width: 100%; height: 640px; }
details { margin: 0.75rem 0; border: 1px solid #ddd; border-radius: 4px; padding: 0.5rem 0.75rem; }
summary { cursor: pointer; font-size: 1.15rem; font-weight: bold; }
.swatch { display: inline-block; width: 0.9em; height: 0.9em; margin-right: 0.4em; vertical-align: middle; border: 1px solid #000; }
.grid { display: grid; gap: 0.75rem; margin-top: 0.75rem; }
figure { margin: 0; text-align: center; }
figcaption { font-size: 0.85rem; color: #555; }
"#;

pub const DEFAULT_TITLE: &str = "US State Flags: RGB Clustering";
const DESCRIPTION: &str = "Each flag is represented as a single RGB point (mean color), clustered \
into groups using k-means. Explore the clusters and flag thumbnails below!";

/// ページ生成の設定
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    /// サムネイルパスの前に付けるベース（空ならページからの相対パス）
    pub thumb_base: String,
    /// サムネイルの表示幅 (px)
    pub thumb_display_width: u32,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            thumb_base: String::new(),
            thumb_display_width: 80,
        }
    }
}

impl PageOptions {
    pub fn thumb_src(&self, thumb: &str) -> String {
        if self.thumb_base.is_empty() {
            thumb.to_string()
        } else {
            format!("{}/{}", self.thumb_base.trim_end_matches('/'), thumb)
        }
    }
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `<script>` 内に埋め込むJSON。`</script>` で閉じられないよう `</` をエスケープ
fn script_json(value: &serde_json::Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn cluster_section(snapshot: &Snapshot, palette: &Palette, options: &PageOptions, cluster_id: usize) -> String {
    let members: Vec<_> = snapshot.members(cluster_id).collect();

    let mut html = String::new();
    html.push_str("<details open>\n");
    html.push_str(&format!(
        "  <summary><span class=\"swatch\" style=\"background:{}\"></span>Cluster {} ({})</summary>\n",
        escape_html(palette.color(cluster_id)),
        cluster_id,
        members.len()
    ));
    html.push_str(&format!(
        "  <div class=\"grid\" style=\"grid-template-columns: repeat({}, 1fr)\">\n",
        GRID_COLUMNS
    ));

    for state in members {
        let name = escape_html(&state.name);
        html.push_str("    <figure>\n");
        html.push_str(&format!(
            "      <img src=\"{}\" width=\"{}\" alt=\"{}\" loading=\"lazy\">\n",
            escape_html(&options.thumb_src(&state.thumbnail_path)),
            options.thumb_display_width,
            name
        ));
        html.push_str(&format!("      <figcaption>{}</figcaption>\n", name));
        html.push_str("    </figure>\n");
    }

    html.push_str("  </div>\n");
    html.push_str("</details>\n");
    html
}

pub fn render_page(snapshot: &Snapshot, palette: &Palette, options: &PageOptions) -> Result<String> {
    let figure = build_figure(snapshot, palette);
    let title = escape_html(&options.title);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", title));
    html.push_str(&format!("<script src=\"{}\"></script>\n", PLOTLY_CDN));
    html.push_str(&format!("<style>{}</style>\n", STYLE));
    html.push_str("</head>\n<body>\n");

    html.push_str(&format!("<h1>{}</h1>\n", title));
    html.push_str(&format!("<p>{}</p>\n", DESCRIPTION));
    html.push_str(&format!(
        "<p class=\"meta\">k = {}, n = {}, created {}</p>\n",
        snapshot.meta.k,
        snapshot.meta.n,
        escape_html(&snapshot.meta.created_at)
    ));
    html.push_str("<div id=\"chart\"></div>\n");

    for cluster_id in 0..snapshot.meta.k {
        html.push_str(&cluster_section(snapshot, palette, options, cluster_id));
    }

    html.push_str("<script>\n");
    html.push_str(&format!("const figure = {};\n", script_json(&figure)?));
    html.push_str("Plotly.newPlot('chart', figure.data, figure.layout, { responsive: true });\n");
    html.push_str("</script>\n");
    html.push_str("</body>\n</html>\n");

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape_html("New York"), "New York");
    }

    #[test]
    fn test_script_json_escapes_closing_tag() {
        let value = serde_json::json!({ "name": "</script><b>" });
        let out = script_json(&value).unwrap();
        assert!(!out.contains("</script>"));
        let back: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_thumb_src() {
        let relative = PageOptions::default();
        assert_eq!(relative.thumb_src("thumbs/ohio.jpg"), "thumbs/ohio.jpg");

        let absolute = PageOptions {
            thumb_base: "file:///data/build/".into(),
            ..Default::default()
        };
        assert_eq!(absolute.thumb_src("thumbs/ohio.jpg"), "file:///data/build/thumbs/ohio.jpg");
    }
}
