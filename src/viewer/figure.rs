//! Plotly.js 用の3D散布図（JSON）を組み立てる
//!
//! トレース構成:
//! - 旗ごとの点（クラスタ色）
//! - 重心（大きめのマーカー）
//! - 各点から所属クラスタの重心への線

use super::page::escape_html;
use flag_colors_common::{Palette, Rgb, Snapshot};
use serde_json::{json, Value};

const POINT_SIZE: u32 = 6;
const CENTROID_SIZE: u32 = 14;
const EDGE_WIDTH: u32 = 2;
const SCENE_BACKGROUND: &str = "rgb(240,240,240)";

pub fn format_rgb(rgb: &Rgb) -> String {
    format!("[{:.3}, {:.3}, {:.3}]", rgb[0], rgb[1], rgb[2])
}

fn column(points: &[Rgb], dim: usize) -> Vec<f64> {
    points.iter().map(|p| p[dim]).collect()
}

fn points_trace(snapshot: &Snapshot, palette: &Palette) -> Value {
    let points: Vec<Rgb> = snapshot.states.iter().map(|s| s.rgb).collect();
    let colors: Vec<&str> = snapshot.states.iter().map(|s| palette.color(s.cluster_id)).collect();
    let text: Vec<String> = snapshot
        .states
        .iter()
        .map(|s| {
            format!(
                "{}<br>RGB: {}<br>Cluster: {}",
                escape_html(&s.name),
                format_rgb(&s.rgb),
                s.cluster_id
            )
        })
        .collect();

    json!({
        "type": "scatter3d",
        "mode": "markers",
        "name": "States",
        "x": column(&points, 0),
        "y": column(&points, 1),
        "z": column(&points, 2),
        "marker": {
            "size": POINT_SIZE,
            "color": colors,
            "line": { "width": 1, "color": "black" },
        },
        "text": text,
        "hoverinfo": "text",
    })
}

fn centroid_trace(snapshot: &Snapshot, palette: &Palette) -> Value {
    let text: Vec<String> = snapshot
        .centroids
        .iter()
        .enumerate()
        .map(|(i, c)| format!("Centroid {}: {}", i, format_rgb(c)))
        .collect();

    json!({
        "type": "scatter3d",
        "mode": "markers",
        "name": "Centroids",
        "x": column(&snapshot.centroids, 0),
        "y": column(&snapshot.centroids, 1),
        "z": column(&snapshot.centroids, 2),
        "marker": {
            "size": CENTROID_SIZE,
            "color": palette.take(snapshot.centroids.len()),
            "line": { "width": 3, "color": "black" },
        },
        "text": text,
        "hoverinfo": "text",
    })
}

fn edge_traces<'a>(snapshot: &'a Snapshot, palette: &'a Palette) -> impl Iterator<Item = Value> + 'a {
    snapshot.states.iter().filter_map(move |s| {
        let c = snapshot.centroids.get(s.cluster_id)?;
        let p = s.rgb;
        Some(json!({
            "type": "scatter3d",
            "mode": "lines",
            "x": [p[0], c[0]],
            "y": [p[1], c[1]],
            "z": [p[2], c[2]],
            "line": { "color": palette.color(s.cluster_id), "width": EDGE_WIDTH },
            "hoverinfo": "skip",
            "showlegend": false,
        }))
    })
}

fn axis(title: &str) -> Value {
    json!({
        "title": { "text": title },
        "range": [0, 1],
        "backgroundcolor": SCENE_BACKGROUND,
        "showbackground": true,
        "showspikes": false,
        "showticklabels": true,
        "ticks": "outside",
        "tickmode": "array",
        "tickvals": [0, 0.2, 0.4, 0.6, 0.8, 1],
        "ticktext": ["0", "0.2", "0.4", "0.6", "0.8", "1"],
    })
}

fn layout() -> Value {
    json!({
        "scene": {
            "xaxis": axis("R"),
            "yaxis": axis("G"),
            "zaxis": axis("B"),
            "dragmode": "turntable",
            "aspectmode": "cube",
            "bgcolor": SCENE_BACKGROUND,
            "camera": { "eye": { "x": 1.5, "y": 1.5, "z": 1.5 } },
        },
        "margin": { "l": 0, "r": 0, "b": 0, "t": 40 },
        "legend": { "x": 0, "y": 1 },
    })
}

/// `{ data: [...], layout: {...} }`
pub fn build_figure(snapshot: &Snapshot, palette: &Palette) -> Value {
    let mut data = vec![points_trace(snapshot, palette), centroid_trace(snapshot, palette)];
    data.extend(edge_traces(snapshot, palette));

    json!({
        "data": data,
        "layout": layout(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flag_colors_common::FlagState;

    fn snapshot() -> Snapshot {
        let state = |name: &str, rgb: Rgb, cluster_id: usize| FlagState {
            name: name.to_string(),
            source_file: format!("{}.png", name),
            thumbnail_path: format!("thumbs/{}.jpg", name),
            rgb,
            cluster_id,
        };
        Snapshot::new(
            2,
            "2026-10-18T00:00:00+00:00".into(),
            vec![[0.9, 0.1, 0.1], [0.1, 0.1, 0.9]],
            vec![
                state("red", [1.0, 0.0, 0.0], 0),
                state("blue", [0.0, 0.0, 1.0], 1),
                state("a&b", [0.8, 0.2, 0.2], 0),
            ],
        )
    }

    #[test]
    fn test_trace_count() {
        let figure = build_figure(&snapshot(), &Palette::default());
        // 点 + 重心 + 線3本
        assert_eq!(figure["data"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_points_colored_by_cluster() {
        let figure = build_figure(&snapshot(), &Palette::default());
        let points = &figure["data"][0];

        assert_eq!(points["x"], json!([1.0, 0.0, 0.8]));
        assert_eq!(points["marker"]["color"], json!(["#e41a1c", "#377eb8", "#e41a1c"]));
        assert_eq!(points["text"][0], "red<br>RGB: [1.000, 0.000, 0.000]<br>Cluster: 0");
        assert_eq!(points["text"][2], "a&amp;b<br>RGB: [0.800, 0.200, 0.200]<br>Cluster: 0");
    }

    #[test]
    fn test_centroids_use_palette() {
        let palette = Palette::new(vec!["#111111".into(), "#222222".into()]);
        let figure = build_figure(&snapshot(), &palette);
        let centroids = &figure["data"][1];

        assert_eq!(centroids["marker"]["size"], CENTROID_SIZE);
        assert_eq!(centroids["marker"]["color"], json!(["#111111", "#222222"]));
        assert_eq!(centroids["z"], json!([0.1, 0.9]));
    }

    #[test]
    fn test_edges_connect_point_to_centroid() {
        let figure = build_figure(&snapshot(), &Palette::default());
        let edge = &figure["data"][3];

        assert_eq!(edge["mode"], "lines");
        assert_eq!(edge["x"], json!([0.0, 0.1]));
        assert_eq!(edge["z"], json!([1.0, 0.9]));
        assert_eq!(edge["line"]["color"], "#377eb8");
        assert_eq!(edge["showlegend"], false);
    }

    #[test]
    fn test_layout_axes() {
        let figure = build_figure(&snapshot(), &Palette::default());
        let scene = &figure["layout"]["scene"];

        assert_eq!(scene["xaxis"]["title"]["text"], "R");
        assert_eq!(scene["zaxis"]["range"], json!([0, 1]));
        assert_eq!(scene["dragmode"], "turntable");
        assert_eq!(scene["camera"]["eye"]["x"], 1.5);
    }
}
