//! スナップショット（points.json）の読み書き

use crate::error::{FlagColorsError, Result};
use flag_colors_common::Snapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_FILE_NAME: &str = "points.json";

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| SNAPSHOT_FILE_NAME.into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// 同じディレクトリの一時ファイルに書いてからリネームする
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    snapshot.validate()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    {
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;

    Ok(())
}

/// ビューア起動時の読み込み。ファイルが無ければ `SnapshotNotFound`
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.is_file() {
        return Err(FlagColorsError::SnapshotNotFound(path.display().to_string()));
    }
    Ok(Snapshot::load(path)?)
}
