// src/emit.rs

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

/// Pretty-print `value` as JSON to `path`.
///
/// Parent directories are created; the file is written to a dot-prefixed temp
/// file next to the target and renamed over it.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    // 1) Make sure the directory exists
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;

    // 2) Serialize into ".<name>.tmp"
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("no file name in {:?}", path))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    // 3) Swap into place; the temp file never outlives a failure
    let swapped = write_tmp(&tmp_path, path, value).and_then(|()| {
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))
    });
    if let Err(e) = swapped {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    info!(path = %path.display(), "wrote");
    Ok(())
}

fn write_tmp<T: Serialize + ?Sized>(tmp_path: &Path, path: &Path, value: &T) -> Result<()> {
    let tmp = fs::File::create(tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    let mut w = BufWriter::new(tmp);
    serde_json::to_writer_pretty(&mut w, value)
        .with_context(|| format!("serializing JSON for {:?}", path))?;
    w.write_all(b"\n")?;
    w.flush().with_context(|| format!("flushing {:?}", tmp_path))?;
    Ok(())
}
