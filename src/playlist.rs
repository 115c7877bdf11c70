use crate::catalog::Catalog;
use crate::errors::AggregateError;
use crate::parser::{rewrite_group_title, PLAYLIST_HEADER};
use std::fs;
use std::path::Path;
use tracing::info;

/// Renders the catalog: header line, then for every category in ascending order its
/// entries in insertion order, each as a metadata line (group-title rewritten to the
/// category) followed by the stream URL.
pub fn render(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(64 + catalog.len() * 160);
    out.push_str(PLAYLIST_HEADER);
    out.push('\n');

    for (category, bucket) in catalog.iter() {
        for (url, metadata) in bucket {
            out.push_str(&rewrite_group_title(metadata, category.as_str()));
            out.push('\n');
            out.push_str(url);
            out.push('\n');
        }
    }
    out
}

/// Writes the rendered playlist next to the target and renames it into place,
/// so a failed write never leaves a truncated playlist behind.
pub fn write_playlist(path: &Path, catalog: &Catalog) -> Result<(), AggregateError> {
    let output_err = |e| AggregateError::Output(path.to_path_buf(), e);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(output_err)?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = fs::write(&tmp_path, render(catalog)).and_then(|_| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(output_err(e));
    }

    info!("Wrote {} channels to {}", catalog.len(), path.display());
    Ok(())
}
