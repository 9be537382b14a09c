//! On-disk cache of computed embeddings
//!
//! Embeddings are stored with bincode. Writes go to a `.tmp` sibling first and
//! are renamed into place, so a crashed save never leaves a truncated cache.

use std::path::Path;

use crate::error::{MuopDbError, MuopDbResult};

/// Write embeddings to `path`, replacing any previous cache
pub fn save_embeddings(path: &Path, embeddings: &[Vec<f32>]) -> MuopDbResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| cache_io("create", parent, e))?;
    }

    let data = bincode::serialize(embeddings)?;
    let temp_file = path.with_extension("tmp");
    std::fs::write(&temp_file, &data).map_err(|e| cache_io("write", &temp_file, e))?;
    std::fs::rename(&temp_file, path).map_err(|e| cache_io("rename", path, e))?;

    tracing::info!(
        path = %path.display(),
        count = embeddings.len(),
        bytes = data.len(),
        "Saved embeddings"
    );
    Ok(())
}

/// Read embeddings previously written by [`save_embeddings`]
pub fn load_embeddings(path: &Path) -> MuopDbResult<Vec<Vec<f32>>> {
    let data = std::fs::read(path).map_err(|e| cache_io("read", path, e))?;
    let embeddings: Vec<Vec<f32>> = bincode::deserialize(&data)?;

    tracing::debug!(path = %path.display(), count = embeddings.len(), "Loaded embeddings");
    Ok(embeddings)
}

fn cache_io(action: &str, path: &Path, err: std::io::Error) -> MuopDbError {
    MuopDbError::Cache(format!("failed to {} {}: {}", action, path.display(), err))
}
