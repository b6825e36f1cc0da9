//! Artifact codec / 成果物のシリアライズ
//!
//! JSON document `{"kanaMap": {...}, "groupedStore": {...}}`. Key order at
//! every level is written and read back exactly as stored.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::error::ArtifactError;
use super::store::PostalArtifact;

pub fn encode(artifact: &PostalArtifact) -> Result<Vec<u8>, ArtifactError> {
    Ok(serde_json::to_vec(artifact)?)
}

pub fn decode(bytes: &[u8]) -> Result<PostalArtifact, ArtifactError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write the artifact atomically: temp file in the same directory, then rename
pub fn save_artifact(path: &Path, artifact: &PostalArtifact) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = encode(artifact)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::info!("Artifact written: {:?} ({} bytes)", path, bytes.len());
    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<PostalArtifact, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes)
}
