use super::ImageKind;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes an upload to a fresh temp file that outlives this call.
///
/// The file keeps the original extension so the image kind can be recovered
/// from the path alone. Callers own the returned path and must remove it.
pub async fn write_temp_image(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    ImageKind::from_file_name(file_name)?;

    let suffix = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    let dir = dir.to_path_buf();
    let bytes = bytes.to_vec();

    let path = tokio::task::spawn_blocking(move || -> Result<PathBuf> {
        use std::io::Write;

        let mut file = tempfile::Builder::new()
            .prefix("medscan-")
            .suffix(&suffix)
            .tempfile_in(&dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        let (_, path) = file.keep().map_err(|e| Error::Io(e.error))?;
        Ok(path)
    })
    .await
    .map_err(|e| Error::internal(format!("Temp file writer panicked: {e}")))??;

    debug!("Stored upload '{}' at {}", file_name, path.display());
    Ok(path)
}

/// Best-effort removal for files nobody will read again.
pub async fn discard_temp_image(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed temp image {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove temp image {}: {}", path.display(), e),
    }
}
