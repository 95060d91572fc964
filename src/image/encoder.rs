use super::ImageKind;
use crate::Result;
use base64::{Engine as _, engine::general_purpose};
use std::path::Path;
use tracing::debug;

/// Reads the file and returns its bytes as standard padded base64.
pub async fn encode_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    debug!("Encoding {} bytes from {}", bytes.len(), path.display());
    Ok(encode_bytes(&bytes))
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub fn data_uri(kind: ImageKind, base64: &str) -> String {
    format!("data:{};base64,{}", kind.mime_type(), base64)
}
