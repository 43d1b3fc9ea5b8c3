//! Image file to embedded data-URL encoding for vision requests.

use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// MIME type used when the extension is missing or unrecognized.
pub const FALLBACK_MIME: &str = "image/png";

/// Read an image file and encode it as a `data:` URL.
///
/// The MIME type is guessed from the file extension.
pub async fn encode_as_data_url(path: &Path) -> io::Result<String> {
    let mime = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME);
    let bytes = tokio::fs::read(path).await?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_fixture(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, bytes).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_encodes_png_with_guessed_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "foto.png", &[0x89, 0x50, 0x4e, 0x47]).await;

        let url = encode_as_data_url(&path).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(url, format!("data:image/png;base64,{}", STANDARD.encode([0x89, 0x50, 0x4e, 0x47])));
    }

    #[tokio::test]
    async fn test_jpeg_extension_maps_to_jpeg_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "foto.jpg", b"jpegdata").await;

        let url = encode_as_data_url(&path).await.unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_unknown_extension_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "captura.zzz", b"data").await;

        let url = encode_as_data_url(&path).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-existe.png");
        assert!(encode_as_data_url(&path).await.is_err());
    }
}
