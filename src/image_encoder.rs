use std::fs;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};

use crate::error::AppResult;

/// Reads the file at `path` and returns its bytes as standard base64.
pub fn encode_image_base64(path: impl AsRef<Path>) -> AppResult<String> {
    let bytes = fs::read(path.as_ref())?;
    Ok(general_purpose::STANDARD.encode(bytes))
}

/// Mime type guessed from the file extension. Anything unrecognised is sent
/// as jpeg.
pub fn mime_for_path(path: impl AsRef<Path>) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

pub fn image_data_uri(mime: &str, image_b64: &str) -> String {
    format!("data:{};base64,{}", mime, image_b64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::io::Write;

    #[test]
    fn test_encode_reads_raw_bytes() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"hello").unwrap();
        assert_eq!(encode_image_base64(file.path()).unwrap(), "aGVsbG8=");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_image_base64(dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for_path("drawing.PNG"), "image/png");
        assert_eq!(mime_for_path("a/b/visual story.jpeg"), "image/jpeg");
        assert_eq!(mime_for_path("noext"), "image/jpeg");
        assert_eq!(mime_for_path("x.webp"), "image/webp");
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(
            image_data_uri("image/png", "aGVsbG8="),
            "data:image/png;base64,aGVsbG8="
        );
    }
}
