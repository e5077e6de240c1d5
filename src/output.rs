//! File naming and saving of rendered page images.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::PreviewError;
use crate::params::format_extension;

/// Generate an output filename from the editor text and format.
///
/// Sanitizes the first line of the text to kebab-case, appends a unix
/// timestamp, and adds the appropriate file extension.
#[must_use]
pub fn auto_filename(text: &str, format: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let sanitized = sanitize_for_filename(first_line, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let ext = format_extension(format);
    format!("{sanitized}-{timestamp}.{ext}")
}

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // Prevents leading hyphen

    for ch in input.chars().take(max_len * 2) {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "book".to_string()
    } else {
        result
    }
}

/// Save the canvas PNG bytes to a file, converting format if necessary.
///
/// # Errors
///
/// Returns an error if the file cannot be written or format conversion fails.
pub fn save_page(png: &[u8], target_format: &str, output_path: &Path) -> Result<(), PreviewError> {
    if target_format == "png" {
        return std::fs::write(output_path, png).map_err(PreviewError::Io);
    }
    convert_and_save(png, target_format, output_path)
}

/// Convert PNG bytes to the target format and save.
fn convert_and_save(
    data: &[u8],
    target_format: &str,
    output_path: &Path,
) -> Result<(), PreviewError> {
    let img = image::load_from_memory(data)
        .map_err(|e| PreviewError::Decode(format!("Failed to decode page: {e}")))?;

    let image_format = match target_format {
        "jpeg" => image::ImageFormat::Jpeg,
        "webp" => image::ImageFormat::WebP,
        other => {
            return Err(PreviewError::Decode(format!("Unsupported format: {other}")));
        }
    };

    // JPEG has no alpha channel; flatten before encoding.
    let img = if image_format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    img.save_with_format(output_path, image_format)
        .map_err(|e| PreviewError::Decode(format!("Failed to save as {target_format}: {e}")))
}

/// Resolve the output path: use the explicit path or auto-generate one.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, text: &str, format: &str) -> PathBuf {
    match explicit {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(auto_filename(text, format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_basic() {
        assert_eq!(sanitize_for_filename("Hello World", 50), "hello-world");
    }

    #[test]
    fn sanitize_formatting_codes() {
        assert_eq!(
            sanitize_for_filename("&cMinecraft &lbook editor!", 50),
            "cminecraft-lbook-editor"
        );
    }

    #[test]
    fn sanitize_truncates() {
        let long = "a".repeat(100);
        assert!(sanitize_for_filename(&long, 10).len() <= 10);
    }

    #[test]
    fn sanitize_empty() {
        assert_eq!(sanitize_for_filename("", 50), "book");
        assert_eq!(sanitize_for_filename("&&&", 50), "book");
    }

    #[test]
    fn auto_filename_uses_first_line_only() {
        let name = auto_filename("My book\nsecond line ignored", "png");
        assert!(name.starts_with("my-book-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn auto_filename_jpeg_extension() {
        let name = auto_filename("test", "jpeg");
        assert_eq!(Path::new(&name).extension().unwrap(), "jpg");
    }

    #[test]
    fn resolve_explicit() {
        let path = resolve_output_path(Some("page.png"), "ignored", "png");
        assert_eq!(path, PathBuf::from("page.png"));
    }

    #[test]
    fn save_png_writes_bytes_verbatim() {
        let dir = std::env::temp_dir().join("bookpress_output_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("page.png");

        let png = crate::canvas::PageCanvas::new().to_png().unwrap();
        save_page(&png, "png", &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), png);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_jpeg_converts() {
        let dir = std::env::temp_dir().join("bookpress_output_jpeg_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("page.jpg");

        let png = crate::canvas::PageCanvas::new().to_png().unwrap();
        save_page(&png, "jpeg", &path).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8], "JPEG magic bytes");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
