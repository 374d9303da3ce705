//! Uploaded blueprint images: naming rules and format checks.
//!
//! Images live under the media root in one directory per owner:
//! `user_{owner_id}/{filename}`. Paths stored in the database are relative
//! to the media root.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Image formats accepted for blueprint previews.
pub const SUPPORTED_IMAGE_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Longest file name kept from an upload (extension included).
const MAX_FILENAME_LEN: usize = 100;

/// Directory (relative to the media root) holding one user's uploads.
pub fn owner_dir(owner_id: DbId) -> String {
    format!("user_{owner_id}")
}

/// Relative storage path for an image uploaded by `owner_id`.
pub fn blueprint_image_path(owner_id: DbId, filename: &str) -> String {
    format!("{}/{filename}", owner_dir(owner_id))
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Directory parts are dropped, whitespace becomes `_`, and anything other
/// than ASCII letters, digits, `.`, `-` and `_` is removed. Leading dots are
/// stripped so the result can never be hidden or refer to a parent
/// directory. Returns `None` if nothing usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return None;
    }

    Some(truncate_keeping_extension(cleaned, MAX_FILENAME_LEN))
}

/// `name` with `_{n}` inserted before the extension, used when the plain
/// name is already taken.
pub fn with_suffix(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{n}.{ext}"),
        _ => format!("{name}_{n}"),
    }
}

/// Format and pixel size of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    #[serde(skip)]
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Check that `bytes` hold an image in one of [`SUPPORTED_IMAGE_FORMATS`].
///
/// Only the header is decoded; the pixel data is not validated.
pub fn inspect_image(bytes: &[u8]) -> Result<ImageInfo, CoreError> {
    let invalid = || {
        CoreError::Validation(
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
                .into(),
        )
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| invalid())?;
    let format = reader.format().ok_or_else(invalid)?;
    if !SUPPORTED_IMAGE_FORMATS.contains(&format) {
        return Err(invalid());
    }

    let (width, height) = reader.into_dimensions().map_err(|_| invalid())?;
    Ok(ImageInfo {
        format,
        width,
        height,
    })
}

fn truncate_keeping_extension(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    // `name` is ASCII-only at this point, so byte slicing is safe.
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() + 2 <= max => {
            let keep = max - ext.len() - 1;
            format!("{}.{ext}", &stem[..keep.min(stem.len())])
        }
        _ => name[..max].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn png_bytes() -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(3, 2);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn image_path_is_per_owner() {
        assert_eq!(blueprint_image_path(42, "foo.gif"), "user_42/foo.gif");
    }

    #[test]
    fn sanitize_drops_directories() {
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\belt.png").as_deref(),
            Some("belt.png")
        );
    }

    #[test]
    fn sanitize_cleans_characters() {
        assert_eq!(
            sanitize_filename("my main bus (v2).png").as_deref(),
            Some("my_main_bus_v2.png")
        );
        assert_eq!(sanitize_filename(".hidden.png").as_deref(), Some("hidden.png"));
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename(""), None);
    }

    #[test]
    fn sanitize_truncates_long_names() {
        let long = format!("{}.png", "a".repeat(300));
        let cleaned = sanitize_filename(&long).unwrap();
        assert_eq!(cleaned.len(), MAX_FILENAME_LEN);
        assert!(cleaned.ends_with(".png"));
    }

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(with_suffix("belt.png", 1), "belt_1.png");
        assert_eq!(with_suffix("README", 2), "README_2");
    }

    #[test]
    fn inspect_accepts_png() {
        let info = inspect_image(&png_bytes()).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!((info.width, info.height), (3, 2));
    }

    #[test]
    fn inspect_rejects_text() {
        assert!(inspect_image(b"0eNqVkt1ugzAMhd/F12kFhNA1").is_err());
    }
}
