// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Reference image normalisation — guarantees the image handed to the
// document writer is in an accepted raster format, converting to PNG
// otherwise.

use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use tagwerk_core::error::TagwerkError;
use tracing::{debug, info, instrument};

/// Formats the writer accepts as-is.
const ACCEPTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::Gif,
];

/// Normalises the run's reference image.
pub struct ImageNormalizer;

impl ImageNormalizer {
    /// Return a path to the reference image in an accepted format.
    ///
    /// If the file already is PNG, JPEG, BMP, or GIF (judged by content,
    /// not extension) the original path comes back unchanged. Any other
    /// decodable format is re-encoded as PNG at `{stem}.png` next to the
    /// original and that sibling path is returned. An undecodable file
    /// is fatal: without a reference image no row can be built.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn normalize(path: impl AsRef<Path>) -> Result<PathBuf, TagwerkError> {
        let path_ref = path.as_ref();

        let reader = ImageReader::open(path_ref)
            .map_err(|err| {
                TagwerkError::ReferenceImage(format!(
                    "cannot open {}: {}",
                    path_ref.display(),
                    err
                ))
            })?
            .with_guessed_format()
            .map_err(|err| {
                TagwerkError::ReferenceImage(format!(
                    "cannot probe {}: {}",
                    path_ref.display(),
                    err
                ))
            })?;

        if let Some(format) = reader.format() {
            if ACCEPTED_FORMATS.contains(&format) {
                debug!(?format, "Reference image already in accepted format");
                return Ok(path_ref.to_path_buf());
            }
        }

        let decoded = reader.decode().map_err(|err| {
            TagwerkError::ReferenceImage(format!(
                "unrecognised image format for {}: {}",
                path_ref.display(),
                err
            ))
        })?;

        let converted = path_ref.with_extension("png");
        decoded
            .save_with_format(&converted, ImageFormat::Png)
            .map_err(|err| {
                TagwerkError::ReferenceImage(format!(
                    "failed to write converted image {}: {}",
                    converted.display(),
                    err
                ))
            })?;

        info!(
            converted = %converted.display(),
            "Reference image converted to PNG"
        );
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, image::Rgb([10, 200, 30])))
    }

    #[test]
    fn accepted_formats_pass_through_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        for (name, format) in [
            ("ref.png", ImageFormat::Png),
            ("ref.jpg", ImageFormat::Jpeg),
            ("ref.bmp", ImageFormat::Bmp),
        ] {
            let path = dir.path().join(name);
            sample_image().save_with_format(&path, format).unwrap();
            let result = ImageNormalizer::normalize(&path).unwrap();
            assert_eq!(result, path);
        }
    }

    #[test]
    fn tiff_is_converted_to_png_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.tif");
        sample_image()
            .save_with_format(&path, ImageFormat::Tiff)
            .unwrap();

        let result = ImageNormalizer::normalize(&path).unwrap();
        assert_eq!(result, dir.path().join("ref.png"));
        // The sibling must be a decodable PNG of the same dimensions.
        let converted = image::open(&result).unwrap();
        assert_eq!(converted.width(), 16);
        assert_eq!(converted.height(), 16);
        // Original is untouched.
        assert!(path.exists());
    }

    #[test]
    fn format_judged_by_content_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        // A PNG wearing a .tif extension should still pass through.
        let path = dir.path().join("mislabeled.tif");
        sample_image()
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let result = ImageNormalizer::normalize(&path).unwrap();
        assert_eq!(result, path);
    }

    #[test]
    fn undecodable_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.dat");
        std::fs::write(&path, b"\x00\x01\x02 nothing image-like").unwrap();

        let result = ImageNormalizer::normalize(&path);
        assert!(matches!(result, Err(TagwerkError::ReferenceImage(_))));
    }
}
