use crate::error::{HeadcountError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Decode an image file and shrink it to fit the display bound.
pub fn load_for_display(path: &Path, bound: (u32, u32)) -> Result<DynamicImage> {
    let image = ImageReader::open(path)
        .map_err(|e| HeadcountError::ImageLoad(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| HeadcountError::ImageLoad(format!("{}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| HeadcountError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "decoded image"
    );

    Ok(fit_within(image, bound))
}

/// Thumbnail semantics: shrink to fit `bound` keeping the aspect ratio, never enlarge.
pub fn fit_within(image: DynamicImage, (max_width, max_height): (u32, u32)) -> DynamicImage {
    if image.width() <= max_width && image.height() <= max_height {
        return image;
    }
    image.resize(max_width, max_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(&PathBuf::from("crowd.jpg")));
        assert!(is_supported_image(&PathBuf::from("crowd.JPEG")));
        assert!(is_supported_image(&PathBuf::from("dir/crowd.png")));
        assert!(!is_supported_image(&PathBuf::from("crowd.gif")));
        assert!(!is_supported_image(&PathBuf::from("crowd")));
    }

    #[test]
    fn test_fit_within_shrinks_wide_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1600, 1000, Rgb([9, 9, 9])));
        let fitted = fit_within(image, (780, 500));
        assert_eq!(fitted.width(), 780);
        assert!(fitted.height() <= 500);
    }

    #[test]
    fn test_fit_within_keeps_small_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(320, 240));
        let fitted = fit_within(image, (780, 500));
        assert_eq!((fitted.width(), fitted.height()), (320, 240));
    }
}
