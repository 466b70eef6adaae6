//! Fitting pictures into the printable page box.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;

use super::DiagramError;

/// Printable width of a page, in pixels.
pub const PAGE_WIDTH: u32 = 580;
/// Printable height of a page, in pixels.
pub const PAGE_HEIGHT: u32 = 841;

/// Largest size that fits in [`PAGE_WIDTH`]×[`PAGE_HEIGHT`] with the same aspect ratio.
///
/// Sizes that already fit are returned unchanged; otherwise both sides are divided by
/// `max(width / PAGE_WIDTH, height / PAGE_HEIGHT)`, truncating, never below one pixel.
///
/// ```rust
/// use featuredoc::diagram::fit_within;
///
/// assert_eq!(fit_within(1000, 500), (580, 290));
/// assert_eq!(fit_within(400, 300), (400, 300));
/// ```
pub fn fit_within(width: u32, height: u32) -> (u32, u32) {
    if width <= PAGE_WIDTH && height <= PAGE_HEIGHT {
        return (width, height);
    }
    let (w, h) = (u64::from(width), u64::from(height));
    let (box_w, box_h) = (u64::from(PAGE_WIDTH), u64::from(PAGE_HEIGHT));

    // Compare w/box_w against h/box_h without division.
    let (new_w, new_h) = if w * box_h >= h * box_w {
        (box_w, h * box_w / w)
    } else {
        (w * box_h / h, box_h)
    };
    (clamp_side(new_w, PAGE_WIDTH), clamp_side(new_h, PAGE_HEIGHT))
}

fn clamp_side(side: u64, max: u32) -> u32 {
    u32::try_from(side).unwrap_or(max).clamp(1, max)
}

/// Make a copy of `source` fitted to the page at `dest`.
///
/// Returns `source` itself when it already fits; the source file is never modified.
pub fn fit_picture(source: &Path, dest: &Path) -> Result<PathBuf, DiagramError> {
    let picture = image::open(source).map_err(|e| DiagramError::Image {
        path: source.to_path_buf(),
        source: e,
    })?;
    let (width, height) = (picture.width(), picture.height());
    let (fit_w, fit_h) = fit_within(width, height);
    if (fit_w, fit_h) == (width, height) {
        return Ok(source.to_path_buf());
    }

    tracing::debug!(
        path = %source.display(),
        from = %format!("{width}x{height}"),
        to = %format!("{fit_w}x{fit_h}"),
        "resizing picture"
    );
    picture
        .resize_exact(fit_w, fit_h, FilterType::Lanczos3)
        .save(dest)
        .map_err(|e| DiagramError::Image {
            path: dest.to_path_buf(),
            source: e,
        })?;
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_picture() {
        assert_eq!(fit_within(1000, 500), (580, 290));
    }

    #[test]
    fn test_tall_picture() {
        assert_eq!(fit_within(400, 1682), (200, 841));
    }

    #[test]
    fn test_both_sides_too_large() {
        // Height is the binding side: 2000/841 > 1160/580.
        assert_eq!(fit_within(1160, 2000), (487, 841));
    }

    #[test]
    fn test_fitting_picture_untouched() {
        assert_eq!(fit_within(580, 841), (580, 841));
        assert_eq!(fit_within(10, 10), (10, 10));
    }

    #[test]
    fn test_extreme_ratio_keeps_one_pixel() {
        assert_eq!(fit_within(100_000, 1), (580, 1));
    }

    #[test]
    fn test_fit_picture_copies_and_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("big.png");
        let dest = dir.path().join("fitted.png");
        image::RgbImage::new(1000, 500).save(&source).unwrap();

        let out = fit_picture(&source, &dest).unwrap();
        assert_eq!(out, dest);
        assert_eq!(image::image_dimensions(&dest).unwrap(), (580, 290));
        assert_eq!(image::image_dimensions(&source).unwrap(), (1000, 500));
    }

    #[test]
    fn test_fit_picture_small_returns_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("small.png");
        image::RgbImage::new(20, 10).save(&source).unwrap();
        let out = fit_picture(&source, &dir.path().join("unused.png")).unwrap();
        assert_eq!(out, source);
        assert!(!dir.path().join("unused.png").exists());
    }
}
