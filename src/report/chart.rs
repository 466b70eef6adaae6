//! Pie chart of the summary buckets.

use std::f64::consts::PI;
use std::path::Path;

use image::{Rgb, RgbImage};

use super::summary::Buckets;

const SIZE: u32 = 400;
const RADIUS: f64 = 180.0;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const SUCCEEDED_COLOR: Rgb<u8> = Rgb([44, 160, 44]);
pub const FAILED_COLOR: Rgb<u8> = Rgb([214, 39, 40]);
pub const SKIPPED_COLOR: Rgb<u8> = Rgb([127, 127, 127]);

/// Draws the three summary proportions into a picture file.
pub trait ChartRenderer {
    fn render(&self, buckets: &Buckets, output: &Path) -> Result<(), image::ImageError>;
}

/// Raster pie chart: green succeeded, red failed, grey skipped, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct PieChartRenderer;

impl PieChartRenderer {
    pub fn draw(&self, buckets: &Buckets) -> RgbImage {
        let succeeded_end = f64::from(buckets.succeeded) / 100.0;
        let failed_end = succeeded_end + f64::from(buckets.failed) / 100.0;
        let center = f64::from(SIZE) / 2.0;

        RgbImage::from_fn(SIZE, SIZE, |x, y| {
            let dx = f64::from(x) + 0.5 - center;
            let dy = f64::from(y) + 0.5 - center;
            if dx.hypot(dy) > RADIUS {
                return BACKGROUND;
            }
            // Fraction of a full turn, clockwise from the top.
            let turn = (dx.atan2(-dy) / (2.0 * PI)).rem_euclid(1.0);
            if turn < succeeded_end {
                SUCCEEDED_COLOR
            } else if turn < failed_end {
                FAILED_COLOR
            } else {
                SKIPPED_COLOR
            }
        })
    }
}

impl ChartRenderer for PieChartRenderer {
    fn render(&self, buckets: &Buckets, output: &Path) -> Result<(), image::ImageError> {
        self.draw(buckets).save(output)
    }
}
