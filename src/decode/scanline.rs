use std::path::Path;

use image::GrayImage;

use super::{DecoderStrategy, code128};
use crate::config::region::Region;
use crate::config::settings::ScanlineOptions;

/// Minimum luma spread for a row to be worth thresholding. Flat rows
/// (background only) are skipped outright.
const MIN_CONTRAST: u8 = 32;

/// In-process decoder: crops the configured region out of the page
/// image and scans evenly spaced horizontal rows for a Code 128
/// pattern. The first decodable row wins.
pub struct ScanlineDecoder {
    options: ScanlineOptions,
}

impl ScanlineDecoder {
    pub fn new(options: ScanlineOptions) -> Self {
        ScanlineDecoder { options }
    }
}

impl DecoderStrategy for ScanlineDecoder {
    fn decode(&self, image_path: &Path, region: &Region) -> crate::error::Result<Option<String>> {
        let image = image::open(image_path)?;
        let Some(rect) = region.to_pixel_rect(image.width(), image.height()) else {
            // Degenerate region: nothing to analyze, not an error.
            return Ok(None);
        };

        let gray = image
            .crop_imm(rect.x, rect.y, rect.width, rect.height)
            .into_luma8();
        Ok(scan_rows(&gray, self.options.scan_rows))
    }
}

/// Sample up to `max_rows` rows spread over the image height.
fn scan_rows(gray: &GrayImage, max_rows: usize) -> Option<String> {
    let height = gray.height() as usize;
    if height == 0 || gray.width() == 0 {
        return None;
    }

    let rows = max_rows.max(1).min(height);
    for i in 0..rows {
        let y = (2 * i + 1) * height / (2 * rows);
        if let Some(value) = decode_row(gray, y as u32) {
            return Some(value);
        }
    }
    None
}

fn decode_row(gray: &GrayImage, y: u32) -> Option<String> {
    let row: Vec<u8> = (0..gray.width()).map(|x| gray.get_pixel(x, y)[0]).collect();

    let min = *row.iter().min()?;
    let max = *row.iter().max()?;
    if max - min < MIN_CONTRAST {
        return None;
    }
    let threshold = min as u16 + (max - min) as u16 / 2;

    // Run-length encode the thresholded row. Bars are dark.
    let mut runs: Vec<u32> = Vec::new();
    let mut first_is_bar = false;
    let mut current_is_bar = false;
    for (i, &luma) in row.iter().enumerate() {
        let is_bar = (luma as u16) < threshold;
        if i == 0 {
            first_is_bar = is_bar;
            current_is_bar = is_bar;
            runs.push(1);
        } else if is_bar == current_is_bar {
            // Run continues.
            if let Some(last) = runs.last_mut() {
                *last += 1;
            }
        } else {
            current_is_bar = is_bar;
            runs.push(1);
        }
    }

    code128::decode_runs(&runs, first_is_bar).or_else(|| {
        // A page scanned upside down reads right to left.
        let reversed: Vec<u32> = runs.iter().rev().copied().collect();
        let last_is_bar = if runs.len() % 2 == 1 {
            first_is_bar
        } else {
            !first_is_bar
        };
        code128::decode_runs(&reversed, last_is_bar)
    })
}
