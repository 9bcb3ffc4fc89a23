//! TIFF orientation correction (TIFF 6.0, tag 274)
//!
//! | code | stored raster                 | correction              |
//! |------|-------------------------------|-------------------------|
//! | 1    | upright                       | none                    |
//! | 2    | mirrored horizontally         | horizontal flip         |
//! | 3    | rotated 180°                  | 180° rotation           |
//! | 4    | mirrored vertically           | vertical flip           |
//! | 5    | transposed                    | transpose               |
//! | 6    | rotated 90° counter-clockwise | 90° clockwise rotation  |
//! | 7    | transversed                   | transverse              |
//! | 8    | rotated 90° clockwise         | 270° clockwise rotation |
//!
//! Codes 5 through 8 swap width and height.

use image::DynamicImage;
use tracing::{debug, warn};

/// Upright orientation code.
pub const ORIENTATION_NORMAL: u16 = 1;

/// Returns the stored raster transformed to its upright orientation.
///
/// Unknown codes are treated as upright.
pub fn apply_orientation(image: DynamicImage, orientation: u16) -> DynamicImage {
    let corrected = match orientation {
        ORIENTATION_NORMAL => return image,
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate90().flipv(),
        8 => image.rotate270(),
        other => {
            warn!(orientation = other, "Unknown TIFF orientation value, treating as normal");
            return image;
        }
    };

    debug!(
        orientation,
        width = corrected.width(),
        height = corrected.height(),
        "Applied orientation correction"
    );
    corrected
}

/// The code whose correction undoes the correction for `orientation`.
pub fn inverse_orientation(orientation: u16) -> u16 {
    match orientation {
        6 => 8,
        8 => 6,
        other => other,
    }
}

/// Whether the correction for `orientation` swaps width and height.
pub fn swaps_dimensions(orientation: u16) -> bool {
    matches!(orientation, 5..=8)
}
