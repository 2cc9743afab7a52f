/// Image preprocessing for the age-group exercise.
///
/// Images (PNG/JPEG/BMP/GIF) are decoded, resized exactly to the requested
/// dimensions, and normalized to [0, 1] as channel-first RGB tensors.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage};

use crate::error::{Error, Result};
use crate::math::tensor::Tensor3;

pub const RGB_CHANNELS: usize = 3;

/// Decodes the image at `path` into a `3 x height x width` tensor.
pub fn image_to_tensor(path: &Path, width: u32, height: u32) -> Result<Tensor3> {
    let img = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(dynamic_image_to_tensor(&img, width, height))
}

fn dynamic_image_to_tensor(img: &DynamicImage, width: u32, height: u32) -> Tensor3 {
    let resized = img.resize_exact(width, height, FilterType::Triangle);
    let rgb = resized.to_rgb8();
    let (w, h) = (width as usize, height as usize);
    let mut tensor = Tensor3::zeros(RGB_CHANNELS, h, w);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..RGB_CHANNELS {
            tensor.set(c, y as usize, x as usize, pixel.0[c] as f64 / 255.0);
        }
    }
    tensor
}
