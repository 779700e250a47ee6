//! Image normalization for the breed classifier
//!
//! Converts an uploaded image of any resolution and color mode into the
//! NHWC tensor the model expects: shape `(1, H, W, 3)`, values in `[0, 1]`.
//! Resizing ignores aspect ratio.

use image::imageops::{self, FilterType};
use image::RgbImage;
use tract_onnx::prelude::tract_ndarray::Array4;
use tracing::debug;

use crate::Result;

/// Normalized model input with a leading batch dimension of 1
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Array4<f32>,
}

impl InputTensor {
    /// Shape as `[batch, height, width, channels]`
    pub fn shape(&self) -> [usize; 4] {
        let s = self.data.shape();
        [s[0], s[1], s[2], s[3]]
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }
}

/// Resizes and rescales images to the model's input contract
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    width: u32,
    height: u32,
    filter: FilterType,
}

impl ImageNormalizer {
    /// Bicubic resize to `width` × `height`
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: FilterType::CatmullRom,
        }
    }

    /// Decode JPEG/PNG bytes into 3-channel RGB
    ///
    /// Grayscale, palette and alpha images are converted; alpha is dropped.
    pub fn decode(&self, bytes: &[u8]) -> Result<RgbImage> {
        let img = image::load_from_memory(bytes)?;
        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Decoded upload"
        );
        Ok(img.to_rgb8())
    }

    /// Resize to the target size, scale channels by 1/255, add batch dim
    pub fn normalize(&self, image: &RgbImage) -> InputTensor {
        let resized = imageops::resize(image, self.width, self.height, self.filter);
        let data = Array4::<f32>::from_shape_fn(
            (1, self.height as usize, self.width as usize, 3),
            |(_, y, x, c)| {
                let p = resized.get_pixel(x as u32, y as u32);
                p[c] as f32 / 255.0
            },
        );
        InputTensor { data }
    }

    /// Decode then normalize
    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<InputTensor> {
        let image = self.decode(bytes)?;
        Ok(self.normalize(&image))
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new(
            breedid_common::config::DEFAULT_INPUT_SIZE,
            breedid_common::config::DEFAULT_INPUT_SIZE,
        )
    }
}
