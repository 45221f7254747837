//! Picture decoding and downscaling

use std::num::NonZeroU32;
use std::path::Path;

use fast_image_resize as fr;
use image::{DynamicImage, ImageError, RgbImage};
use log::{debug, warn};

use super::DEFAULT_MAX_EDGE;
use super::request::{LoadError, LoadResult};
use super::types::Picture;

/// Turns an item identifier into a displayable picture.
///
/// Called on worker threads; implementations must not touch the cache.
pub trait Loader: Send + Sync {
    fn load(&self, path: &Path) -> LoadResult;
}

impl<F> Loader for F
where
    F: Fn(&Path) -> LoadResult + Send + Sync,
{
    fn load(&self, path: &Path) -> LoadResult {
        self(path)
    }
}

/// Decodes with `image` and shrinks so the longest edge fits `max_edge`
#[derive(Clone, Copy, Debug)]
pub struct ImageLoader {
    max_edge: u32,
}

impl ImageLoader {
    #[must_use]
    pub fn new(max_edge: u32) -> Self {
        Self {
            max_edge: max_edge.max(1),
        }
    }

    #[must_use]
    pub fn max_edge(&self) -> u32 {
        self.max_edge
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EDGE)
    }
}

impl Loader for ImageLoader {
    fn load(&self, path: &Path) -> LoadResult {
        let img = image::open(path).map_err(|e| match e {
            ImageError::IoError(io) => LoadError::Open {
                path: path.to_path_buf(),
                detail: io.to_string(),
            },
            other => LoadError::Decode {
                path: path.to_path_buf(),
                detail: other.to_string(),
            },
        })?;

        let (width, height) = (img.width(), img.height());
        let (new_width, new_height) = bounded_size(width, height, self.max_edge);

        let rgb = if (new_width, new_height) == (width, height) {
            img.to_rgb8()
        } else {
            debug!(
                "Resizing {} from {width}x{height} to {new_width}x{new_height}",
                path.display()
            );
            match fast_resize_image(&img, new_width, new_height) {
                Ok(resized) => resized,
                Err(e) => {
                    warn!(
                        "Fast resize failed for {}: {e}, falling back to slow resize",
                        path.display()
                    );
                    img.resize_exact(
                        new_width,
                        new_height,
                        image::imageops::FilterType::Lanczos3,
                    )
                    .to_rgb8()
                }
            }
        };

        let (w, h) = rgb.dimensions();
        if w == 0 || h == 0 {
            return Err(LoadError::Resize {
                path: path.to_path_buf(),
                detail: format!("empty picture {w}x{h}"),
            });
        }
        Ok(Picture::new(rgb.into_raw(), w, h))
    }
}

/// Size that fits within `max_edge` keeping the aspect ratio.
///
/// Never enlarges; edges never drop below one pixel.
#[must_use]
pub fn bounded_size(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let max_edge = max_edge.max(1);
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width, height);
    }
    let scale = f64::from(max_edge) / f64::from(longest);
    let w = ((f64::from(width) * scale).round() as u32).clamp(1, max_edge);
    let h = ((f64::from(height) * scale).round() as u32).clamp(1, max_edge);
    (w, h)
}

/// Resize using fast_image_resize; much quicker than `image` for big photos
fn fast_resize_image(
    src_image: &DynamicImage,
    new_width: u32,
    new_height: u32,
) -> Result<RgbImage, Box<dyn std::error::Error>> {
    let src_rgb = src_image.to_rgb8();
    let (src_width, src_height) = src_rgb.dimensions();

    let src_view = fr::Image::from_vec_u8(
        NonZeroU32::new(src_width).ok_or("Invalid width")?,
        NonZeroU32::new(src_height).ok_or("Invalid height")?,
        src_rgb.into_raw(),
        fr::PixelType::U8x3,
    )?;

    let dst_width = NonZeroU32::new(new_width).ok_or("Invalid target width")?;
    let dst_height = NonZeroU32::new(new_height).ok_or("Invalid target height")?;
    let mut dst_image = fr::Image::new(dst_width, dst_height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new(fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3));
    resizer.resize(&src_view.view(), &mut dst_image.view_mut())?;

    RgbImage::from_raw(new_width, new_height, dst_image.into_vec())
        .ok_or_else(|| "Failed to create ImageBuffer".into())
}
