//! Raster plate capability.
//!
//! Pixel work is kept behind a trait so the pipeline and separator can be
//! exercised without decoding real images. The shipped implementation
//! sits on the `image` crate; separations arrive as grayscale TIFFs where
//! dark means ink.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from raster plate handling.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Raster file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to decode raster {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to encode raster {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Process-plate set incomplete: expected 4 separations, got {got}")]
    IncompleteProcessSet { got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bounding box of non-background content, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Pixel-level operations the core delegates.
#[async_trait]
pub trait RasterOps: Send + Sync {
    /// Converts a single separation to a PNG mask at the destination.
    async fn convert_to_png(&self, src: &Path, dest: &Path) -> Result<(), RasterError>;

    /// Composites the four process separations (C, M, Y, K order) into an
    /// RGB albedo PNG.
    async fn composite_process(
        &self,
        separations: &[PathBuf],
        dest: &Path,
    ) -> Result<(), RasterError>;

    /// Counts pixels carrying ink (non-background).
    async fn non_background_pixels(&self, path: &Path) -> Result<u64, RasterError>;

    /// Bounding box of inked content, None when the raster is empty.
    async fn content_bounds(&self, path: &Path) -> Result<Option<ContentBounds>, RasterError>;
}

/// Luminance at or above this value counts as background (paper white).
const BACKGROUND_LUMA: u8 = 250;

/// `image`-crate based implementation.
#[derive(Debug, Default, Clone)]
pub struct ImageRasterOps;

impl ImageRasterOps {
    pub fn new() -> Self {
        Self
    }

    fn open_luma(path: &Path) -> Result<image::GrayImage, RasterError> {
        if !path.exists() {
            return Err(RasterError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let img = image::open(path).map_err(|e| RasterError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(img.into_luma8())
    }

    fn save_png(img: &image::RgbImage, dest: &Path) -> Result<(), RasterError> {
        img.save_with_format(dest, image::ImageFormat::Png)
            .map_err(|e| RasterError::Encode {
                path: dest.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl RasterOps for ImageRasterOps {
    async fn convert_to_png(&self, src: &Path, dest: &Path) -> Result<(), RasterError> {
        let src = src.to_path_buf();
        let dest_buf = dest.to_path_buf();
        let result = tokio::task::spawn_blocking(move || -> Result<(), RasterError> {
            let gray = Self::open_luma(&src)?;
            let rgb: image::RgbImage =
                image::ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
                    let l = gray.get_pixel(x, y).0[0];
                    image::Rgb([l, l, l])
                });
            Self::save_png(&rgb, &dest_buf)
        })
        .await;
        result.map_err(|e| RasterError::Io(std::io::Error::other(e)))?
    }

    async fn composite_process(
        &self,
        separations: &[PathBuf],
        dest: &Path,
    ) -> Result<(), RasterError> {
        if separations.len() != 4 {
            return Err(RasterError::IncompleteProcessSet {
                got: separations.len(),
            });
        }
        let seps = separations.to_vec();
        let dest_buf = dest.to_path_buf();
        let result = tokio::task::spawn_blocking(move || -> Result<(), RasterError> {
            let planes: Vec<image::GrayImage> = seps
                .iter()
                .map(|p| Self::open_luma(p))
                .collect::<Result<_, _>>()?;
            let (w, h) = (planes[0].width(), planes[0].height());
            // Separation luma is ink coverage inverted: 255 = no ink.
            // Standard naive CMYK -> RGB composite.
            let rgb: image::RgbImage = image::ImageBuffer::from_fn(w, h, |x, y| {
                let sample = |i: usize| -> f32 {
                    let plane = &planes[i];
                    if x < plane.width() && y < plane.height() {
                        1.0 - plane.get_pixel(x, y).0[0] as f32 / 255.0
                    } else {
                        0.0
                    }
                };
                let (c, m, yv, k) = (sample(0), sample(1), sample(2), sample(3));
                let to_channel = |ink: f32| ((1.0 - ink) * (1.0 - k) * 255.0).round() as u8;
                image::Rgb([to_channel(c), to_channel(m), to_channel(yv)])
            });
            Self::save_png(&rgb, &dest_buf)
        })
        .await;
        result.map_err(|e| RasterError::Io(std::io::Error::other(e)))?
    }

    async fn non_background_pixels(&self, path: &Path) -> Result<u64, RasterError> {
        let path = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || -> Result<u64, RasterError> {
            let gray = Self::open_luma(&path)?;
            Ok(gray
                .pixels()
                .filter(|p| p.0[0] < BACKGROUND_LUMA)
                .count() as u64)
        })
        .await;
        result.map_err(|e| RasterError::Io(std::io::Error::other(e)))?
    }

    async fn content_bounds(&self, path: &Path) -> Result<Option<ContentBounds>, RasterError> {
        let path = path.to_path_buf();
        let result =
            tokio::task::spawn_blocking(move || -> Result<Option<ContentBounds>, RasterError> {
                let gray = Self::open_luma(&path)?;
                let mut min_x = u32::MAX;
                let mut min_y = u32::MAX;
                let mut max_x = 0u32;
                let mut max_y = 0u32;
                let mut any = false;
                for (x, y, p) in gray.enumerate_pixels() {
                    if p.0[0] < BACKGROUND_LUMA {
                        any = true;
                        min_x = min_x.min(x);
                        min_y = min_y.min(y);
                        max_x = max_x.max(x);
                        max_y = max_y.max(y);
                    }
                }
                if !any {
                    return Ok(None);
                }
                Ok(Some(ContentBounds {
                    x: min_x,
                    y: min_y,
                    width: max_x - min_x + 1,
                    height: max_y - min_y + 1,
                }))
            })
            .await;
        result.map_err(|e| RasterError::Io(std::io::Error::other(e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_gray(path: &Path, w: u32, h: u32, f: impl Fn(u32, u32) -> u8) {
        let img: image::GrayImage = image::ImageBuffer::from_fn(w, h, |x, y| image::Luma([f(x, y)]));
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    #[tokio::test]
    async fn test_non_background_pixels_counts_ink() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mask.png");
        // 10x10 white with a 3x3 black block.
        write_gray(&path, 10, 10, |x, y| {
            if x < 3 && y < 3 {
                0
            } else {
                255
            }
        });
        let ops = ImageRasterOps::new();
        assert_eq!(ops.non_background_pixels(&path).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_content_bounds_of_block() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mask.png");
        write_gray(&path, 20, 20, |x, y| {
            if (5..10).contains(&x) && (8..12).contains(&y) {
                0
            } else {
                255
            }
        });
        let ops = ImageRasterOps::new();
        let bounds = ops.content_bounds(&path).await.unwrap().unwrap();
        assert_eq!(
            bounds,
            ContentBounds {
                x: 5,
                y: 8,
                width: 5,
                height: 4
            }
        );
    }

    #[tokio::test]
    async fn test_content_bounds_empty_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.png");
        write_gray(&path, 8, 8, |_, _| 255);
        let ops = ImageRasterOps::new();
        assert!(ops.content_bounds(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_composite_process_requires_four_planes() {
        let ops = ImageRasterOps::new();
        let err = ops
            .composite_process(&[PathBuf::from("c.tif")], Path::new("out.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, RasterError::IncompleteProcessSet { got: 1 }));
    }

    #[tokio::test]
    async fn test_composite_process_pure_black_plate() {
        let dir = TempDir::new().unwrap();
        let mut seps = Vec::new();
        for (i, name) in ["c", "m", "y", "k"].iter().enumerate() {
            let p = dir.path().join(format!("{}.png", name));
            // Only the K plane carries ink.
            write_gray(&p, 4, 4, |_, _| if i == 3 { 0 } else { 255 });
            seps.push(p);
        }
        let dest = dir.path().join("albedo.png");
        let ops = ImageRasterOps::new();
        ops.composite_process(&seps, &dest).await.unwrap();
        let out = image::open(&dest).unwrap().into_rgb8();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[tokio::test]
    async fn test_convert_to_png_round_trip() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("sep.png");
        write_gray(&src, 6, 6, |x, _| if x == 0 { 0 } else { 255 });
        let dest = dir.path().join("out.png");
        let ops = ImageRasterOps::new();
        ops.convert_to_png(&src, &dest).await.unwrap();
        assert!(dest.exists());
        let out = image::open(&dest).unwrap().into_rgb8();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(5, 0).0, [255, 255, 255]);
    }
}
