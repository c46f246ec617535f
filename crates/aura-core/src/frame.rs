//! Decoded image input and the lightweight statistics the fallback path reads.

use image::RgbImage;
use std::path::Path;

/// A decoded RGB8 image, row-major, 3 bytes per pixel.
#[derive(Clone)]
pub struct ImageFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Summary statistics over a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Height divided by width.
    pub aspect_ratio: f32,
    /// Mean RGB over the central region (middle third in both axes).
    pub center_rgb: [f32; 3],
}

impl ImageFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self { data, width, height }
    }

    /// Decode encoded image bytes (JPEG, PNG, ...). Returns `None` on any decode error.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match image::load_from_memory(bytes) {
            Ok(img) => Some(Self::from(img.to_rgb8())),
            Err(e) => {
                tracing::warn!(error = %e, len = bytes.len(), "image decode failed");
                None
            }
        }
    }

    /// Open and decode an image file. Returns `None` if it is unreadable.
    pub fn open(path: &Path) -> Option<Self> {
        match image::open(path) {
            Ok(img) => Some(Self::from(img.to_rgb8())),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "image open failed");
                None
            }
        }
    }

    /// Check that the buffer is non-empty and matches its dimensions.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("zero-sized image {}x{}", self.width, self.height));
        }
        let expected = self
            .expected_len()
            .ok_or_else(|| format!("image dimensions {}x{} overflow", self.width, self.height))?;
        if self.data.len() != expected {
            return Err(format!(
                "buffer length {} does not match {}x{} RGB ({expected})",
                self.data.len(),
                self.width,
                self.height
            ));
        }
        Ok(())
    }

    /// Byte length of a `width` x `height` RGB8 buffer; `None` if it overflows `usize`.
    fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(3))
    }

    /// Mean RGB of the middle third of the frame, where a subject usually sits.
    pub fn center_mean_rgb(&self) -> [f32; 3] {
        let w = self.width as usize;
        let h = self.height as usize;
        if w == 0 || h == 0 || self.expected_len().map_or(true, |n| self.data.len() < n) {
            return [0.0; 3];
        }

        let (x0, x1) = (w / 3, (2 * w / 3).max(w / 3 + 1).min(w));
        let (y0, y1) = (h / 3, (2 * h / 3).max(h / 3 + 1).min(h));

        let mut acc = [0f64; 3];
        let mut n = 0u64;
        for y in y0..y1 {
            for x in x0..x1 {
                let i = (y * w + x) * 3;
                acc[0] += self.data[i] as f64;
                acc[1] += self.data[i + 1] as f64;
                acc[2] += self.data[i + 2] as f64;
                n += 1;
            }
        }
        if n == 0 {
            return [0.0; 3];
        }
        [
            (acc[0] / n as f64) as f32,
            (acc[1] / n as f64) as f32,
            (acc[2] / n as f64) as f32,
        ]
    }

    /// Statistics for a valid frame; `None` when [`validate`](Self::validate) fails.
    pub fn stats(&self) -> Option<FrameStats> {
        self.validate().ok()?;
        Some(FrameStats {
            aspect_ratio: self.height as f32 / self.width as f32,
            center_rgb: self.center_mean_rgb(),
        })
    }

    /// Borrow as an `image` buffer for resizing. `None` if dimensions don't match.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }
}

impl From<RgbImage> for ImageFrame {
    fn from(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
        }
    }
}

impl std::fmt::Debug for ImageFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

pub(crate) fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> ImageFrame {
        let data = rgb.iter().copied().cycle().take((w * h * 3) as usize).collect();
        ImageFrame::new(data, w, h)
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let f = ImageFrame::new(vec![], 0, 10);
        assert!(f.validate().is_err());
        assert!(f.stats().is_none());
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let f = ImageFrame::new(vec![0; 10], 2, 2);
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_dimensions() {
        let f = ImageFrame::new(vec![0; 3], u32::MAX, u32::MAX);
        assert!(f.validate().is_err());
        assert!(f.stats().is_none());
        assert_eq!(f.center_mean_rgb(), [0.0; 3]);
    }

    #[test]
    fn test_center_mean_reads_middle() {
        // 3x3 frame, only the centre pixel is red.
        let mut f = solid(3, 3, [0, 0, 0]);
        f.data[4 * 3] = 255;
        let c = f.center_mean_rgb();
        assert_eq!(c, [255.0, 0.0, 0.0]);
    }

    #[test]
    fn test_stats_aspect_ratio() {
        let f = solid(10, 20, [50, 60, 70]);
        let s = f.stats().unwrap();
        assert!((s.aspect_ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_garbage_is_none() {
        assert!(ImageFrame::decode(b"not an image").is_none());
    }

    #[test]
    fn test_rgb_image_roundtrip_dimensions() {
        let f = solid(5, 7, [1, 2, 3]);
        let img = f.to_rgb_image().unwrap();
        assert_eq!(img.dimensions(), (5, 7));
        let back = ImageFrame::from(img);
        assert_eq!(back.data, f.data);
    }
}
