//! Raw observations and preprocessed frames.
use crate::error::A3cError;
use anyhow::Result;
use image::{
    imageops::{grayscale, resize, FilterType::Triangle},
    ImageBuffer, Rgb,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A single-channel frame of shape `(height, width)` with values in `[0, 1]`.
pub type Frame = Array2<f32>;

/// An RGB24 image emitted by a simulator.
///
/// `pixels` is row-major, three bytes per pixel, so its length must be
/// `width * height * 3`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Pixel data.
    pub pixels: Vec<u8>,
}

impl RawFrame {
    /// Constructs a frame filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let n = (width * height) as usize;
        let pixels = rgb.iter().copied().cycle().take(n * 3).collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Converts a [`RawFrame`] into a grayscale [`Frame`] of a fixed size.
///
/// Grayscale conversion uses Rec. 709 luma weights, then the image is resized
/// with a triangle filter and scaled into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePreprocessor {
    width: u32,
    height: u32,
}

impl FramePreprocessor {
    /// Constructs a preprocessor producing frames of `width` x `height`.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(A3cError::Configuration(format!(
                "frame size must be positive, got {}x{}",
                width, height
            ))
            .into());
        }
        Ok(Self { width, height })
    }

    /// Width of output frames.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of output frames.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the preprocessed frame.
    pub fn preprocess(&self, raw: &RawFrame) -> Result<Frame> {
        let expected = raw.width as usize * raw.height as usize * 3;
        if expected == 0 || raw.pixels.len() != expected {
            return Err(A3cError::MalformedFrame(format!(
                "{}x{} RGB frame with {} bytes",
                raw.width,
                raw.height,
                raw.pixels.len()
            ))
            .into());
        }

        let img = ImageBuffer::<Rgb<u8>, _>::from_raw(raw.width, raw.height, raw.pixels.as_slice())
            .ok_or_else(|| A3cError::MalformedFrame("buffer too small".to_string()))?;
        let img = grayscale(&img);
        let img = resize(&img, self.width, self.height, Triangle);
        let buf = img
            .into_raw()
            .into_iter()
            .map(|p| p as f32 / 255.0)
            .collect::<Vec<_>>();

        Ok(Array2::from_shape_vec(
            (self.height as usize, self.width as usize),
            buf,
        )?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_output_shape_and_range() {
        let pre = FramePreprocessor::new(84, 84).unwrap();
        let raw = RawFrame {
            width: 160,
            height: 210,
            pixels: (0..160 * 210 * 3).map(|i| (i % 256) as u8).collect(),
        };
        let frame = pre.preprocess(&raw).unwrap();
        assert_eq!(frame.dim(), (84, 84));
        assert!(frame.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_non_square_output() {
        let pre = FramePreprocessor::new(12, 7).unwrap();
        let frame = pre.preprocess(&RawFrame::filled(30, 30, [0, 0, 0])).unwrap();
        assert_eq!(frame.dim(), (7, 12));
    }

    #[test]
    fn test_white_and_black() {
        let pre = FramePreprocessor::new(4, 4).unwrap();
        let white = pre.preprocess(&RawFrame::filled(8, 8, [255, 255, 255])).unwrap();
        let black = pre.preprocess(&RawFrame::filled(8, 8, [0, 0, 0])).unwrap();
        assert!(white.iter().all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(black.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let pre = FramePreprocessor::new(10, 10).unwrap();
        let raw = RawFrame {
            width: 20,
            height: 16,
            pixels: (0..20 * 16 * 3).map(|i| (i * 7 % 251) as u8).collect(),
        };
        assert_eq!(pre.preprocess(&raw).unwrap(), pre.preprocess(&raw).unwrap());
    }

    #[test]
    fn test_malformed_frame() {
        let pre = FramePreprocessor::new(84, 84).unwrap();
        let raw = RawFrame {
            width: 10,
            height: 10,
            pixels: vec![0; 10],
        };
        let err = pre.preprocess(&raw).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<A3cError>(),
            Some(A3cError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_zero_size_is_configuration_error() {
        assert!(FramePreprocessor::new(0, 84).is_err());
    }
}
