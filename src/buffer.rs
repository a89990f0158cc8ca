/*
 * Copyright (c) 2026 Yumechi <yume@yumechi.jp>
 *
 * Created on Thursday, October 15, 2026
 * Author: Yumechi <yume@yumechi.jp>
 *
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use alloc::{vec, vec::Vec};

use crate::error::InvalidInputError;

/// Number of color channels a convertible buffer must have.
pub const COLOR_CHANNELS: usize = 3;

/// Memory order of the three color samples of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Blue, green, red, as produced by OpenCV-style decoders.
    Bgr,
}

impl ChannelOrder {
    /// Offsets of the red, green and blue samples inside a pixel.
    #[must_use]
    pub const fn rgb_offsets(self) -> [usize; 3] {
        match self {
            ChannelOrder::Rgb => [0, 1, 2],
            ChannelOrder::Bgr => [2, 1, 0],
        }
    }
}

/// A borrowed, read-only view of a decoded interleaved image.
///
/// Construction never fails: the shape is only checked by [`PixelBuffer::validate`], which every kernel calls before converting.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    samples: &'a [u8],
    height: usize,
    width: usize,
    channels: usize,
    order: ChannelOrder,
}

/// The shape of a [`PixelBuffer`] that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidShape {
    height: usize,
    width: usize,
}

impl ValidShape {
    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of pixels.
    #[must_use]
    pub const fn pixels(&self) -> usize {
        self.height * self.width
    }
}

impl<'a> PixelBuffer<'a> {
    /// Describe `samples` as a `height` x `width` x `channels` row-major grid in RGB order.
    #[must_use]
    pub const fn new(samples: &'a [u8], height: usize, width: usize, channels: usize) -> Self {
        Self {
            samples,
            height,
            width,
            channels,
            order: ChannelOrder::Rgb,
        }
    }

    /// Describe `samples` as a `height` x `width` RGB8 grid.
    #[must_use]
    pub const fn rgb8(samples: &'a [u8], height: usize, width: usize) -> Self {
        Self::new(samples, height, width, COLOR_CHANNELS)
    }

    /// Describe `samples` as a `height` x `width` BGR8 grid.
    #[must_use]
    pub const fn bgr8(samples: &'a [u8], height: usize, width: usize) -> Self {
        Self::new(samples, height, width, COLOR_CHANNELS).with_order(ChannelOrder::Bgr)
    }

    /// Replace the channel order.
    #[must_use]
    pub const fn with_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of samples per pixel.
    #[must_use]
    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// Memory order of the color samples.
    #[must_use]
    pub const fn order(&self) -> ChannelOrder {
        self.order
    }

    /// The raw interleaved samples.
    #[must_use]
    pub const fn samples(&self) -> &'a [u8] {
        self.samples
    }

    /// Check the buffer can be converted.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] if the channel count is not 3, a dimension is zero, or the sample count does not match the shape.
    pub fn validate(&self) -> Result<ValidShape, InvalidInputError> {
        if self.channels != COLOR_CHANNELS {
            return Err(InvalidInputError::ChannelCount {
                channels: self.channels,
            });
        }

        if self.height == 0 || self.width == 0 {
            return Err(InvalidInputError::EmptyDimensions {
                height: self.height,
                width: self.width,
            });
        }

        let expected = self
            .height
            .checked_mul(self.width)
            .and_then(|p| p.checked_mul(self.channels))
            .ok_or(InvalidInputError::DimensionOverflow {
                height: self.height,
                width: self.width,
            })?;

        if self.samples.len() != expected {
            return Err(InvalidInputError::SampleCountMismatch {
                expected,
                actual: self.samples.len(),
            });
        }

        Ok(ValidShape {
            height: self.height,
            width: self.width,
        })
    }

    /// The 3 samples of the pixel at (`row`, `col`), in memory order.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside a validated buffer.
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        let offset = (row * self.width + col) * COLOR_CHANNELS;
        [
            self.samples[offset],
            self.samples[offset + 1],
            self.samples[offset + 2],
        ]
    }
}

/// A single-channel 8-bit grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleBuffer {
    data: Vec<u8>,
    height: usize,
    width: usize,
}

impl GrayscaleBuffer {
    /// Allocate a black grid of the given shape.
    #[must_use]
    pub fn zeroed(shape: ValidShape) -> Self {
        Self {
            data: vec![0; shape.pixels()],
            height: shape.height,
            width: shape.width,
        }
    }

    /// Wrap existing luma samples.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] if a dimension is zero or `data` does not hold exactly `height * width` samples.
    pub fn from_vec(data: Vec<u8>, height: usize, width: usize) -> Result<Self, InvalidInputError> {
        if height == 0 || width == 0 {
            return Err(InvalidInputError::EmptyDimensions { height, width });
        }
        let expected = height
            .checked_mul(width)
            .ok_or(InvalidInputError::DimensionOverflow { height, width })?;
        if data.len() != expected {
            return Err(InvalidInputError::SampleCountMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            height,
            width,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// The luma value at (`row`, `col`), or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.data[row * self.width + col])
    }

    /// One row of luma values.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> core::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.width)
    }

    /// All luma values, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Take the luma values, row-major.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// The largest absolute per-cell difference to `other`, or `None` if the shapes differ.
    #[must_use]
    pub fn max_abs_difference(&self, other: &GrayscaleBuffer) -> Option<u8> {
        if self.height != other.height || self.width != other.width {
            return None;
        }

        Some(
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a.abs_diff(*b))
                .max()
                .unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_rgb8() {
        let samples = [0u8; 2 * 3 * 3];
        let shape = PixelBuffer::rgb8(&samples, 2, 3).validate().unwrap();
        assert_eq!((shape.height(), shape.width()), (2, 3));
        assert_eq!(shape.pixels(), 6);
    }

    #[test]
    fn test_validate_rejects_bad_channels() {
        let samples = [0u8; 16];
        for channels in [1, 4] {
            let buffer = PixelBuffer::new(&samples[..4 * channels], 2, 2, channels);
            assert_eq!(
                buffer.validate(),
                Err(InvalidInputError::ChannelCount { channels })
            );
        }
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(
            PixelBuffer::rgb8(&[], 0, 5).validate(),
            Err(InvalidInputError::EmptyDimensions {
                height: 0,
                width: 5
            })
        );
        assert_eq!(
            PixelBuffer::rgb8(&[], 5, 0).validate(),
            Err(InvalidInputError::EmptyDimensions {
                height: 5,
                width: 0
            })
        );
    }

    #[test]
    fn test_validate_rejects_short_buffer() {
        let samples = [0u8; 11];
        assert_eq!(
            PixelBuffer::rgb8(&samples, 2, 2).validate(),
            Err(InvalidInputError::SampleCountMismatch {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_validate_rejects_overflow() {
        assert_eq!(
            PixelBuffer::rgb8(&[], usize::MAX, 2).validate(),
            Err(InvalidInputError::DimensionOverflow {
                height: usize::MAX,
                width: 2
            })
        );
    }

    #[test]
    fn test_channel_order_offsets() {
        assert_eq!(ChannelOrder::Rgb.rgb_offsets(), [0, 1, 2]);
        assert_eq!(ChannelOrder::Bgr.rgb_offsets(), [2, 1, 0]);
        let samples = [1, 2, 3];
        assert_eq!(PixelBuffer::bgr8(&samples, 1, 1).order(), ChannelOrder::Bgr);
    }

    #[test]
    fn test_grayscale_accessors() {
        let gray = GrayscaleBuffer::from_vec(vec![1, 2, 3, 4, 5, 6], 2, 3).unwrap();
        assert_eq!(gray.get(1, 2), Some(6));
        assert_eq!(gray.get(2, 0), None);
        assert_eq!(gray.row(1), &[4, 5, 6]);
        assert_eq!(gray.rows().count(), 2);
        assert!(GrayscaleBuffer::from_vec(vec![0; 5], 2, 3).is_err());
    }

    #[test]
    fn test_max_abs_difference() {
        let a = GrayscaleBuffer::from_vec(vec![10, 20, 30, 40], 2, 2).unwrap();
        let b = GrayscaleBuffer::from_vec(vec![11, 20, 27, 40], 2, 2).unwrap();
        let c = GrayscaleBuffer::from_vec(vec![0; 4], 1, 4).unwrap();
        assert_eq!(a.max_abs_difference(&b), Some(3));
        assert_eq!(a.max_abs_difference(&a), Some(0));
        assert_eq!(a.max_abs_difference(&c), None);
    }
}
