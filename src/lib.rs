#![doc = include_str!("../README.md")]
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
#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs, clippy::pedantic)]

extern crate alloc;

/// Pixel and luma buffers.
pub mod buffer;

/// Error types.
pub mod error;

/// RGB8 to LUMA8 conversion kernels.
pub mod kernel;

/// Reproducible synthetic images for tests, benchmarks and demos.
pub mod synthetic;

/// Side-by-side timing of two kernels.
#[cfg(feature = "std")]
pub mod bench;

/// Image file loading and saving.
#[cfg(feature = "image")]
pub mod io;

pub use buffer::{ChannelOrder, GrayscaleBuffer, PixelBuffer};
pub use error::InvalidInputError;
pub use kernel::{Kernel, LoopKernel, VectorKernel, smart_kernel};

#[cfg(feature = "std")]
pub use bench::{BenchmarkResult, BenchmarkRunner};

/// Convert `input` with the reference row-major walk.
///
/// # Errors
///
/// Returns [`InvalidInputError`] if the buffer does not have exactly 3 channels, has an empty dimension, or its sample count does not match its shape.
pub fn convert_loop(input: &PixelBuffer<'_>) -> Result<GrayscaleBuffer, InvalidInputError> {
    LoopKernel.convert(input)
}

/// Convert `input` with whole-plane arithmetic, using the fastest bulk kernel for this CPU.
///
/// # Errors
///
/// Returns [`InvalidInputError`] under the same conditions as [`convert_loop`].
pub fn convert_vectorized(input: &PixelBuffer<'_>) -> Result<GrayscaleBuffer, InvalidInputError> {
    smart_kernel().convert(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convenience_wrappers_agree() {
        let samples = synthetic::noise_rgb8(40, 70, 1);
        let input = PixelBuffer::rgb8(&samples, 40, 70);
        let a = convert_loop(&input).unwrap();
        let b = convert_vectorized(&input).unwrap();
        assert!(a.max_abs_difference(&b).unwrap() <= 1);
    }

    #[test]
    fn test_gradient_range_and_shape() {
        let samples = synthetic::gradient_rgb8(33, 65);
        let input = PixelBuffer::rgb8(&samples, 33, 65);
        for out in [convert_loop(&input).unwrap(), convert_vectorized(&input).unwrap()] {
            assert_eq!((out.height(), out.width()), (33, 65));
            assert_eq!(out.get(0, 0), Some(0));
            assert_eq!(out.get(32, 64), Some(255));
        }
    }
}
