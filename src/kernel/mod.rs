#![allow(
    clippy::needless_range_loop,
    reason = "keep the scalar code comparable to the vectorized code"
)]
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
use core::fmt::{Debug, Display};

use num_traits::float::FloatCore;

use crate::{
    buffer::{COLOR_CHANNELS, GrayscaleBuffer, PixelBuffer, ValidShape},
    error::InvalidInputError,
};
use constants::{LUMA8_MAX, RGB8_TO_LUMA8_FIXED_SCALE, RGB8_TO_LUMA8_TABLE_ITU_FIXED};

/// Kernels based on x86-64 intrinsics.
#[cfg(target_arch = "x86_64")]
pub mod x86;

/// Conversion constants.
pub mod constants;

/// Runtime kernel selection.
pub mod router;

use router::KernelRouter;

/// Round a weighted sum to the nearest luma level (ties away from zero) and clamp it to `[0, 255]`.
///
/// Float sums carry representation error, so a mathematically exact tie may land on either side.
/// Use [`quantize_luma_fixed`] where the result must be exact.
#[inline(always)]
#[must_use]
pub fn quantize_luma(luma: f32) -> u8 {
    FloatCore::round(luma).clamp(0.0, LUMA8_MAX) as u8
}

/// Round a fixed-point weighted sum (scaled by [`RGB8_TO_LUMA8_FIXED_SCALE`]) to the nearest luma level, ties up.
#[inline(always)]
#[must_use]
pub const fn quantize_luma_fixed(weighted: u32) -> u8 {
    let luma = weighted.saturating_add(RGB8_TO_LUMA8_FIXED_SCALE / 2) / RGB8_TO_LUMA8_FIXED_SCALE;
    if luma > u8::MAX as u32 {
        u8::MAX
    } else {
        luma as u8
    }
}

/// Compute kernel for RGB8 to LUMA8 conversion.
///
/// All kernels apply the ITU-R BT.601 weights in red, green, blue order, then round to the nearest level.
///
/// [`LoopKernel`] is the reference and is exact. Every other kernel is within one luma level of it.
pub trait Kernel {
    /// The identification token of the kernel.
    type Ident: Debug + Display + Clone + Copy + 'static + PartialEq;

    /// Identify the kernel.
    fn ident(&self) -> Self::Ident;

    /// Whether the hardware the kernel needs is present at runtime.
    fn required_hardware_features_met() -> bool
    where
        Self: Sized,
    {
        true
    }

    /// Convert a validated buffer, writing one luma value per pixel to `output` in row-major order.
    ///
    /// `shape` must come from `input.validate()` and `output` must hold exactly `shape.pixels()` values.
    fn cvt_rgb8_to_luma8(&mut self, input: &PixelBuffer<'_>, shape: ValidShape, output: &mut [u8]);

    /// Validate `input` and convert it into a freshly allocated grid.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] if the buffer does not have 3 channels, has an empty dimension, or its sample count does not match its shape.
    fn convert(&mut self, input: &PixelBuffer<'_>) -> Result<GrayscaleBuffer, InvalidInputError> {
        let shape = input.validate()?;
        let mut output = GrayscaleBuffer::zeroed(shape);
        self.cvt_rgb8_to_luma8(input, shape, output.as_mut_slice());
        Ok(output)
    }
}

/// The reference kernel: an explicit row-major walk over every pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopKernel;

impl Kernel for LoopKernel {
    type Ident = &'static str;

    fn ident(&self) -> Self::Ident {
        "loop"
    }

    fn cvt_rgb8_to_luma8(&mut self, input: &PixelBuffer<'_>, shape: ValidShape, output: &mut [u8]) {
        let [ri, gi, bi] = input.order().rgb_offsets();
        let [wr, wg, wb] = RGB8_TO_LUMA8_TABLE_ITU_FIXED;

        for i in 0..shape.height() {
            for j in 0..shape.width() {
                let pixel = input.pixel(i, j);
                let weighted = wr * u32::from(pixel[ri])
                    + wg * u32::from(pixel[gi])
                    + wb * u32::from(pixel[bi]);
                output[i * shape.width() + j] = quantize_luma_fixed(weighted);
            }
        }
    }
}

/// A portable bulk kernel operating on whole channel planes.
///
/// The conversion is three passes over contiguous buffers: plane extraction, a multiply-accumulate per plane, and a single quantize pass.
/// It accumulates the same fixed-point weights as [`LoopKernel`], so the output is bit-identical to the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorKernel;

impl VectorKernel {
    /// De-interleave the first `pixels` pixels of `input` into red, green and blue planes.
    pub(crate) fn split_planes(input: &PixelBuffer<'_>, pixels: usize) -> [Vec<u8>; 3] {
        let samples = &input.samples()[..pixels * COLOR_CHANNELS];
        input.order().rgb_offsets().map(|offset| {
            samples
                .iter()
                .skip(offset)
                .step_by(COLOR_CHANNELS)
                .copied()
                .collect()
        })
    }

    /// `acc += weight * plane`, elementwise.
    pub(crate) fn accumulate(acc: &mut [u32], plane: &[u8], weight: u32) {
        acc.iter_mut()
            .zip(plane)
            .for_each(|(a, &p)| *a += weight * u32::from(p));
    }

    /// `output = round(acc / scale)`, elementwise.
    pub(crate) fn quantize(acc: &[u32], output: &mut [u8]) {
        output
            .iter_mut()
            .zip(acc)
            .for_each(|(o, &a)| *o = quantize_luma_fixed(a));
    }

    pub(crate) fn luma_planes(planes: &[Vec<u8>; 3], output: &mut [u8]) {
        let mut acc = vec![0u32; output.len()];
        for (plane, weight) in planes.iter().zip(RGB8_TO_LUMA8_TABLE_ITU_FIXED) {
            Self::accumulate(&mut acc, plane, weight);
        }
        Self::quantize(&acc, output);
    }
}

impl Kernel for VectorKernel {
    type Ident = &'static str;

    fn ident(&self) -> Self::Ident {
        "portable"
    }

    fn cvt_rgb8_to_luma8(&mut self, input: &PixelBuffer<'_>, shape: ValidShape, output: &mut [u8]) {
        let planes = Self::split_planes(input, shape.pixels());
        Self::luma_planes(&planes, &mut output[..shape.pixels()]);
    }
}

/// The concrete type of [`smart_kernel`] on this target.
#[cfg(target_arch = "x86_64")]
pub type SmartKernelConcreteType = KernelRouter<x86::Avx2Kernel, VectorKernel>;

/// The concrete type of [`smart_kernel`] on this target.
#[cfg(not(target_arch = "x86_64"))]
pub type SmartKernelConcreteType = KernelRouter<VectorKernel, VectorKernel>;

/// Get the fastest bulk kernel available on the running CPU.
///
/// The decision is made once here; later calls on the returned kernel never re-probe the CPU.
#[must_use]
pub fn smart_kernel() -> SmartKernelConcreteType {
    #[cfg(target_arch = "x86_64")]
    {
        KernelRouter::new(x86::Avx2Kernel, VectorKernel)
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        KernelRouter::new(VectorKernel, VectorKernel)
    }
}

/// The same type as [`smart_kernel`], pinned to the portable kernel.
#[must_use]
pub fn portable_kernel() -> SmartKernelConcreteType {
    #[cfg(target_arch = "x86_64")]
    {
        KernelRouter::force_fallback(x86::Avx2Kernel, VectorKernel)
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        KernelRouter::force_fallback(VectorKernel, VectorKernel)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    const GOLDEN_INPUT: [u8; 12] = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
    const GOLDEN_OUTPUT: [u8; 4] = [76, 150, 29, 255];

    fn random_image(height: usize, width: usize) -> Vec<u8> {
        let mut rng = rand::rng();
        (0..height * width * 3).map(|_| rng.random()).collect()
    }

    fn test_golden_impl<K: Kernel>(kernel: &mut K) {
        let output = kernel
            .convert(&PixelBuffer::rgb8(&GOLDEN_INPUT, 2, 2))
            .unwrap();
        assert_eq!(output.as_slice(), &GOLDEN_OUTPUT, "kernel: {}", kernel.ident());
        assert_eq!(output.row(0), &[76, 150]);
        assert_eq!(output.row(1), &[29, 255]);
    }

    fn test_uniform_impl<K: Kernel>(kernel: &mut K) {
        for (height, width) in [(1, 1), (3, 5), (17, 9), (64, 64)] {
            let black = vec![0u8; height * width * 3];
            let white = vec![255u8; height * width * 3];
            let out = kernel
                .convert(&PixelBuffer::rgb8(&black, height, width))
                .unwrap();
            assert!(out.as_slice().iter().all(|&v| v == 0), "kernel: {}", kernel.ident());
            let out = kernel
                .convert(&PixelBuffer::rgb8(&white, height, width))
                .unwrap();
            assert!(out.as_slice().iter().all(|&v| v == 255), "kernel: {}", kernel.ident());
        }
    }

    fn test_rejects_invalid_impl<K: Kernel>(kernel: &mut K) {
        let samples = [0u8; 4 * 4];
        for channels in [1, 4] {
            assert_eq!(
                kernel.convert(&PixelBuffer::new(&samples[..4 * channels], 2, 2, channels)),
                Err(InvalidInputError::ChannelCount { channels })
            );
        }
        assert!(matches!(
            kernel.convert(&PixelBuffer::rgb8(&[], 0, 4)),
            Err(InvalidInputError::EmptyDimensions { .. })
        ));
        assert!(matches!(
            kernel.convert(&PixelBuffer::rgb8(&[], 4, 0)),
            Err(InvalidInputError::EmptyDimensions { .. })
        ));
        assert!(matches!(
            kernel.convert(&PixelBuffer::rgb8(&samples[..11], 2, 2)),
            Err(InvalidInputError::SampleCountMismatch { .. })
        ));
    }

    fn test_equivalence_impl<K: Kernel>(kernel: &mut K, tolerance: u8) {
        // odd widths leave a remainder after every lane-sized step
        for (height, width) in [(1, 1), (1, 7), (3, 9), (31, 17), (128, 96), (257, 129)] {
            let samples = random_image(height, width);
            let input = PixelBuffer::rgb8(&samples, height, width);
            let expected = LoopKernel.convert(&input).unwrap();
            let actual = kernel.convert(&input).unwrap();

            assert_eq!(actual.height(), height);
            assert_eq!(actual.width(), width);

            let diff = actual.max_abs_difference(&expected).unwrap();
            assert!(
                diff <= tolerance,
                "kernel {} differs by {} (tolerance: {}) on {}x{}",
                kernel.ident(),
                diff,
                tolerance,
                height,
                width
            );
        }
    }

    fn test_determinism_impl<K: Kernel>(kernel: &mut K) {
        let samples = random_image(45, 77);
        let input = PixelBuffer::rgb8(&samples, 45, 77);
        let first = kernel.convert(&input).unwrap();
        let second = kernel.convert(&input).unwrap();
        assert_eq!(first, second);
    }

    fn test_bgr_impl<K: Kernel>(kernel: &mut K) {
        let (height, width) = (19, 23);
        let rgb = random_image(height, width);
        let bgr: Vec<u8> = rgb
            .chunks_exact(3)
            .flat_map(|p| [p[2], p[1], p[0]])
            .collect();
        let from_rgb = kernel
            .convert(&PixelBuffer::rgb8(&rgb, height, width))
            .unwrap();
        let from_bgr = kernel
            .convert(&PixelBuffer::bgr8(&bgr, height, width))
            .unwrap();
        assert_eq!(from_rgb, from_bgr);
    }

    #[test]
    fn test_quantize_luma() {
        assert_eq!(quantize_luma(0.0), 0);
        assert_eq!(quantize_luma(0.49), 0);
        assert_eq!(quantize_luma(0.5), 1);
        assert_eq!(quantize_luma(76.245), 76);
        assert_eq!(quantize_luma(149.685), 150);
        assert_eq!(quantize_luma(254.5), 255);
        assert_eq!(quantize_luma(255.00002), 255);
        assert_eq!(quantize_luma(300.0), 255);
        assert_eq!(quantize_luma(-3.0), 0);
    }

    #[test]
    fn test_quantize_luma_fixed() {
        assert_eq!(quantize_luma_fixed(0), 0);
        assert_eq!(quantize_luma_fixed(499), 0);
        assert_eq!(quantize_luma_fixed(500), 1);
        assert_eq!(quantize_luma_fixed(26_500), 27);
        assert_eq!(quantize_luma_fixed(255_000), 255);
        assert_eq!(quantize_luma_fixed(u32::MAX), 255);
    }

    fn test_exact_rounding_impl<K: Kernel>(kernel: &mut K) {
        // one 256x256 image per red value covers every rgb8 triple
        let mut samples = vec![0u8; 256 * 256 * 3];
        for r in 0..=255u8 {
            for (i, pixel) in samples.chunks_exact_mut(3).enumerate() {
                pixel.copy_from_slice(&[r, (i / 256) as u8, (i % 256) as u8]);
            }
            let out = kernel.convert(&PixelBuffer::rgb8(&samples, 256, 256)).unwrap();

            for (pixel, &luma) in samples.chunks_exact(3).zip(out.as_slice()) {
                let weighted =
                    299 * u32::from(pixel[0]) + 587 * u32::from(pixel[1]) + 114 * u32::from(pixel[2]);
                let error = i64::from(luma) * 1000 - i64::from(weighted);
                assert!(
                    error.abs() <= 500,
                    "kernel {}: {:?} -> {} (exact {}/1000)",
                    kernel.ident(),
                    pixel,
                    luma,
                    weighted
                );
                if weighted % 1000 == 500 {
                    assert_eq!(
                        u32::from(luma),
                        weighted / 1000 + 1,
                        "kernel {}: tie {:?} must round up",
                        kernel.ident(),
                        pixel
                    );
                }
            }
        }
    }

    #[test]
    fn test_known_ties_round_up() {
        // 0.299 * 4 + 0.587 * 40 + 0.114 * 16 = 26.5
        let samples = [4, 40, 16, 10, 0, 0, 0, 0, 0, 255, 255, 255];
        for out in [
            LoopKernel.convert(&PixelBuffer::rgb8(&samples, 2, 2)).unwrap(),
            VectorKernel.convert(&PixelBuffer::rgb8(&samples, 2, 2)).unwrap(),
        ] {
            // 2.99 rounds to 3
            assert_eq!(out.as_slice(), &[27, 3, 0, 255]);
        }
    }

    #[test]
    fn test_loop_kernel_exact_rounding() {
        test_exact_rounding_impl(&mut LoopKernel);
    }

    #[test]
    fn test_vector_kernel_exact_rounding() {
        test_exact_rounding_impl(&mut VectorKernel);
    }

    #[test]
    fn test_loop_kernel() {
        let mut kernel = LoopKernel;
        test_golden_impl(&mut kernel);
        test_uniform_impl(&mut kernel);
        test_rejects_invalid_impl(&mut kernel);
        test_determinism_impl(&mut kernel);
        test_bgr_impl(&mut kernel);
    }

    #[test]
    fn test_loop_kernel_visits_every_pixel() {
        let (height, width) = (13, 11);
        let samples: Vec<u8> = (0..height * width)
            .flat_map(|i| {
                let v = (i % 251) as u8;
                [v, v, v]
            })
            .collect();
        let out = LoopKernel
            .convert(&PixelBuffer::rgb8(&samples, height, width))
            .unwrap();
        for (i, v) in out.as_slice().iter().enumerate() {
            assert_eq!(*v, (i % 251) as u8);
        }
    }

    #[test]
    fn test_vector_kernel() {
        let mut kernel = VectorKernel;
        test_golden_impl(&mut kernel);
        test_uniform_impl(&mut kernel);
        test_rejects_invalid_impl(&mut kernel);
        test_determinism_impl(&mut kernel);
        test_bgr_impl(&mut kernel);
        test_equivalence_impl(&mut kernel, 0);
    }

    #[test]
    fn test_split_planes() {
        let input = PixelBuffer::rgb8(&GOLDEN_INPUT, 2, 2);
        let [r, g, b] = VectorKernel::split_planes(&input, 4);
        assert_eq!(r, [255, 0, 0, 255]);
        assert_eq!(g, [0, 255, 0, 255]);
        assert_eq!(b, [0, 0, 255, 255]);

        let bgr = [3, 2, 1];
        let [r, g, b] = VectorKernel::split_planes(&PixelBuffer::bgr8(&bgr, 1, 1), 1);
        assert_eq!((r[0], g[0], b[0]), (1, 2, 3));
    }

    #[test]
    fn test_smart_kernel() {
        let mut kernel = smart_kernel();
        test_golden_impl(&mut kernel);
        test_uniform_impl(&mut kernel);
        test_rejects_invalid_impl(&mut kernel);
        test_determinism_impl(&mut kernel);
        test_equivalence_impl(&mut kernel, 1);
    }

    #[test]
    fn test_portable_kernel() {
        let mut kernel = portable_kernel();
        assert!(kernel.ident().fell_through);
        test_golden_impl(&mut kernel);
        test_equivalence_impl(&mut kernel, 0);
    }
}
