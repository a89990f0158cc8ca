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

use alloc::vec::Vec;
use core::arch::x86_64::*;

use crate::buffer::{PixelBuffer, ValidShape};

use super::{
    Kernel, VectorKernel,
    constants::{LANES, LUMA8_MAX, RGB8_TO_LUMA8_TABLE_ITU},
    quantize_luma,
};

cpufeatures::new!(cpuid_avx2_fma, "avx2", "fma");

/// Compute kernel using hand-written AVX2 intrinsics.
///
/// Note: This would produce a slightly different numeric result than the reference implementation due to:
///
/// - `f32` weights, which cannot represent the BT.601 coefficients exactly, so exact ties may land on either side.
/// - fused multiply-add skipping the intermediate rounding of each product.
/// - `cvtps` rounding ties to even where the reference rounds ties up.
///
/// These only matter on values sitting on a rounding boundary, and never by more than one luma level.
///
/// The CPU is probed on every call; if AVX2 or FMA is missing the portable kernel runs instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avx2Kernel;

impl Avx2Kernel {
    /// Convert three equally sized planes into `output`.
    ///
    /// # Safety
    ///
    /// The CPU must support AVX2 and FMA.
    ///
    /// # Panics
    ///
    /// Panics if any plane is not exactly as long as `output`.
    #[target_feature(enable = "avx2,fma")]
    pub(crate) unsafe fn luma_planes(planes: &[Vec<u8>; 3], output: &mut [u8]) {
        let n = output.len();
        assert!(
            planes.iter().all(|plane| plane.len() == n),
            "plane length does not match output length"
        );
        let [wr, wg, wb] = RGB8_TO_LUMA8_TABLE_ITU;

        let mut i = 0;
        unsafe {
            let weight_r = _mm256_set1_ps(wr);
            let weight_g = _mm256_set1_ps(wg);
            let weight_b = _mm256_set1_ps(wb);
            let floor = _mm256_setzero_ps();
            let ceil = _mm256_set1_ps(LUMA8_MAX);

            macro_rules! load_plane {
                ($plane:expr) => {
                    _mm256_cvtepi32_ps(_mm256_cvtepu8_epi32(_mm_loadl_epi64(
                        $plane.as_ptr().add(i).cast(),
                    )))
                };
            }

            while i + LANES <= n {
                let mut acc = _mm256_mul_ps(load_plane!(planes[0]), weight_r);
                acc = _mm256_fmadd_ps(load_plane!(planes[1]), weight_g, acc);
                acc = _mm256_fmadd_ps(load_plane!(planes[2]), weight_b, acc);

                let clamped = _mm256_min_ps(_mm256_max_ps(acc, floor), ceil);
                let dwords = _mm256_cvtps_epi32(clamped);
                let words = _mm_packus_epi32(
                    _mm256_castsi256_si128(dwords),
                    _mm256_extracti128_si256::<1>(dwords),
                );
                let bytes = _mm_packus_epi16(words, words);
                _mm_storel_epi64(output.as_mut_ptr().add(i).cast(), bytes);

                i += LANES;
            }
        }

        for j in i..n {
            output[j] = quantize_luma(
                wr * f32::from(planes[0][j]) + wg * f32::from(planes[1][j]) + wb * f32::from(planes[2][j]),
            );
        }
    }
}

impl Kernel for Avx2Kernel {
    type Ident = &'static str;

    fn ident(&self) -> Self::Ident {
        "avx2"
    }

    fn required_hardware_features_met() -> bool {
        cpuid_avx2_fma::get()
    }

    fn cvt_rgb8_to_luma8(&mut self, input: &PixelBuffer<'_>, shape: ValidShape, output: &mut [u8]) {
        let output = &mut output[..shape.pixels()];
        let planes = VectorKernel::split_planes(input, shape.pixels());

        if cpuid_avx2_fma::get() {
            unsafe { Self::luma_planes(&planes, output) };
        } else {
            log::debug!("avx2/fma not detected, running the portable kernel");
            VectorKernel::luma_planes(&planes, output);
        }
    }
}
