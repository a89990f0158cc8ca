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

use crate::buffer::COLOR_CHANNELS;

/// An 8-lane xorshift byte generator. Fast and reproducible, not statistically strong.
#[derive(Debug, Clone)]
pub struct XorShiftRng {
    states: [u32; 8],
}

impl XorShiftRng {
    /// Seed all lanes from one value.
    #[must_use]
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            states: core::array::from_fn(|i| {
                let mut s = seed.wrapping_add(i as u64);
                s ^= s << 11;
                s ^= s >> 8;
                // a zero lane would stay zero forever
                (s as u32) | 1
            }),
        }
    }

    #[inline(always)]
    fn update(&mut self) {
        for s in &mut self.states {
            *s ^= *s << 13;
            *s ^= *s >> 17;
            *s ^= *s << 5;
        }
        self.states.rotate_left(1);
    }

    /// Fill `buf` with pseudo-random bytes.
    pub fn fill(&mut self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(4 * 8) {
            self.update();
            let bytes = self.states.map(u32::to_le_bytes);
            for (dst, src) in chunk.iter_mut().zip(bytes.iter().flatten()) {
                *dst = *src;
            }
        }
    }
}

/// Generate `height * width` random RGB8 pixels, row-major.
#[must_use]
pub fn noise_rgb8(height: usize, width: usize, seed: u64) -> Vec<u8> {
    let mut samples = vec![0; height * width * COLOR_CHANNELS];
    XorShiftRng::seed_from_u64(seed).fill(&mut samples);
    samples
}

/// Generate a smooth RGB8 gradient: red grows along columns, green along rows, blue along the diagonal.
#[must_use]
pub fn gradient_rgb8(height: usize, width: usize) -> Vec<u8> {
    let scale = |i: usize, n: usize| (i * 255 / n.saturating_sub(1).max(1)) as u8;
    let mut samples = Vec::with_capacity(height * width * COLOR_CHANNELS);
    for i in 0..height {
        for j in 0..width {
            samples.extend_from_slice(&[
                scale(j, width),
                scale(i, height),
                scale(i + j, height + width - 1),
            ]);
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_reproducible() {
        assert_eq!(noise_rgb8(7, 11, 42), noise_rgb8(7, 11, 42));
        assert_ne!(noise_rgb8(7, 11, 42), noise_rgb8(7, 11, 43));
        assert_eq!(noise_rgb8(7, 11, 0).len(), 7 * 11 * 3);
    }

    #[test]
    fn test_noise_covers_range() {
        let samples = noise_rgb8(64, 64, 7);
        assert!(samples.iter().any(|&v| v < 16));
        assert!(samples.iter().any(|&v| v > 240));
    }

    #[test]
    fn test_gradient_corners() {
        let samples = gradient_rgb8(4, 6);
        assert_eq!(samples.len(), 4 * 6 * 3);
        assert_eq!(&samples[..3], &[0, 0, 0]);
        assert_eq!(&samples[samples.len() - 3..], &[255, 255, 255]);
    }
}
