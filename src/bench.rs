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

use core::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::{
    buffer::{GrayscaleBuffer, PixelBuffer},
    error::InvalidInputError,
    kernel::{Kernel, LoopKernel, SmartKernelConcreteType, VectorKernel, smart_kernel},
};

/// Timings and outputs of one side-by-side run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    loop_duration: Duration,
    vector_duration: Duration,
    loop_output: GrayscaleBuffer,
    vector_output: GrayscaleBuffer,
}

impl BenchmarkResult {
    /// Time spent in the reference kernel.
    #[must_use]
    pub fn loop_duration(&self) -> Duration {
        self.loop_duration
    }

    /// Time spent in the bulk kernel.
    #[must_use]
    pub fn vector_duration(&self) -> Duration {
        self.vector_duration
    }

    /// Time spent in the reference kernel, in seconds.
    #[must_use]
    pub fn loop_seconds(&self) -> f64 {
        self.loop_duration.as_secs_f64()
    }

    /// Time spent in the bulk kernel, in seconds.
    #[must_use]
    pub fn vector_seconds(&self) -> f64 {
        self.vector_duration.as_secs_f64()
    }

    /// `loop / vector`. Infinite when the bulk kernel took no measurable time.
    #[must_use]
    pub fn speedup(&self) -> f64 {
        let vector = self.vector_seconds();
        if vector == 0.0 {
            return f64::INFINITY;
        }
        self.loop_seconds() / vector
    }

    /// Output of the reference kernel.
    #[must_use]
    pub fn loop_output(&self) -> &GrayscaleBuffer {
        &self.loop_output
    }

    /// Output of the bulk kernel.
    #[must_use]
    pub fn vector_output(&self) -> &GrayscaleBuffer {
        &self.vector_output
    }

    /// Take both outputs, reference first.
    #[must_use]
    pub fn into_outputs(self) -> (GrayscaleBuffer, GrayscaleBuffer) {
        (self.loop_output, self.vector_output)
    }

    /// Largest per-pixel disagreement between the two outputs.
    #[must_use]
    pub fn max_abs_difference(&self) -> u8 {
        // both outputs come from the same validated shape
        self.loop_output
            .max_abs_difference(&self.vector_output)
            .unwrap_or(u8::MAX)
    }

    /// Number of pixels converted by each kernel per call.
    #[must_use]
    pub fn pixels(&self) -> usize {
        self.loop_output.height() * self.loop_output.width()
    }
}

/// Times a reference kernel against a bulk kernel on the same input.
///
/// Each measurement brackets exactly one `convert` call: nothing else runs between the two timestamps.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner<L = LoopKernel, V = VectorKernel> {
    reference: L,
    candidate: V,
    repetitions: NonZeroUsize,
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new(LoopKernel, VectorKernel)
    }
}

impl BenchmarkRunner<LoopKernel, SmartKernelConcreteType> {
    /// Compare the reference kernel against [`smart_kernel`].
    #[must_use]
    pub fn smart() -> Self {
        Self::new(LoopKernel, smart_kernel())
    }
}

impl<L: Kernel, V: Kernel> BenchmarkRunner<L, V> {
    /// Compare `reference` against `candidate`.
    pub fn new(reference: L, candidate: V) -> Self {
        Self {
            reference,
            candidate,
            repetitions: NonZeroUsize::MIN,
        }
    }

    /// Call each kernel `repetitions` times and keep the fastest call.
    #[must_use]
    pub fn repetitions(mut self, repetitions: NonZeroUsize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// The reference kernel.
    pub fn reference(&self) -> &L {
        &self.reference
    }

    /// The bulk kernel.
    pub fn candidate(&self) -> &V {
        &self.candidate
    }

    /// Time both kernels on `input`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] from the kernels unchanged. Nothing is timed if the input is rejected.
    pub fn run(&mut self, input: &PixelBuffer<'_>) -> Result<BenchmarkResult, InvalidInputError> {
        let shape = input.validate()?;
        log::debug!(
            "benchmarking {} against {} on {}x{}, {} repetition(s)",
            self.reference.ident(),
            self.candidate.ident(),
            shape.height(),
            shape.width(),
            self.repetitions
        );

        let (loop_duration, loop_output) =
            measure(&mut self.reference, input, self.repetitions)?;
        let (vector_duration, vector_output) =
            measure(&mut self.candidate, input, self.repetitions)?;

        let result = BenchmarkResult {
            loop_duration,
            vector_duration,
            loop_output,
            vector_output,
        };

        log::info!(
            "{}: {:.4}s, {}: {:.4}s, speedup {:.1}x",
            self.reference.ident(),
            result.loop_seconds(),
            self.candidate.ident(),
            result.vector_seconds(),
            result.speedup()
        );

        Ok(result)
    }
}

fn measure<K: Kernel>(
    kernel: &mut K,
    input: &PixelBuffer<'_>,
    repetitions: NonZeroUsize,
) -> Result<(Duration, GrayscaleBuffer), InvalidInputError> {
    let start = Instant::now();
    let output = kernel.convert(input)?;
    let mut best = start.elapsed();
    log::debug!("{} call 1: {:?}", kernel.ident(), best);

    for call in 2..=repetitions.get() {
        let start = Instant::now();
        let repeated = kernel.convert(input)?;
        let elapsed = start.elapsed();
        drop(repeated);

        log::debug!("{} call {}: {:?}", kernel.ident(), call, elapsed);
        best = best.min(elapsed);
    }

    Ok((best, output))
}
