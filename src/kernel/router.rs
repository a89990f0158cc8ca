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

use core::fmt::{Debug, Display};

use crate::buffer::{PixelBuffer, ValidShape};

use super::Kernel;

/// Identifies which side of a [`KernelRouter`] runs, and whether it fell through at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackToken<PIdent, FIdent> {
    /// The preferred kernel.
    pub preferred: PIdent,
    /// The fallback kernel.
    pub fallback: FIdent,
    /// Whether the preferred kernel's hardware requirements were not met.
    pub fell_through: bool,
}

impl<PIdent: Display, FIdent: Display> Display for FallbackToken<PIdent, FIdent> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.fell_through {
            write!(f, "{} (fell through from {})", self.fallback, self.preferred)
        } else {
            write!(f, "{}", self.preferred)
        }
    }
}

/// A static fallback router for composing kernels.
///
/// The routing decision is materialized once at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelRouter<P, F> {
    materialized_decision: bool,
    preferred: P,
    fallback: F,
}

impl<P: Kernel, F: Kernel> KernelRouter<P, F> {
    /// Route to `preferred` if its hardware requirements are met, otherwise to `fallback`.
    pub fn new(preferred: P, fallback: F) -> Self {
        let materialized_decision = P::required_hardware_features_met();
        log::debug!(
            "kernel router: preferred={} fallback={} use_preferred={}",
            preferred.ident(),
            fallback.ident(),
            materialized_decision
        );
        Self {
            materialized_decision,
            preferred,
            fallback,
        }
    }

    /// Always route to the fallback kernel.
    pub fn force_fallback(preferred: P, fallback: F) -> Self {
        Self {
            materialized_decision: false,
            preferred,
            fallback,
        }
    }

    /// Whether calls go to the preferred kernel.
    pub fn uses_preferred(&self) -> bool {
        self.materialized_decision
    }
}

impl<P: Kernel, F: Kernel> Kernel for KernelRouter<P, F> {
    type Ident = FallbackToken<P::Ident, F::Ident>;

    fn ident(&self) -> Self::Ident {
        FallbackToken {
            preferred: self.preferred.ident(),
            fallback: self.fallback.ident(),
            fell_through: !self.materialized_decision,
        }
    }

    fn required_hardware_features_met() -> bool {
        F::required_hardware_features_met()
    }

    fn cvt_rgb8_to_luma8(&mut self, input: &PixelBuffer<'_>, shape: ValidShape, output: &mut [u8]) {
        if self.materialized_decision {
            self.preferred.cvt_rgb8_to_luma8(input, shape, output);
            return;
        }

        self.fallback.cvt_rgb8_to_luma8(input, shape, output);
    }
}
