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

/// Lookup table for converting RGB8 to LUMA8 using ITU-R BT.601.
pub const RGB8_TO_LUMA8_TABLE_ITU: [f32; 3] = [0.299, 0.587, 0.114];

/// [`RGB8_TO_LUMA8_TABLE_ITU`] scaled by [`RGB8_TO_LUMA8_FIXED_SCALE`], exact in integers.
pub const RGB8_TO_LUMA8_TABLE_ITU_FIXED: [u32; 3] = [299, 587, 114];

/// Denominator of [`RGB8_TO_LUMA8_TABLE_ITU_FIXED`].
pub const RGB8_TO_LUMA8_FIXED_SCALE: u32 = 1000;

/// Largest representable luma value.
pub const LUMA8_MAX: f32 = 255.0;

/// Number of pixels the bulk kernels process per step.
pub const LANES: usize = 8;
