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

use thiserror::Error;

/// The input buffer cannot be converted.
///
/// Every kernel checks its input before touching a single sample and returns this error unchanged to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    /// The buffer does not have exactly 3 color channels.
    #[error("expected 3 color channels, got {channels}")]
    ChannelCount {
        /// The channel count of the rejected buffer.
        channels: usize,
    },

    /// The buffer has no rows or no columns.
    #[error("image dimensions must be positive, got {height}x{width}")]
    EmptyDimensions {
        /// Number of rows.
        height: usize,
        /// Number of columns.
        width: usize,
    },

    /// The number of samples does not match `height * width * channels`.
    #[error("expected {expected} samples, got {actual}")]
    SampleCountMismatch {
        /// Samples required by the declared shape.
        expected: usize,
        /// Samples actually present.
        actual: usize,
    },

    /// `height * width * channels` does not fit in `usize`.
    #[error("image dimensions {height}x{width} overflow the address space")]
    DimensionOverflow {
        /// Number of rows.
        height: usize,
        /// Number of columns.
        width: usize,
    },

    /// The decoded samples are not 8-bit unsigned color.
    #[error("unsupported element type: {found}")]
    UnsupportedElementType {
        /// Description of the rejected pixel format.
        found: &'static str,
    },
}

/// Errors raised by the image I/O collaborators.
#[cfg(feature = "std")]
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[cfg(feature = "image")]
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        /// Path that was read.
        path: std::path::PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[cfg(feature = "image")]
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        /// Path that was written.
        path: std::path::PathBuf,
        /// Encoder error.
        #[source]
        source: image::ImageError,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The decoded image cannot be converted.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
}

#[cfg(feature = "std")]
impl Error {
    /// Whether the failure originates from the input data rather than the environment.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

/// Result type alias for I/O collaborator operations.
#[cfg(feature = "std")]
pub type Result<T> = core::result::Result<T, Error>;
