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

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};

use crate::{
    buffer::{GrayscaleBuffer, PixelBuffer},
    error::{Error, InvalidInputError, Result},
};

fn open(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an image that is already 8-bit RGB.
///
/// # Errors
///
/// Returns [`Error::ImageLoad`] if the file cannot be read or decoded, and [`Error::InvalidInput`] if the decoded pixels are not 8-bit RGB.
pub fn load_rgb8<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    match open(path)? {
        DynamicImage::ImageRgb8(img) => Ok(img),
        other => Err(InvalidInputError::UnsupportedElementType {
            found: color_type_name(&other),
        }
        .into()),
    }
}

/// Load any decodable image and coerce it to 8-bit RGB, dropping alpha and narrowing deeper samples.
///
/// # Errors
///
/// Returns [`Error::ImageLoad`] if the file cannot be read or decoded.
pub fn load_rgb8_coerced<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    let img = open(path)?;
    if !matches!(img, DynamicImage::ImageRgb8(_)) {
        log::warn!(
            "{}: coercing {} to rgb8",
            path.display(),
            color_type_name(&img)
        );
    }
    Ok(img.into_rgb8())
}

/// Borrow a decoded image as a [`PixelBuffer`].
#[must_use]
pub fn pixel_buffer(img: &RgbImage) -> PixelBuffer<'_> {
    PixelBuffer::rgb8(img.as_raw(), img.height() as usize, img.width() as usize)
}

/// Encode a grid as a grayscale image, format chosen by file extension.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory cannot be created and [`Error::ImageSave`] if encoding or writing fails.
pub fn save_luma8<P: AsRef<Path>>(path: P, gray: &GrayscaleBuffer) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    to_gray_image(gray)?
        .save(path)
        .map_err(|source| Error::ImageSave {
            path: path.to_path_buf(),
            source,
        })
}

fn to_gray_image(gray: &GrayscaleBuffer) -> Result<GrayImage> {
    let (width, height) = match (u32::try_from(gray.width()), u32::try_from(gray.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(InvalidInputError::DimensionOverflow {
                height: gray.height(),
                width: gray.width(),
            }
            .into());
        }
    };

    GrayImage::from_raw(width, height, gray.as_slice().to_vec()).ok_or_else(|| {
        InvalidInputError::SampleCountMismatch {
            expected: gray.height() * gray.width(),
            actual: gray.as_slice().len(),
        }
        .into()
    })
}

fn color_type_name(img: &DynamicImage) -> &'static str {
    match img {
        DynamicImage::ImageLuma8(_) => "luma8",
        DynamicImage::ImageLumaA8(_) => "luma-alpha8",
        DynamicImage::ImageRgb8(_) => "rgb8",
        DynamicImage::ImageRgba8(_) => "rgba8",
        DynamicImage::ImageLuma16(_) => "luma16",
        DynamicImage::ImageLumaA16(_) => "luma-alpha16",
        DynamicImage::ImageRgb16(_) => "rgb16",
        DynamicImage::ImageRgba16(_) => "rgba16",
        DynamicImage::ImageRgb32F(_) => "rgb32f",
        DynamicImage::ImageRgba32F(_) => "rgba32f",
        _ => "unknown",
    }
}
