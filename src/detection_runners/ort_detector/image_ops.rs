//! Functions to preprocess images.
//! Adapted from: https://github.com/jamjamjon

use anyhow::{bail, Result};
use fast_image_resize::{
    images::{CroppedImageMut, Image as FirImage},
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use ndarray::Array;
use rayon::prelude::*;
use crate::data::X;

/// Padding value used by YOLO letterboxing.
pub const LETTERBOX_FILL: u8 = 114;

/// Resize mode enum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeMode {
    FitExact,
    Letterbox,
}

/// Main preprocessing entry point.
///
/// Returns an NCHW batch normalised to `[0, 1]`. Letterboxed images are anchored at
/// the top-left corner, so model coordinates map back to the source by dividing by
/// [`letterbox_ratio`].
pub fn preprocess(
    xs: &[RgbImage],
    target_h: u32,
    target_w: u32,
    resize_mode: ResizeMode,
) -> Result<X> {
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));

    // Parallel preprocessing per image
    let image_tensors: Vec<Vec<f32>> = xs
        .par_iter()
        .map(|img| -> Result<Vec<f32>> {
            let mut resizer = Resizer::new();
            let src = to_fir_image(img.clone())?;
            let resized = match resize_mode {
                ResizeMode::FitExact => resize_image(&src, target_h, target_w, &mut resizer, &options)?,
                ResizeMode::Letterbox => letterbox_image(&src, target_h, target_w, LETTERBOX_FILL, &mut resizer, &options)?,
            };
            nchw_normalize_flat(&resized)
        })
        .collect::<Result<_>>()?;

    // Stack into one batch manually
    let channels = 3;
    let height = target_h as usize;
    let width = target_w as usize;
    let image_size = channels * height * width;

    let mut batch_flat: Vec<f32> = Vec::with_capacity(xs.len() * image_size);
    for tensor in image_tensors.iter() {
        batch_flat.extend_from_slice(tensor);
    }

    let batch = Array::from_shape_vec(
        (xs.len(), channels, height, width),
        batch_flat,
    )?.into_dyn();

    Ok(X::from(batch))
}

/// Scale applied to a `w0 x h0` image so it fits inside `target_w x target_h`.
pub fn letterbox_ratio(w0: u32, h0: u32, target_w: u32, target_h: u32) -> f32 {
    (target_w as f32 / w0 as f32).min(target_h as f32 / h0 as f32)
}

pub fn to_fir_image<'a>(image: RgbImage) -> Result<FirImage<'a>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        bail!("Cannot preprocess an empty {}x{} image", width, height);
    }
    let buffer = image.into_raw();

    Ok(FirImage::from_vec_u8(width, height, buffer, PixelType::U8x3)?)
}

fn resize_image<'a>(
    img: &FirImage,
    target_h: u32,
    target_w: u32,
    resizer: &mut Resizer,
    config: &ResizeOptions,
) -> Result<FirImage<'a>> {
    let mut dst = FirImage::new(target_w, target_h, PixelType::U8x3);
    resizer.resize(img, &mut dst, config)?;
    Ok(dst)
}

fn letterbox_image<'a>(
    img: &FirImage,
    target_h: u32,
    target_w: u32,
    bg: u8,
    resizer: &mut Resizer,
    resize_options: &ResizeOptions,
) -> Result<FirImage<'a>> {
    let (w0, h0) = (img.width(), img.height());
    let scale = letterbox_ratio(w0, h0, target_w, target_h);
    let new_w = ((w0 as f32 * scale).round() as u32).clamp(1, target_w);
    let new_h = ((h0 as f32 * scale).round() as u32).clamp(1, target_h);

    let mut padded = FirImage::from_vec_u8(
        target_w,
        target_h,
        vec![bg; (target_w * target_h * 3) as usize],
        PixelType::U8x3,
    )?;

    let mut cropped = CroppedImageMut::new(&mut padded, 0, 0, new_w, new_h)?;
    resizer.resize(img, &mut cropped, resize_options)?;

    Ok(padded)
}

fn nchw_normalize_flat(img: &FirImage) -> Result<Vec<f32>> {
    let buf = img.buffer();
    let w = img.width() as usize;
    let h = img.height() as usize;

    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let mut out = vec![0.0f32; buf.len()];
    let hw = w * h;

    for i in 0..hw {
        out[i] = buf[3 * i] as f32 / 255.0;
        out[i + hw] = buf[3 * i + 1] as f32 / 255.0;
        out[i + 2 * hw] = buf[3 * i + 2] as f32 / 255.0;
    }

    Ok(out)
}
