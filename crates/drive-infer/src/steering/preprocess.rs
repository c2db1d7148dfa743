use crate::InferError;
use drive_base::Tensor;

use super::types::{CROP_BOTTOM, CROP_TOP, INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH};

/// Preprocess a camera frame for the steering model.
///
/// Takes an RGB frame in HWC layout `[height, width, 3]` and returns the
/// model input `[66, 200, 3]` in YUV order with values in `[0.0, 1.0]`.
///
/// Steps, in order:
/// - keep rows `[60, 135)` (drops sky and hood)
/// - RGB -> YUV
/// - 3x3 Gaussian blur
/// - bilinear resize to 200x66
/// - rescale from [0, 255] to [0.0, 1.0]
///
/// Every stage before the last works on 8-bit pixels and rounds its output,
/// so the result is bit-identical across calls for the same frame.
pub fn preprocess(frame: &Tensor<u8>) -> Result<Tensor<f32>, InferError> {
    let Some((height, width, channels)) = frame.hwc() else {
        return Err(InferError::ShapeMismatch {
            expected: "[H, W, 3]".to_string(),
            got: format!("{:?}", frame.shape),
        });
    };
    if channels != INPUT_CHANNELS {
        return Err(InferError::ShapeMismatch {
            expected: "3 channels".to_string(),
            got: format!("{} channels", channels),
        });
    }
    if height < CROP_BOTTOM || width == 0 {
        return Err(InferError::ShapeMismatch {
            expected: format!("at least {} rows", CROP_BOTTOM),
            got: format!("{}x{} frame", width, height),
        });
    }

    let cropped = crop_rows(frame, CROP_TOP, CROP_BOTTOM)?;
    let yuv = rgb_to_yuv(&cropped);
    let blurred = gaussian_blur_3x3(&yuv);
    let resized = resize_bilinear(&blurred, INPUT_WIDTH, INPUT_HEIGHT)?;
    Ok(normalize(&resized))
}

/// Keep rows `[top, bottom)` of an HWC tensor.
pub fn crop_rows(frame: &Tensor<u8>, top: usize, bottom: usize) -> Result<Tensor<u8>, InferError> {
    let (height, width, channels) = frame.hwc().ok_or_else(|| InferError::ShapeMismatch {
        expected: "[H, W, C]".to_string(),
        got: format!("{:?}", frame.shape),
    })?;
    if top > bottom || bottom > height {
        return Err(InferError::ShapeMismatch {
            expected: format!("rows {}..{}", top, bottom),
            got: format!("{} rows", height),
        });
    }

    let row_len = width * channels;
    let data = frame.data[top * row_len..bottom * row_len].to_vec();
    Ok(Tensor::new(vec![bottom - top, width, channels], data)?)
}

/// Convert 8-bit RGB pixels to 8-bit YUV (BT.601 analog weights, chroma offset 128).
pub fn rgb_to_yuv(frame: &Tensor<u8>) -> Tensor<u8> {
    let mut data = Vec::with_capacity(frame.data.len());
    for px in frame.data.chunks_exact(3) {
        let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        let u = 0.492 * (b - y) + 128.0;
        let v = 0.877 * (r - y) + 128.0;
        data.extend_from_slice(&[saturate(y), saturate(u), saturate(v)]);
    }
    Tensor {
        shape: frame.shape.clone(),
        data,
    }
}

/// Blur each channel with the 3x3 Gaussian kernel `[1, 2, 1] x [1, 2, 1] / 16`.
///
/// Borders are mirrored without repeating the edge pixel (`-1 -> 1`).
pub fn gaussian_blur_3x3(frame: &Tensor<u8>) -> Tensor<u8> {
    const KERNEL: [f32; 3] = [0.25, 0.5, 0.25];

    let Some((height, width, channels)) = frame.hwc() else {
        return frame.clone();
    };

    // horizontal pass into f32 so rounding happens once
    let mut horizontal = vec![0.0f32; frame.data.len()];
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut acc = 0.0;
                for (k, weight) in KERNEL.iter().enumerate() {
                    let sx = reflect_101(x as isize + k as isize - 1, width);
                    acc += weight * frame.data[(y * width + sx) * channels + c] as f32;
                }
                horizontal[(y * width + x) * channels + c] = acc;
            }
        }
    }

    let mut data = vec![0u8; frame.data.len()];
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut acc = 0.0;
                for (k, weight) in KERNEL.iter().enumerate() {
                    let sy = reflect_101(y as isize + k as isize - 1, height);
                    acc += weight * horizontal[(sy * width + x) * channels + c];
                }
                data[(y * width + x) * channels + c] = saturate(acc);
            }
        }
    }

    Tensor {
        shape: frame.shape.clone(),
        data,
    }
}

/// Bilinear resize of an HWC tensor with half-pixel centres.
pub fn resize_bilinear(
    frame: &Tensor<u8>,
    out_width: usize,
    out_height: usize,
) -> Result<Tensor<u8>, InferError> {
    let (height, width, channels) = frame.hwc().ok_or_else(|| InferError::ShapeMismatch {
        expected: "[H, W, C]".to_string(),
        got: format!("{:?}", frame.shape),
    })?;
    if height == 0 || width == 0 {
        return Err(InferError::ShapeMismatch {
            expected: "non-empty frame".to_string(),
            got: format!("{:?}", frame.shape),
        });
    }

    let xs = sample_positions(width, out_width);
    let ys = sample_positions(height, out_height);

    let mut data = Vec::with_capacity(out_width * out_height * channels);
    for &(y0, y1, fy) in &ys {
        for &(x0, x1, fx) in &xs {
            for c in 0..channels {
                let at = |y: usize, x: usize| frame.data[(y * width + x) * channels + c] as f32;
                let top = (1.0 - fx) * at(y0, x0) + fx * at(y0, x1);
                let bottom = (1.0 - fx) * at(y1, x0) + fx * at(y1, x1);
                data.push(saturate((1.0 - fy) * top + fy * bottom));
            }
        }
    }

    Ok(Tensor::new(vec![out_height, out_width, channels], data)?)
}

/// Rescale 8-bit values to `[0.0, 1.0]`.
pub fn normalize(frame: &Tensor<u8>) -> Tensor<f32> {
    Tensor {
        shape: frame.shape.clone(),
        data: frame.data.iter().map(|&v| v as f32 / 255.0).collect(),
    }
}

/// For each output index: the two source indices to blend and the weight of the second.
fn sample_positions(src_len: usize, dst_len: usize) -> Vec<(usize, usize, f32)> {
    let scale = src_len as f32 / dst_len as f32;
    (0..dst_len)
        .map(|d| {
            let pos = (d as f32 + 0.5) * scale - 0.5;
            let mut i0 = pos.floor() as isize;
            let mut frac = pos - i0 as f32;
            if i0 < 0 {
                i0 = 0;
                frac = 0.0;
            }
            let last = src_len as isize - 1;
            if i0 >= last {
                i0 = last;
                frac = 0.0;
            }
            let i0 = i0 as usize;
            (i0, (i0 + 1).min(src_len - 1), frac)
        })
        .collect()
}

fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let mirrored = if i < 0 {
        -i
    } else if i >= len {
        2 * len - 2 - i
    } else {
        i
    };
    mirrored as usize
}

fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
