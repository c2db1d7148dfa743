use drive_base::Tensor;
use drive_infer::InferError;
use drive_infer::steering::{
    INPUT_SHAPE, crop_rows, gaussian_blur_3x3, preprocess, resize_bilinear, rgb_to_yuv,
};

/// 320x160 frame shaped like the simulator camera, filled with a diagonal gradient.
fn gradient_frame() -> Tensor<u8> {
    let (height, width) = (160, 320);
    let mut data = Vec::with_capacity(height * width * 3);
    for y in 0..height {
        for x in 0..width {
            data.push((x % 256) as u8);
            data.push((y * 255 / (height - 1)) as u8);
            data.push(((x + y) % 256) as u8);
        }
    }
    Tensor::new(vec![height, width, 3], data).unwrap()
}

#[test]
fn test_preprocess_output_shape_and_range() {
    let input = preprocess(&gradient_frame()).unwrap();
    assert_eq!(input.shape, INPUT_SHAPE.to_vec());
    assert_eq!(input.shape, vec![66, 200, 3]);
    assert!(input.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn test_preprocess_is_deterministic() {
    let frame = gradient_frame();
    let first = preprocess(&frame).unwrap();
    let second = preprocess(&frame).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_preprocess_only_sees_crop_window() {
    // white everywhere except a black band over rows 60..135
    let (height, width) = (160, 320);
    let mut data = vec![255u8; height * width * 3];
    for y in 60..135 {
        let start = y * width * 3;
        data[start..start + width * 3].fill(0);
    }
    let frame = Tensor::new(vec![height, width, 3], data).unwrap();

    let input = preprocess(&frame).unwrap();
    let chroma = 128.0 / 255.0;
    for px in input.data.chunks_exact(3) {
        assert_eq!(px[0], 0.0);
        assert!((px[1] - chroma).abs() < 1e-6);
        assert!((px[2] - chroma).abs() < 1e-6);
    }
}

#[test]
fn test_preprocess_minimum_height() {
    let frame = Tensor::zeros(vec![135, 10, 3]).unwrap();
    assert!(preprocess(&frame).is_ok());
}

#[test]
fn test_preprocess_rejects_short_frame() {
    let frame = Tensor::zeros(vec![100, 320, 3]).unwrap();
    match preprocess(&frame) {
        Err(InferError::ShapeMismatch { .. }) => {}
        other => panic!("Expected ShapeMismatch, got {:?}", other),
    }
}

#[test]
fn test_preprocess_rejects_wrong_channels() {
    let frame = Tensor::zeros(vec![160, 320, 4]).unwrap();
    assert!(matches!(
        preprocess(&frame),
        Err(InferError::ShapeMismatch { .. })
    ));

    let flat = Tensor::zeros(vec![160 * 320 * 3]).unwrap();
    assert!(matches!(
        preprocess(&flat),
        Err(InferError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_crop_rows() {
    let data: Vec<u8> = (0..4 * 2 * 3).map(|v| v as u8).collect();
    let frame = Tensor::new(vec![4, 2, 3], data).unwrap();

    let cropped = crop_rows(&frame, 1, 3).unwrap();
    assert_eq!(cropped.shape, vec![2, 2, 3]);
    assert_eq!(cropped.data, (6..18).map(|v| v as u8).collect::<Vec<_>>());

    assert!(crop_rows(&frame, 3, 5).is_err());
}

#[test]
fn test_rgb_to_yuv_reference_colours() {
    let frame = Tensor::new(vec![1, 3, 3], vec![255, 255, 255, 0, 0, 0, 255, 0, 0]).unwrap();
    let yuv = rgb_to_yuv(&frame);
    assert_eq!(&yuv.data[0..3], &[255, 128, 128]);
    assert_eq!(&yuv.data[3..6], &[0, 128, 128]);
    // saturated red pushes V past 255
    assert_eq!(&yuv.data[6..9], &[76, 90, 255]);
}

#[test]
fn test_blur_keeps_uniform_image() {
    let frame = Tensor::new(vec![5, 7, 3], vec![77u8; 5 * 7 * 3]).unwrap();
    assert_eq!(gaussian_blur_3x3(&frame), frame);
}

#[test]
fn test_blur_spreads_single_pixel() {
    let mut data = vec![0u8; 25];
    data[2 * 5 + 2] = 160;
    let frame = Tensor::new(vec![5, 5, 1], data).unwrap();

    let blurred = gaussian_blur_3x3(&frame);
    let at = |y: usize, x: usize| blurred.data[y * 5 + x];
    assert_eq!(at(2, 2), 40);
    assert_eq!(at(2, 1), 20);
    assert_eq!(at(1, 2), 20);
    assert_eq!(at(1, 1), 10);
    assert_eq!(at(0, 0), 0);
    assert_eq!(blurred.data.iter().map(|&v| v as u32).sum::<u32>(), 160);
}

#[test]
fn test_resize_same_size_is_identity() {
    let data: Vec<u8> = (0..3 * 4 * 3).map(|v| (v * 7) as u8).collect();
    let frame = Tensor::new(vec![3, 4, 3], data).unwrap();
    assert_eq!(resize_bilinear(&frame, 4, 3).unwrap(), frame);
}

#[test]
fn test_resize_halves_by_averaging() {
    let frame = Tensor::new(vec![1, 4, 1], vec![0, 100, 200, 250]).unwrap();
    let resized = resize_bilinear(&frame, 2, 1).unwrap();
    assert_eq!(resized.shape, vec![1, 2, 1]);
    assert_eq!(resized.data, vec![50, 225]);
}
