mod predictor;
mod preprocess;
mod types;

pub use predictor::{SteeringModel, SteeringPredictor};
pub use preprocess::{crop_rows, gaussian_blur_3x3, normalize, preprocess, resize_bilinear, rgb_to_yuv};
pub use types::{CROP_BOTTOM, CROP_TOP, INPUT_CHANNELS, INPUT_HEIGHT, INPUT_SHAPE, INPUT_WIDTH};
