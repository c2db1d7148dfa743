/// First camera row kept by the crop (everything above is sky).
pub const CROP_TOP: usize = 60;

/// One past the last camera row kept by the crop (everything below is hood).
pub const CROP_BOTTOM: usize = 135;

/// Model input width in pixels.
pub const INPUT_WIDTH: usize = 200;

/// Model input height in pixels.
pub const INPUT_HEIGHT: usize = 66;

/// Model input channels (Y, U, V).
pub const INPUT_CHANNELS: usize = 3;

/// Shape of one preprocessed frame, HWC.
pub const INPUT_SHAPE: [usize; 3] = [INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS];
