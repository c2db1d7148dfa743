use drive_infer::Device;
use std::path::{Path, PathBuf};

pub const DEFAULT_ADDR: &str = "0.0.0.0:4567";
pub const DEFAULT_MODEL_PATH: &str = "model.onnx";
pub const DEFAULT_SPEED_LIMIT: f32 = 10.0;

/// Configuration for the simulator bridge.
#[derive(Clone, Debug)]
pub struct DriveConfig {
    addr: String,
    model_path: PathBuf,
    speed_limit: f32,
    device: Device,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            speed_limit: DEFAULT_SPEED_LIMIT,
            device: Device::Cpu,
        }
    }
}

impl DriveConfig {
    /// Set the listen address (e.g., "0.0.0.0:4567").
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Set the path of the ONNX steering model.
    pub fn with_model_path(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.model_path = model_path.into();
        self
    }

    /// Set the speed at which throttle reaches zero.
    pub fn with_speed_limit(mut self, speed_limit: f32) -> Self {
        self.speed_limit = speed_limit;
        self
    }

    /// Set the inference device.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    // Getters
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn speed_limit(&self) -> f32 {
        self.speed_limit
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}
