use crate::{Device, InferError, ModelSource, SteeringModel, backends::OnnxBackend};
use std::path::Path;

/// Entry point for loading models onto a device.
pub struct Inference {
    backend: OnnxBackend,
}

impl Inference {
    pub fn new(device: Device) -> Self {
        log::info!("Inference device: {}", device);
        Self {
            backend: OnnxBackend::new(device),
        }
    }

    pub fn cpu() -> Self {
        Self::new(Device::Cpu)
    }

    #[cfg(feature = "cuda")]
    pub fn cuda(device_id: i32) -> Self {
        Self::new(Device::Cuda { device_id })
    }

    pub fn device(&self) -> &Device {
        self.backend.device()
    }

    /// Load the steering model from an ONNX file.
    pub fn use_steering_model(&self, model_path: impl AsRef<Path>) -> Result<SteeringModel, InferError> {
        let path = model_path.as_ref();
        log::info!("loading steering model from {}", path.display());
        SteeringModel::new(ModelSource::from(path), &self.backend)
    }
}
