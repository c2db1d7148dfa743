use crate::{Backend, Device, InferError, ModelSource, Session};
use drive_base::Tensor;
use ort::{inputs, session::Session as OrtSession, value::TensorRef};
use std::collections::HashMap;
use std::sync::OnceLock;

static ORT_INIT: OnceLock<()> = OnceLock::new();

fn ensure_ort_init() {
    ORT_INIT.get_or_init(|| {
        let _ = ort::init().with_name("drive").commit();
    });
}

pub struct OnnxBackend {
    device: Device,
}

impl OnnxBackend {
    pub fn new(device: Device) -> Self {
        ensure_ort_init();
        Self { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl Backend for OnnxBackend {
    fn name(&self) -> &str {
        "onnx"
    }

    fn load_model(&self, model: ModelSource) -> Result<Box<dyn Session>, InferError> {
        let device = &self.device;
        let mut builder = OrtSession::builder().map_err(|e| {
            InferError::BackendError(format!("failed to create session builder: {}", e))
        })?;

        builder = match device {
            Device::Cpu => {
                log::info!("onnx: using CPU execution provider");
                builder
            }
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
                let ep = CUDAExecutionProvider::default().with_device_id(*device_id);
                let available = ep.is_available().unwrap_or(false);
                log::info!(
                    "onnx: CUDA execution provider requested (device_id={}), available: {}",
                    device_id,
                    available
                );
                builder
                    .with_execution_providers([ep.build()])
                    .map_err(|_| InferError::UnsupportedDevice(device.clone()))?
            }
            #[cfg(not(feature = "cuda"))]
            Device::Cuda { .. } => {
                return Err(InferError::UnsupportedDevice(device.clone()));
            }
        };

        let session = match model {
            ModelSource::File(path) => builder.commit_from_file(&path).map_err(|e| {
                InferError::ModelLoad(format!("failed to load model from {:?}: {}", path, e))
            })?,
            ModelSource::Memory(bytes) => builder.commit_from_memory(&bytes).map_err(|e| {
                InferError::ModelLoad(format!("failed to load model from memory: {}", e))
            })?,
        };

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();
        log::debug!(
            "onnx: model inputs {:?}, outputs {:?}",
            input_names,
            output_names
        );

        Ok(Box::new(OnnxSession {
            session,
            input_names,
            output_names,
        }))
    }
}

pub struct OnnxSession {
    session: OrtSession,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl Session for OnnxSession {
    fn run(
        &mut self,
        inputs: &[(&str, &Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError> {
        // steering models take a single image batch
        let [(name, tensor)] = inputs else {
            return Err(InferError::BackendError(format!(
                "expected exactly one input, got {}",
                inputs.len()
            )));
        };
        if !self.input_names.iter().any(|n| n == name) {
            return Err(InferError::InvalidInput {
                name: name.to_string(),
                expected_names: self.input_names.clone(),
            });
        }

        let value = to_ort_view(tensor)?;
        let outputs = self
            .session
            .run(inputs![*name => value])
            .map_err(|e| InferError::BackendError(format!("inference failed: {}", e)))?;

        let mut result = HashMap::new();
        for output_name in &self.output_names {
            let (shape, data) = outputs[output_name.as_str()]
                .try_extract_tensor::<f32>()
                .map_err(|e| {
                    InferError::UnsupportedDtype(format!(
                        "output '{}' is not f32: {}",
                        output_name, e
                    ))
                })?;
            let shape = shape.iter().map(|&d| d.max(0) as usize).collect();
            result.insert(output_name.clone(), Tensor::new(shape, data.to_vec())?);
        }

        Ok(result)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

/// Borrows a `Tensor<f32>` as an ort tensor view with the same shape.
pub fn to_ort_view(tensor: &Tensor<f32>) -> Result<TensorRef<'_, f32>, InferError> {
    let shape: Vec<i64> = tensor.shape.iter().map(|&d| d as i64).collect();
    TensorRef::from_array_view((shape, tensor.data.as_slice()))
        .map_err(|e| InferError::BackendError(format!("failed to create tensor ref: {}", e)))
}
