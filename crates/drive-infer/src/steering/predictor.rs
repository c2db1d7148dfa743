use crate::{Backend, InferError, ModelSource, Session};
use drive_base::Tensor;

use super::types::INPUT_SHAPE;

/// Anything that maps a batch of preprocessed frames to steering angles.
///
/// Input is `[N, 66, 200, 3]`, output is one angle per batch item.
pub trait SteeringPredictor {
    fn predict(&mut self, batch: &Tensor<f32>) -> Result<Vec<f32>, InferError>;
}

impl<P: SteeringPredictor + ?Sized> SteeringPredictor for Box<P> {
    fn predict(&mut self, batch: &Tensor<f32>) -> Result<Vec<f32>, InferError> {
        (**self).predict(batch)
    }
}

/// Pretrained image-to-steering regression model.
///
/// The model is a black box: a single image-batch input and a single output
/// holding one scalar per batch item (shape `[N]` or `[N, 1]`).
pub struct SteeringModel {
    session: Box<dyn Session>,
    input_name: String,
}

impl SteeringModel {
    pub fn new(model: ModelSource, backend: &dyn Backend) -> Result<Self, InferError> {
        let session = backend.load_model(model)?;
        Self::from_session(session)
    }

    pub fn from_session(session: Box<dyn Session>) -> Result<Self, InferError> {
        let input_name = session
            .input_names()
            .first()
            .ok_or_else(|| InferError::BackendError("model has no inputs".to_string()))?
            .clone();
        if session.output_names().is_empty() {
            return Err(InferError::BackendError("model has no outputs".to_string()));
        }
        Ok(Self {
            session,
            input_name,
        })
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }
}

impl SteeringPredictor for SteeringModel {
    fn predict(&mut self, batch: &Tensor<f32>) -> Result<Vec<f32>, InferError> {
        if batch.ndim() != 4 || batch.shape[1..] != INPUT_SHAPE {
            return Err(InferError::ShapeMismatch {
                expected: format!("[N, {}, {}, {}]", INPUT_SHAPE[0], INPUT_SHAPE[1], INPUT_SHAPE[2]),
                got: format!("{:?}", batch.shape),
            });
        }
        let count = batch.shape[0];

        let mut outputs = self
            .session
            .run(&[(self.input_name.as_str(), batch)])?;

        let first = &self.session.output_names()[0];
        let angles = outputs
            .remove(first)
            .ok_or_else(|| InferError::BackendError(format!("output '{}' missing", first)))?;
        if angles.len() != count {
            return Err(InferError::ShapeMismatch {
                expected: format!("{} steering values", count),
                got: format!("{:?}", angles.shape),
            });
        }

        Ok(angles.data)
    }
}
