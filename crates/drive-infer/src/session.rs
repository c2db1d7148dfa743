use crate::InferError;
use drive_base::Tensor;
use std::collections::HashMap;

/// A loaded model ready to run.
///
/// Inputs are borrowed so a batch reaches the runtime without copies.
pub trait Session: Send {
    fn run(
        &mut self,
        inputs: &[(&str, &Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError>;
    fn input_names(&self) -> &[String];
    fn output_names(&self) -> &[String];
}
