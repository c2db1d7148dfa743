use drive_base::Tensor;
use drive_infer::{InferError, Session, SteeringModel, SteeringPredictor, preprocess};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Session that answers every item in the batch with the same angle.
struct FixedSession {
    inputs: Vec<String>,
    outputs: Vec<String>,
    angle: f32,
    per_item: usize,
}

impl FixedSession {
    fn boxed(angle: f32) -> Box<dyn Session> {
        Box::new(Self {
            inputs: vec!["input_1".to_string()],
            outputs: vec!["steering".to_string()],
            angle,
            per_item: 1,
        })
    }
}

impl Session for FixedSession {
    fn run(
        &mut self,
        inputs: &[(&str, &Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError> {
        let (name, batch) = &inputs[0];
        assert_eq!(*name, "input_1");
        let count = batch.shape[0] * self.per_item;
        let out = Tensor::new(vec![count, 1], vec![self.angle; count])?;
        Ok(HashMap::from([(self.outputs[0].clone(), out)]))
    }

    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }
}

#[test]
fn test_predict_single_frame() {
    let frame = Tensor::zeros(vec![160, 320, 3]).unwrap();
    let batch = preprocess(&frame).unwrap().into_batch();
    assert_eq!(batch.shape, vec![1, 66, 200, 3]);

    let mut model = SteeringModel::from_session(FixedSession::boxed(-0.12)).unwrap();
    assert_eq!(model.input_name(), "input_1");
    assert_eq!(model.predict(&batch).unwrap(), vec![-0.12]);
}

#[test]
fn test_predict_batch_returns_one_angle_per_item() {
    let batch = Tensor::zeros(vec![3, 66, 200, 3]).unwrap();
    let mut model = SteeringModel::from_session(FixedSession::boxed(0.5)).unwrap();
    assert_eq!(model.predict(&batch).unwrap(), vec![0.5, 0.5, 0.5]);
}

#[test]
fn test_predict_rejects_unbatched_input() {
    let input = Tensor::zeros(vec![66, 200, 3]).unwrap();
    let mut model = SteeringModel::from_session(FixedSession::boxed(0.0)).unwrap();
    assert!(matches!(
        model.predict(&input),
        Err(InferError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_predict_rejects_wrong_output_count() {
    let session = Box::new(FixedSession {
        inputs: vec!["input_1".to_string()],
        outputs: vec!["steering".to_string()],
        angle: 0.0,
        per_item: 2,
    });
    let mut model = SteeringModel::from_session(session).unwrap();
    let batch = Tensor::zeros(vec![1, 66, 200, 3]).unwrap();
    assert!(matches!(
        model.predict(&batch),
        Err(InferError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_model_without_inputs_is_rejected() {
    let session = Box::new(FixedSession {
        inputs: vec![],
        outputs: vec!["steering".to_string()],
        angle: 0.0,
        per_item: 1,
    });
    assert!(matches!(
        SteeringModel::from_session(session),
        Err(InferError::BackendError(_))
    ));
}

#[test]
fn test_boxed_predictor() {
    let mut predictor: Box<dyn SteeringPredictor> =
        Box::new(SteeringModel::from_session(FixedSession::boxed(0.3)).unwrap());
    let batch = Tensor::zeros(vec![1, 66, 200, 3]).unwrap();
    assert_eq!(predictor.predict(&batch).unwrap(), vec![0.3]);
}

/// Session that remembers where the input data it was handed lives.
struct AddressSession {
    inputs: Vec<String>,
    outputs: Vec<String>,
    seen: Arc<Mutex<Option<usize>>>,
}

impl Session for AddressSession {
    fn run(
        &mut self,
        inputs: &[(&str, &Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError> {
        let (_, batch) = &inputs[0];
        *self.seen.lock().unwrap() = Some(batch.data.as_ptr() as usize);
        let out = Tensor::new(vec![1], vec![0.0])?;
        Ok(HashMap::from([(self.outputs[0].clone(), out)]))
    }

    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }
}

#[test]
fn test_predict_passes_batch_without_copy() {
    let seen = Arc::new(Mutex::new(None));
    let session = Box::new(AddressSession {
        inputs: vec!["input_1".to_string()],
        outputs: vec!["steering".to_string()],
        seen: seen.clone(),
    });
    let mut model = SteeringModel::from_session(session).unwrap();
    let batch = Tensor::zeros(vec![1, 66, 200, 3]).unwrap();

    model.predict(&batch).unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(batch.data.as_ptr() as usize));
}
