#![allow(dead_code)]

use drive_base::Tensor;
use drive_com::{ComError, Emitter};
use drive_infer::{InferError, SteeringPredictor};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Emitter that keeps everything it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingEmitter {
    pub sent: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingEmitter {
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Emitter for RecordingEmitter {
    async fn emit(&self, event: &str, data: Value) -> Result<(), ComError> {
        self.sent.lock().unwrap().push((event.to_string(), data));
        Ok(())
    }
}

/// Predictor that always answers with the same angle.
pub struct FixedPredictor {
    pub angle: f32,
    pub seen_shapes: Vec<Vec<usize>>,
}

impl FixedPredictor {
    pub fn new(angle: f32) -> Self {
        Self {
            angle,
            seen_shapes: Vec::new(),
        }
    }
}

impl SteeringPredictor for FixedPredictor {
    fn predict(&mut self, batch: &Tensor<f32>) -> Result<Vec<f32>, InferError> {
        self.seen_shapes.push(batch.shape.clone());
        Ok(vec![self.angle; batch.shape[0]])
    }
}

/// Base64 JPEG of a simulator-sized (320x160) camera frame.
pub fn camera_frame_base64() -> String {
    frame_base64(320, 160)
}

pub fn frame_base64(width: usize, height: usize) -> String {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 96]);
        }
    }
    let frame = Tensor::new(vec![height, width, 3], data).unwrap();
    drive_image::encode_base64(&drive_image::encode_jpeg(&frame, 90).unwrap())
}
