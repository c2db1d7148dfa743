use drive_com::ComError;
use drive_image::ImageError;
use drive_infer::InferError;
use std::fmt;

#[derive(Debug)]
pub enum PilotError {
    /// A required telemetry key is absent.
    MissingField(&'static str),
    Payload(String),
    Speed(String),
    Image(ImageError),
    Infer(InferError),
    Com(ComError),
}

impl fmt::Display for PilotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PilotError::MissingField(field) => write!(f, "telemetry is missing '{field}'"),
            PilotError::Payload(msg) => write!(f, "invalid telemetry payload: {msg}"),
            PilotError::Speed(value) => write!(f, "invalid speed: {value}"),
            PilotError::Image(err) => write!(f, "image error: {err}"),
            PilotError::Infer(err) => write!(f, "inference error: {err}"),
            PilotError::Com(err) => write!(f, "transport error: {err}"),
        }
    }
}

impl std::error::Error for PilotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PilotError::Image(err) => Some(err),
            PilotError::Infer(err) => Some(err),
            PilotError::Com(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ImageError> for PilotError {
    fn from(err: ImageError) -> Self {
        PilotError::Image(err)
    }
}

impl From<InferError> for PilotError {
    fn from(err: InferError) -> Self {
        PilotError::Infer(err)
    }
}

impl From<ComError> for PilotError {
    fn from(err: ComError) -> Self {
        PilotError::Com(err)
    }
}
