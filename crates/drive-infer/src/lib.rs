pub mod backend;
pub mod backends;
pub mod device;
pub mod error;
pub mod inference;
pub mod modelsource;
pub mod session;
pub mod steering;

pub use backend::Backend;
pub use device::Device;
pub use error::InferError;
pub use inference::Inference;
pub use modelsource::ModelSource;
pub use session::Session;
pub use steering::{SteeringModel, SteeringPredictor, preprocess};
