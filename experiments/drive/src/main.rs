use drive_base::log;
use drive_com::{RealtimeChannel, SioServer};
use drive_infer::Inference;
use drive_pilot::{Autopilot, DriveConfig, dispatch};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    drive_base::init_stdout_logger();

    // Model path from args or use default
    let mut config = DriveConfig::default();
    if let Some(model_path) = std::env::args().nth(1) {
        config = config.with_model_path(model_path);
    }
    #[cfg(feature = "cuda")]
    {
        config = config.with_device(drive_infer::Device::Cuda { device_id: 0 });
    }

    log::info!("Drive - simulator steering bridge");

    // Load the model once, before accepting the simulator
    let inference = Inference::new(config.device().clone());
    let model = inference.use_steering_model(config.model_path())?;
    log::info!("Steering model loaded, input '{}'", model.input_name());

    let mut server = SioServer::bind(config.addr()).await?;
    log::info!("Listening on {}", server.local_addr());

    let mut autopilot =
        Autopilot::new(model, server.emitter()).with_speed_limit(config.speed_limit());
    dispatch::run(&mut server, &mut autopilot).await?;

    Ok(())
}
