use drive_base::{Tensor, log};
use drive_com::SioClient;
use serde_json::json;
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:4567";
const SPEEDS: [f32; 4] = [0.0, 5.0, 10.0, 20.0];

/// Synthetic 320x160 road-ish frame: sky on top, grey road below.
fn synthetic_frame() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let (width, height) = (320, 160);
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let pixel = if y < 60 {
                [110, 160, 230]
            } else {
                let shade = 90 + (x * 40 / width) as u8;
                [shade, shade, shade]
            };
            data.extend_from_slice(&pixel);
        }
    }
    let frame = Tensor::new(vec![height, width, 3], data)?;
    Ok(drive_image::encode_jpeg(&frame, 90)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    drive_base::init_stdout_logger();

    // Parse address and optional image path from args
    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let image = match args.next() {
        Some(path) => {
            log::info!("Using image {}", path);
            std::fs::read(path)?
        }
        None => {
            log::info!("Using synthetic frame");
            synthetic_frame()?
        }
    };
    let image = drive_image::encode_base64(&image);

    log::info!("Probe - stand-in simulator");
    log::info!("Connecting to: {}", addr);
    let mut client = SioClient::connect(addr.parse()?).await?;
    log::info!("Connected, sid {}", client.sid());

    let (event, data) = tokio::time::timeout(Duration::from_secs(5), client.recv()).await??;
    log::info!("On connect: {} {}", event, data);

    for speed in SPEEDS {
        let telemetry = json!({
            "steering_angle": "0",
            "throttle": "0",
            "speed": speed.to_string(),
            "image": image,
        });
        client.emit("telemetry", telemetry).await?;

        match tokio::time::timeout(Duration::from_secs(5), client.recv()).await {
            Ok(Ok((event, data))) => log::info!("speed {}: {} {}", speed, event, data),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => log::warn!("speed {}: no reply", speed),
        }
    }

    client.close().await?;
    Ok(())
}
