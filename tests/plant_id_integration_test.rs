use base64::{engine::general_purpose::STANDARD, Engine as _};
use ecopot::classifier::PlantIdClient;
use ecopot::config::{Config, API_KEY_ENV};
use ecopot::pipeline::{IdentificationPipeline, IdentificationState};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

fn green_square_png() -> String {
    let img = RgbImage::from_pixel(64, 64, Rgb([34, 139, 34]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png encode failed");
    STANDARD.encode(bytes)
}

#[tokio::test]
async fn plant_id_identify_integration() {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => {}
        _ => {
            eprintln!("{} not set; skipping integration test", API_KEY_ENV);
            return;
        }
    }

    let client = PlantIdClient::new(&Config::default())
        .expect("client init failed")
        .with_mime("image/png");
    let pipeline = IdentificationPipeline::new(Arc::new(client));

    let state = pipeline
        .identify(green_square_png())
        .await
        .expect("pipeline busy");

    assert!(state.is_terminal(), "unexpected state: {:?}", state);
    if let IdentificationState::Success(found) = state {
        assert!(!found.records.is_empty());
        assert!((0.0..=1.0).contains(&found.confidence));
    }
}
