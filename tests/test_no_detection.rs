use image::{Rgb, RgbImage};
use enviroscan::common::ModelConfig;
use enviroscan::detection_runners::Detector;

#[test]
fn no_detections() {
    let Ok(weights_path) = std::env::var("ENVIROSCAN_TEST_MODEL") else {
        eprintln!("ENVIROSCAN_TEST_MODEL not set, skipping");
        return;
    };
    let mut model_details = ModelConfig::new(weights_path);
    model_details.ort_lib_path = std::env::var("ENVIROSCAN_TEST_ORT_LIB").ok();
    model_details.labels_path = std::env::var("ENVIROSCAN_TEST_LABELS").ok();

    let yolo = enviroscan::init_detector(&model_details).unwrap();

    // a flat grey frame has nothing to find
    let blank = RgbImage::from_pixel(960, 540, Rgb([114, 114, 114]));
    for _ in 0..3 {
        let result = yolo.detect(&blank).unwrap();
        assert_eq!(result.len(), 0);
    }
}
