mod utils;
pub mod batch_handler;
pub mod cli;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod error;
pub mod output;
pub mod server;
pub mod visualizer;

use std::time::Instant;
use anyhow::Context;
use image::RgbImage;
use crate::common::ModelConfig;
use crate::data::ConfigOrt;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYOLO;

pub use crate::error::ScanError;

pub type Result<T, E = ScanError> = std::result::Result<T, E>;

/// Builds the ONNX detector described by `model_details` and warms it up.
pub fn init_detector(model_details: &ModelConfig) -> anyhow::Result<OrtYOLO> {
    let now = Instant::now();

    let names = match &model_details.labels_path {
        None => None,
        Some(path) => Some(
            utils::file_to_vec(path).with_context(|| format!("Failed to read labels file {}", path))?,
        ),
    };

    let ort_options = ConfigOrt::new()
        .with_model(&model_details.weights_path)?
        .with_ort_lib_path(model_details.ort_lib_path.as_deref())
        .with_yolo_version(model_details.model_version)
        .with_device(model_details.inference_device)
        .with_model_width(model_details.width)
        .with_model_height(model_details.height)
        .with_names(names)
        .with_nc(model_details.num_classes)
        .with_conf(model_details.get_threshold())
        .with_iou(model_details.iou_threshold);

    log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
    let yolo = OrtYOLO::new(ort_options)?;

    // warm-up
    yolo.run(&[RgbImage::new(yolo.width(), yolo.height())])?;

    log::info!("Detector ready in {:.2?}", now.elapsed());
    Ok(yolo)
}
