#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use image::{ImageFormat, Rgb, RgbImage};
use enviroscan::batch_handler::{BatchRequestHandler, UploadedFile};
use enviroscan::common::{ScanBox, ScanDetection};
use enviroscan::detection_processing::DetectionPipeline;
use enviroscan::detection_runners::Detector;
use enviroscan::output::OutputWriter;
use enviroscan::visualizer::Visualizer;

pub const NAMES: [&str; 3] = ["Can", "Battery", "Bottle"];

/// Returns the same detections for every image.
pub struct StubDetector {
    pub detections: Vec<ScanDetection>,
}

impl StubDetector {
    pub fn empty() -> Self {
        Self { detections: Vec::new() }
    }

    pub fn with(detections: Vec<ScanDetection>) -> Self {
        Self { detections }
    }
}

impl Detector for StubDetector {
    fn detect(&self, _image: &RgbImage) -> anyhow::Result<Vec<ScanDetection>> {
        Ok(self.detections.clone())
    }

    fn class_name(&self, class_id: usize) -> Option<&str> {
        NAMES.get(class_id).copied()
    }
}

/// Fails on every image.
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&self, _image: &RgbImage) -> anyhow::Result<Vec<ScanDetection>> {
        anyhow::bail!("session run failed")
    }

    fn class_name(&self, _class_id: usize) -> Option<&str> {
        None
    }
}

pub fn detection(class_id: usize, confidence: f32) -> ScanDetection {
    ScanDetection::new(class_id, ScanBox::new(4., 4., 28., 20.), confidence)
}

pub fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 5) as u8, 90]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Png)
}

pub fn upload(filename: &str, bytes: Vec<u8>) -> UploadedFile {
    UploadedFile::new(filename, bytes)
}

pub fn handler(detector: impl Detector + 'static, output_dir: &std::path::Path) -> BatchRequestHandler {
    let detector: Arc<dyn Detector> = Arc::new(detector);
    BatchRequestHandler::new(
        DetectionPipeline::new(detector, Visualizer::default()),
        OutputWriter::new(output_dir, "/output"),
    )
}
