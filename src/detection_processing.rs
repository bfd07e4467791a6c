use std::sync::Arc;
use std::time::Instant;
use image::RgbImage;
use crate::common::{resolve_advice, Detection};
use crate::detection_runners::Detector;
use crate::error::ScanError;
use crate::visualizer::{Annotation, Visualizer};

/// Name reported for class ids the model does not map.
pub const UNKNOWN_CLASS: &str = "Unknown";

/// One decoded image in, named detections with advice and the annotated image out.
pub struct DetectionPipeline {
    detector: Arc<dyn Detector>,
    visualizer: Visualizer,
}

impl DetectionPipeline {
    pub fn new(detector: Arc<dyn Detector>, visualizer: Visualizer) -> Self {
        Self { detector, visualizer }
    }

    /// Runs the model once on `image`. Detections keep model order; with none the
    /// annotated image is an unchanged copy of the input.
    pub fn process(&self, image: &RgbImage) -> Result<(Vec<Detection>, RgbImage), ScanError> {
        let now = Instant::now();
        let raw = self.detector.detect(image).map_err(ScanError::Inference)?;
        log::debug!("Inference produced {} detections in {:.2?}", raw.len(), now.elapsed());

        if raw.is_empty() {
            return Ok((Vec::new(), image.clone()));
        }

        let mut detections = Vec::with_capacity(raw.len());
        let mut annotations = Vec::with_capacity(raw.len());
        for det in raw.iter() {
            let class_name = self.detector.class_name(det.class_id).unwrap_or(UNKNOWN_CLASS);
            detections.push(Detection {
                class_name: class_name.to_string(),
                confidence: det.confidence,
                coordinates: vec![det.bbox.xyxy()],
                advice: resolve_advice(class_name).to_string(),
            });
            annotations.push(Annotation {
                class_id: det.class_id,
                bbox: det.bbox,
                label: class_name,
                confidence: det.confidence,
            });
        }

        let annotated = self.visualizer.annotate(image, &annotations);
        Ok((detections, annotated))
    }
}
