use serde::{Deserialize, Serialize};
use crate::common::ScanBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// One raw model detection, before class names and advice are attached.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ScanDetection {
    pub class_id: usize,
    pub bbox: ScanBox,
    pub confidence: f32,
}

impl Nms for ScanDetection {
    /// Computes the intersection over union (IoU) between this bounding box and another.
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.intersect(&other.bbox) / self.bbox.union(&other.bbox)
    }

    /// Returns the confidence score of the bounding box.
    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn class_id(&self) -> usize {
        self.class_id
    }
}

impl ScanDetection {
    pub fn new(class_id: usize, bbox: ScanBox, confidence: f32) -> Self {
        Self {
            class_id,
            bbox,
            confidence,
        }
    }
}
