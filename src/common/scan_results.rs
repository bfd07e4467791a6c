use serde::{Deserialize, Serialize};

/// One detection as reported to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f32,
    /// Boxes as `[x1, y1, x2, y2]`; the model yields one per detection.
    pub coordinates: Vec<[f32; 4]>,
    pub advice: String,
}

/// Result for one successfully processed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    #[serde(rename = "image")]
    pub image_path: String,
    pub detections: Vec<Detection>,
}

/// Response body of the analyze endpoint. Failed uploads are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<ImageResult>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
