use crate::common::inference_device::InferenceDevice;
use crate::common::model_version::ModelVersion;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub weights_path: String,
    pub ort_lib_path: Option<String>,
    pub labels_path: Option<String>,
    pub inference_device: InferenceDevice,
    pub model_version: ModelVersion,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub width: u32,
    pub height: u32,
    pub num_classes: Option<usize>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: String::new(),
            ort_lib_path: None,
            labels_path: None,
            inference_device: InferenceDevice::CPU,
            model_version: ModelVersion::YoloV8,
            conf_threshold: 0.25,
            iou_threshold: 0.7,
            width: 640,
            height: 640,
            num_classes: None,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: impl Into<String>) -> Self {
        Self {
            weights_path: weights_path.into(),
            ..Default::default()
        }
    }

    pub fn get_threshold(&self) -> f32 {
        self.conf_threshold
    }

    pub fn summary(&self) -> String {
        format!("Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Version: {}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {} | IoU Threshold: {}",
                self.weights_path,
                self.labels_path.as_deref().unwrap_or("<model metadata>"),
                self.ort_lib_path.as_deref().unwrap_or("<system default>"),
                self.inference_device, self.model_version.name(),
                self.width, self.height, self.conf_threshold, self.iou_threshold)
    }
}
