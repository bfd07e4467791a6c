//! Options for building the ONNX Runtime detector.
//! Builder layout adapted from https://github.com/jamjamjon/usls

use anyhow::Result;
use crate::common::{InferenceDevice, ModelVersion};

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: String,
    pub ort_lib_path: Option<String>,
    pub device: InferenceDevice,
    pub model_width: u32,
    pub model_height: u32,

    pub nc: Option<usize>,
    pub conf: f32,
    pub iou: f32,
    pub names: Option<Vec<String>>,
    pub yolo_version: ModelVersion,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: String::new(),
            ort_lib_path: None,
            device: InferenceDevice::CPU,
            model_height: 640,
            model_width: 640,

            nc: None,
            conf: 0.25,
            iou: 0.7,
            names: None,
            yolo_version: ModelVersion::YoloV8,
        }
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model(mut self, onnx_path: &str) -> Result<Self> {
        if !std::path::Path::new(onnx_path).is_file() {
            anyhow::bail!("Model file not found at {}", onnx_path);
        }
        self.onnx_path = onnx_path.to_string();
        Ok(self)
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: Option<&str>) -> Self {
        self.ort_lib_path = ort_lib_path.map(str::to_string);
        self
    }

    pub fn with_model_width(mut self, n: u32) -> Self {
        self.model_width = n;
        self
    }

    pub fn with_model_height(mut self, n: u32) -> Self {
        self.model_height = n;
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_yolo_version(mut self, x: ModelVersion) -> Self {
        self.yolo_version = x;
        self
    }

    pub fn with_names(mut self, names: Option<Vec<String>>) -> Self {
        self.names = names;
        self
    }

    pub fn with_nc(mut self, nc: Option<usize>) -> Self {
        self.nc = nc;
        self
    }

    pub fn with_conf(mut self, x: f32) -> Self {
        self.conf = x;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou = x;
        self
    }
}
