use std::net::SocketAddr;
use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use crate::common::{InferenceDevice, ModelConfig, ModelVersion};
use crate::data::ServerConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "enviroscan")]
#[command(about = "Litter detection service with disposal advice")]
pub struct Args {
    /// ONNX weights of the detector
    #[arg(long, env = "ENVIROSCAN_MODEL")]
    pub model: String,

    /// Class names, one per line (defaults to the model metadata)
    #[arg(long, env = "ENVIROSCAN_LABELS")]
    pub labels: Option<String>,

    /// Path to the onnxruntime shared library
    #[arg(long, env = "ENVIROSCAN_ORT_LIB")]
    pub ort_lib: Option<String>,

    /// Execution provider
    #[arg(long, env = "ENVIROSCAN_DEVICE", default_value = "cpu",
          value_parser = clap::builder::PossibleValuesParser::new(InferenceDevice::all_inference_devices()))]
    pub device: String,

    #[arg(long, env = "ENVIROSCAN_DEVICE_ID", default_value_t = 0)]
    pub device_id: usize,

    /// Output layout of the exported model (yolov5 .. yolov11)
    #[arg(long, env = "ENVIROSCAN_MODEL_VERSION", default_value = "yolov8")]
    pub model_version: String,

    #[arg(long, env = "ENVIROSCAN_CONF", default_value_t = 0.25)]
    pub conf: f32,

    #[arg(long, env = "ENVIROSCAN_IOU", default_value_t = 0.7)]
    pub iou: f32,

    /// Model input width, used when the model has dynamic input dims
    #[arg(long, env = "ENVIROSCAN_WIDTH", default_value_t = 640)]
    pub width: u32,

    #[arg(long, env = "ENVIROSCAN_HEIGHT", default_value_t = 640)]
    pub height: u32,

    /// Class count when neither a label file nor model metadata names the classes
    #[arg(long, env = "ENVIROSCAN_NUM_CLASSES")]
    pub num_classes: Option<usize>,

    #[arg(long, env = "ENVIROSCAN_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// URL prefix the output directory is served under
    #[arg(long, env = "ENVIROSCAN_MOUNT", default_value = "/output")]
    pub mount: String,

    #[arg(long, env = "ENVIROSCAN_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// TrueType font for label text
    #[arg(long, env = "ENVIROSCAN_LABEL_FONT")]
    pub label_font: Option<PathBuf>,

    #[arg(long, env = "ENVIROSCAN_MAX_UPLOAD_MB", default_value_t = 64)]
    pub max_upload_mb: usize,
}

impl Args {
    pub fn model_config(&self) -> Result<ModelConfig> {
        let inference_device = InferenceDevice::from_str(&self.device, self.device_id)
            .ok_or_else(|| anyhow::anyhow!("Unknown device {}", self.device))?;
        let model_version = ModelVersion::from_name(&self.model_version)
            .ok_or_else(|| anyhow::anyhow!("Unknown model version {}", self.model_version))?;
        if !(0.0..=1.0).contains(&self.conf) || !(0.0..=1.0).contains(&self.iou) {
            anyhow::bail!("Thresholds must lie in [0, 1], got conf={} iou={}", self.conf, self.iou);
        }

        Ok(ModelConfig {
            weights_path: self.model.clone(),
            ort_lib_path: self.ort_lib.clone(),
            labels_path: self.labels.clone(),
            inference_device,
            model_version,
            conf_threshold: self.conf,
            iou_threshold: self.iou,
            width: self.width,
            height: self.height,
            num_classes: self.num_classes,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::default()
            .with_bind(self.bind)
            .with_output_dir(&self.output_dir)
            .with_mount_prefix(&self.mount)
            .with_label_font(self.label_font.clone())
            .with_max_upload_mb(self.max_upload_mb)
    }
}
