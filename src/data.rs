mod config_ort;
mod server_config;

pub use config_ort::ConfigOrt;
pub use server_config::ServerConfig;

pub use crate::detection_runners::ort_detector::input_wrapper::{X, Xs};
pub use crate::detection_runners::ort_detector::y::Y;

pub(crate) const CROSS_MARK: &str = "❌";
