mod advice;
mod inference_device;
mod model_config;
mod model_version;
mod scan_box;
mod scan_detection;
mod scan_results;

pub use advice::*;
pub use inference_device::*;
pub use model_config::*;
pub use model_version::*;
pub use scan_box::*;
pub use scan_detection::*;
pub use scan_results::*;
