use std::time::Instant;
use image::RgbImage;
use crate::common::ScanDetection;
use crate::data::{ConfigOrt, Xs, Y};
use crate::utils;

pub trait InferenceProcess: Sized {
    type Input; // RgbImage

    /// Creates a new instance of the model with the given options.
    fn new(options: ConfigOrt) -> anyhow::Result<Self>;

    /// Pre-process the input data.
    fn preprocess(&self, xs: &[Self::Input]) -> anyhow::Result<Xs>;

    /// Executes the model on the preprocessed data.
    fn inference(&self, xs: Xs) -> anyhow::Result<Xs>;

    /// Post-process the model's output.
    fn postprocess(&self, xs: Xs, xs0: &[Self::Input]) -> anyhow::Result<Vec<Y>>;

    /// Executes the full pipeline.
    fn run(&self, xs: &[Self::Input]) -> anyhow::Result<Vec<Y>> {
        let detect_time = Instant::now();

        let ys = self.preprocess(xs)?;
        let mut _detect_elapsed = utils::trace("Preprocessing input", detect_time, Default::default());

        let ys = self.inference(ys)?;
        _detect_elapsed = utils::trace("Detection run", detect_time, _detect_elapsed);

        let ys = self.postprocess(ys, xs)?;
        utils::trace("Postprocessing", detect_time, _detect_elapsed);

        Ok(ys)
    }
}

/// The model capability the request pipeline depends on: one image in, raw
/// detections out, plus the id -> name mapping of the loaded model.
pub trait Detector: Send + Sync {
    /// Detections for `image` in model order, boxes in source pixels.
    fn detect(&self, image: &RgbImage) -> anyhow::Result<Vec<ScanDetection>>;

    /// Class name for `class_id`, `None` if the model does not name it.
    fn class_name(&self, class_id: usize) -> Option<&str>;
}
