use std::time::Instant;
use image::RgbImage;
use crate::common::{BatchResult, ImageResult};
use crate::detection_processing::DetectionPipeline;
use crate::error::ScanError;
use crate::output::OutputWriter;

/// One `files` part of an analyze request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn decode(&self) -> Result<RgbImage, ScanError> {
        let image = image::load_from_memory(&self.bytes).map_err(ScanError::Decode)?;
        Ok(image.to_rgb8())
    }
}

/// Runs each upload of a batch through decode, detection and output, keeping
/// one file's failure away from its siblings.
pub struct BatchRequestHandler {
    pipeline: DetectionPipeline,
    writer: OutputWriter,
}

impl BatchRequestHandler {
    pub fn new(pipeline: DetectionPipeline, writer: OutputWriter) -> Self {
        Self { pipeline, writer }
    }

    /// One outcome per file, in submission order. Files run strictly one after another.
    pub fn handle_outcomes(&self, files: &[UploadedFile]) -> Vec<Result<ImageResult, ScanError>> {
        // each write re-checks the directory, so a failure here surfaces per file
        if let Err(e) = self.writer.ensure_dir() {
            log::error!("{e}");
        }

        files.iter().map(|file| self.process_file(file)).collect()
    }

    /// Aggregates [`Self::handle_outcomes`]: failed files are logged and left out.
    pub fn handle(&self, files: &[UploadedFile]) -> BatchResult {
        let now = Instant::now();
        log::info!("Analyzing batch of {} file(s)", files.len());

        let mut results = Vec::with_capacity(files.len());
        for (file, outcome) in files.iter().zip(self.handle_outcomes(files)) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::error!("Error processing {}: {}", file.filename, e);
                    log::error!("{:?}", anyhow::Error::new(e));
                }
            }
        }

        log::info!(
            "Batch done: {}/{} file(s) succeeded in {:.2?}",
            results.len(),
            files.len(),
            now.elapsed()
        );
        BatchResult { results }
    }

    fn process_file(&self, file: &UploadedFile) -> Result<ImageResult, ScanError> {
        let image = file.decode()?;
        let (detections, annotated) = self.pipeline.process(&image)?;
        let image_path = self.writer.write(&annotated, &file.filename)?;
        Ok(ImageResult { image_path, detections })
    }
}
