//! File/code adapted from https://github.com/jamjamjon/usls

use std::collections::HashMap;
use anyhow::Result;
use image::RgbImage;
use ndarray::{s, Axis, Ix2};
use rayon::prelude::*;
use regex::Regex;

use crate::common::{BoxType, ScanBox, ScanDetection, YoloPreds};
use crate::data::{ConfigOrt, Xs, Y};
use crate::detection_runners::inference_process::{Detector, InferenceProcess};
use crate::detection_runners::ort_detector::image_ops::{self, ResizeMode};
use crate::detection_runners::ort_detector::OrtEngine;

#[derive(Debug)]
pub struct OrtYOLO {
    engine: OrtEngine,
    nc: usize,
    height: u32,
    width: u32,
    conf: f32,
    iou: f32,
    names: HashMap<usize, String>,
    layout: YoloPreds,
}

impl InferenceProcess for OrtYOLO {
    type Input = RgbImage;

    fn new(options: ConfigOrt) -> Result<Self> {
        let engine = OrtEngine::new(&options)?;
        let (height, width) = (engine.model_height(), engine.model_width());

        // YOLO Outputs Format
        let version = options.yolo_version;
        let layout = version.preds();

        // Class names: user-defined.or(parsed).or(generated)
        let names_parsed = engine.try_fetch("names").map(|raw| Self::fetch_names(&raw));
        let names: Option<HashMap<usize, String>> = match options.names {
            Some(names) => {
                if let Some(parsed) = &names_parsed {
                    if parsed.len() != names.len() {
                        log::warn!(
                            "Label file has {} names but the model metadata lists {}, using the label file",
                            names.len(),
                            parsed.len(),
                        );
                    }
                }
                Some(names.into_iter().enumerate().collect())
            }
            None => names_parsed.filter(|parsed| !parsed.is_empty()),
        };

        // nc: highest named id + 1, or options.nc
        let (nc, names) = match names {
            Some(names) => (names.keys().max().map_or(0, |&id| id + 1), names),
            None => match options.nc {
                Some(nc) => (nc, Self::n2s(nc)),
                None => anyhow::bail!(
                    "Unable to obtain the number of classes. Provide a label file or the class count."
                ),
            },
        };
        if let Some(nc_cfg) = options.nc {
            if nc_cfg != nc {
                log::warn!("Configured class count {} differs from the {} named classes", nc_cfg, nc);
            }
        }

        log::info!("YOLO Version: {:?} | Classes: {} | Layout: {:?}", version, nc, layout);

        Ok(Self {
            engine,
            nc,
            height,
            width,
            conf: options.conf,
            iou: options.iou,
            names,
            layout,
        })
    }

    fn preprocess(&self, xs: &[Self::Input]) -> Result<Xs> {
        let x = image_ops::preprocess(xs, self.height, self.width, ResizeMode::Letterbox)?;
        Ok(Xs::from(x))
    }

    fn inference(&self, xs: Xs) -> Result<Xs> {
        self.engine.engine_run(xs)
    }

    fn postprocess(&self, xs: Xs, xs0: &[Self::Input]) -> Result<Vec<Y>> {
        if xs.is_empty() {
            anyhow::bail!("Model produced no outputs");
        }
        let preds_batch = &xs[0];
        if preds_batch.ndim() != 3 {
            anyhow::bail!("Expected a 3-D prediction tensor, got shape {:?}", preds_batch.shape());
        }

        let mut ys = Vec::with_capacity(xs0.len());
        for (idx, preds) in preds_batch.axis_iter(Axis(0)).enumerate() {
            let Some(image) = xs0.get(idx) else { break };
            let preds = preds.into_dimensionality::<Ix2>()?;

            // parse predictions
            let slices = self.layout.parse_preds(preds, self.nc)?;

            let image_width = image.width() as f32;
            let image_height = image.height() as f32;
            let ratio = image_ops::letterbox_ratio(image.width(), image.height(), self.width, self.height);

            let detections: Vec<ScanDetection> = slices
                .bboxes
                .axis_iter(Axis(0))
                .into_par_iter()
                .enumerate()
                .filter_map(|(i, bbox)| {
                    // confidence & class_id
                    let (class_id, confidence) = match &slices.ids {
                        Some(ids) => (ids[[i, 0]].max(0.) as usize, slices.clss[[i, 0]]),
                        None => {
                            let (class_id, &confidence) = slices
                                .clss
                                .slice(s![i, ..])
                                .into_iter()
                                .enumerate()
                                .max_by(|a, b| a.1.total_cmp(b.1))?;

                            match &slices.confs {
                                None => (class_id, confidence),
                                Some(confs) => (class_id, confidence * confs[[i, 0]]),
                            }
                        }
                    };

                    // filtering low scores
                    if confidence < self.conf {
                        return None;
                    }

                    // back to source pixels
                    let bbox = bbox.mapv(|x| x / ratio);
                    let scan_box = match self.layout.bbox {
                        BoxType::Cxcywh => ScanBox::default().with_cxcy_wh(bbox[0], bbox[1], bbox[2], bbox[3]),
                        BoxType::Xyxy => ScanBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
                    }
                    .clamp_to(image_width, image_height);

                    if scan_box.w <= 0. || scan_box.h <= 0. {
                        return None;
                    }

                    Some(ScanDetection::new(class_id, scan_box, confidence))
                })
                .collect();

            let mut y = Y::default().with_detections(detections);
            if self.layout.apply_nms {
                y = y.apply_nms(self.iou);
            }
            ys.push(y);
        }

        Ok(ys)
    }
}

impl Detector for OrtYOLO {
    fn detect(&self, image: &RgbImage) -> Result<Vec<ScanDetection>> {
        let ys = self.run(std::slice::from_ref(image))?;
        Ok(ys.into_iter().next().map(Y::into_detections).unwrap_or_default())
    }

    fn class_name(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }
}

impl OrtYOLO {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Parses the `names` metadata entry written by YOLO exporters:
    /// `{0: 'person', 1: 'bicycle', ..., 27: "yellow_lady's_slipper"}`
    pub(crate) fn fetch_names(raw: &str) -> HashMap<usize, String> {
        let mut names = HashMap::new();
        let Ok(re) = Regex::new(r#"(\d+)\s*:\s*(?:'([^']*)'|"([^"]*)")"#) else {
            return names;
        };
        for caps in re.captures_iter(raw) {
            let Some(id) = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) else {
                continue;
            };
            if let Some(name) = caps.get(2).or_else(|| caps.get(3)) {
                names.insert(id, name.as_str().to_string());
            }
        }
        names
    }

    fn n2s(n: usize) -> HashMap<usize, String> {
        (0..n).map(|x| (x, format!("# {}", x))).collect()
    }
}
