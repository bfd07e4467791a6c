//! YOLO output layouts, adapted from https://github.com/jamjamjon/usls

use anyhow::{bail, Result};
use ndarray::{ArrayView, Axis, Ix2};

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum ModelVersion {
    YoloV5,
    YoloV6,
    YoloV7,
    #[default] YoloV8,
    YoloV9,
    YoloV10,
    YoloV11,
}

impl ModelVersion {
    pub fn name(&self) -> &'static str {
        match self {
            Self::YoloV5 => "YoloV5",
            Self::YoloV6 => "YoloV6",
            Self::YoloV7 => "YoloV7",
            Self::YoloV8 => "YoloV8",
            Self::YoloV9 => "YoloV9",
            Self::YoloV10 => "YoloV10",
            Self::YoloV11 => "YoloV11",
        }
    }

    pub fn from_name(version: &str) -> Option<ModelVersion> {
        match version.to_lowercase().trim_start_matches("yolo") {
            "v5" => Some(ModelVersion::YoloV5),
            "v6" => Some(ModelVersion::YoloV6),
            "v7" => Some(ModelVersion::YoloV7),
            "v8" => Some(ModelVersion::YoloV8),
            "v9" => Some(ModelVersion::YoloV9),
            "v10" => Some(ModelVersion::YoloV10),
            "v11" => Some(ModelVersion::YoloV11),
            _ => None,
        }
    }

    /// Output layout produced by an export of this version.
    pub fn preds(&self) -> YoloPreds {
        match self {
            Self::YoloV5 | Self::YoloV6 | Self::YoloV7 => YoloPreds::n_a_cxcywh_confclss(),
            Self::YoloV8 | Self::YoloV9 | Self::YoloV11 => YoloPreds::n_cxcywh_clss_a(),
            Self::YoloV10 => YoloPreds::n_a_xyxy_confcls(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoxType {
    /// cx, cy, w, h
    Cxcywh,

    /// x1, y1, x2, y2
    Xyxy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClssType {
    /// One score per class.
    Clss,
    /// Objectness followed by one score per class.
    ConfClss,
    /// Best score followed by its class id.
    ConfCls,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnchorsPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YoloPreds {
    pub clss: ClssType,
    pub bbox: BoxType,
    pub anchors: AnchorsPosition,
    pub apply_nms: bool,
}

/// Column slices of one image's predictions, one row per anchor.
pub struct PredSlices<'a> {
    pub bboxes: ArrayView<'a, f32, Ix2>,
    pub ids: Option<ArrayView<'a, f32, Ix2>>,
    pub clss: ArrayView<'a, f32, Ix2>,
    pub confs: Option<ArrayView<'a, f32, Ix2>>,
}

impl YoloPreds {
    pub fn n_a_cxcywh_confclss() -> Self {
        // YOLOv5 | YOLOv6 | YOLOv7 : NACxcywhConfClss
        Self {
            bbox: BoxType::Cxcywh,
            clss: ClssType::ConfClss,
            anchors: AnchorsPosition::Before,
            apply_nms: true,
        }
    }

    pub fn n_cxcywh_clss_a() -> Self {
        // YOLOv8 | YOLOv9 | YOLO11 : NCxcywhClssA (segmentation heads append mask coefficients)
        Self {
            bbox: BoxType::Cxcywh,
            clss: ClssType::Clss,
            anchors: AnchorsPosition::After,
            apply_nms: true,
        }
    }

    pub fn n_a_xyxy_confcls() -> Self {
        // YOLOv10 : NAXyxyConfCls
        Self {
            bbox: BoxType::Xyxy,
            clss: ClssType::ConfCls,
            anchors: AnchorsPosition::Before,
            apply_nms: false,
        }
    }

    pub fn is_anchors_first(&self) -> bool {
        matches!(self.anchors, AnchorsPosition::Before)
    }

    /// Number of leading columns the layout needs for `nc` classes.
    pub fn min_columns(&self, nc: usize) -> usize {
        match self.clss {
            ClssType::Clss => 4 + nc,
            ClssType::ConfClss => 5 + nc,
            ClssType::ConfCls => 6,
        }
    }

    /// Splits a single image's `[anchors, columns]` (or transposed) prediction view.
    pub fn parse_preds<'a>(&self, x: ArrayView<'a, f32, Ix2>, nc: usize) -> Result<PredSlices<'a>> {
        let x = if self.is_anchors_first() {
            x
        } else {
            x.reversed_axes()
        };

        if x.ncols() < self.min_columns(nc) {
            bail!(
                "Prediction rows have {} columns, the {:?} layout needs at least {} for {} classes",
                x.ncols(),
                self.clss,
                self.min_columns(nc),
                nc
            );
        }

        // get each tasks slices
        let (bboxes, xs) = x.split_at(Axis(1), 4);

        let slices = match self.clss {
            ClssType::ConfClss => {
                let (confs, xs) = xs.split_at(Axis(1), 1);
                let (clss, _) = xs.split_at(Axis(1), nc);
                PredSlices { bboxes, ids: None, clss, confs: Some(confs) }
            }
            ClssType::ConfCls => {
                let (clss, xs) = xs.split_at(Axis(1), 1);
                let (ids, _) = xs.split_at(Axis(1), 1);
                PredSlices { bboxes, ids: Some(ids), clss, confs: None }
            }
            ClssType::Clss => {
                let (clss, _) = xs.split_at(Axis(1), nc);
                PredSlices { bboxes, ids: None, clss, confs: None }
            }
        };

        Ok(slices)
    }
}
