//! Draws detection boxes and labels onto a copy of the source image.

use std::path::Path;
use ab_glyph::{FontVec, PxScale};
use anyhow::Context;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use crate::common::ScanBox;

const BOX_THICKNESS: i32 = 2;
const LABEL_FONT_SIZE: f32 = 18.0;
const LABEL_CHAR_WIDTH: f32 = 9.0;
const LABEL_PADDING: i32 = 2;
const LABEL_TEXT_COLOUR: Rgb<u8> = Rgb([255, 255, 255]);

const PALETTE: [Rgb<u8>; 12] = [
    Rgb([255, 56, 56]),
    Rgb([255, 157, 151]),
    Rgb([255, 112, 31]),
    Rgb([255, 178, 29]),
    Rgb([207, 210, 49]),
    Rgb([72, 249, 10]),
    Rgb([26, 147, 52]),
    Rgb([0, 212, 187]),
    Rgb([0, 194, 255]),
    Rgb([52, 69, 147]),
    Rgb([100, 115, 255]),
    Rgb([203, 56, 255]),
];

pub(crate) fn get_class_colour(class: usize) -> Rgb<u8> {
    PALETTE[class % PALETTE.len()]
}

/// One box to draw: the class id picks the colour, `label` is printed above it.
#[derive(Debug, Clone)]
pub struct Annotation<'a> {
    pub class_id: usize,
    pub bbox: ScanBox,
    pub label: &'a str,
    pub confidence: f32,
}

#[derive(Default)]
pub struct Visualizer {
    font: Option<FontVec>,
}

impl std::fmt::Debug for Visualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visualizer")
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Visualizer {
    /// Loads the label font when a path is given. Without one only boxes and label strips are drawn.
    pub fn new(font_path: Option<&Path>) -> anyhow::Result<Self> {
        let font = match font_path {
            None => None,
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read label font {}", path.display()))?;
                let font = FontVec::try_from_vec(bytes)
                    .map_err(|e| anyhow::anyhow!("Invalid label font {}: {}", path.display(), e))?;
                Some(font)
            }
        };
        Ok(Self { font })
    }

    pub fn annotate(&self, image: &RgbImage, annotations: &[Annotation<'_>]) -> RgbImage {
        let mut canvas = image.clone();
        for annotation in annotations {
            self.draw_annotation(&mut canvas, annotation);
        }
        canvas
    }

    fn draw_annotation(&self, canvas: &mut RgbImage, annotation: &Annotation<'_>) {
        let (w, h) = (canvas.width() as i32, canvas.height() as i32);
        if w == 0 || h == 0 {
            return;
        }
        let (x1, y1, x2, y2) = annotation.bbox.as_x1y1_x2y2_i32();
        let (x1, y1) = (x1.clamp(0, w - 1), y1.clamp(0, h - 1));
        let (x2, y2) = (x2.clamp(0, w - 1), y2.clamp(0, h - 1));
        if x1 >= x2 || y1 >= y2 {
            return;
        }

        let colour = get_class_colour(annotation.class_id);
        for t in 0..BOX_THICKNESS {
            let (bw, bh) = (x2 - x1 - 2 * t, y2 - y1 - 2 * t);
            if bw <= 0 || bh <= 0 {
                break;
            }
            draw_hollow_rect_mut(canvas, Rect::at(x1 + t, y1 + t).of_size(bw as u32, bh as u32), colour);
        }

        let text = format!("{} {:.2}", annotation.label, annotation.confidence);
        let scale = PxScale::from(LABEL_FONT_SIZE);
        let (text_w, text_h) = match &self.font {
            Some(font) => {
                let (tw, th) = text_size(scale, font, &text);
                (tw as i32, th as i32)
            }
            None => ((text.chars().count() as f32 * LABEL_CHAR_WIDTH) as i32, LABEL_FONT_SIZE as i32),
        };
        let strip_w = (text_w + 2 * LABEL_PADDING).min(w - x1).max(1);
        let strip_h = (text_h + 2 * LABEL_PADDING).min(h).max(1);

        // above the box when it fits, otherwise inside its top edge
        let strip_y = if y1 - strip_h >= 0 { y1 - strip_h } else { y1 };
        draw_filled_rect_mut(canvas, Rect::at(x1, strip_y).of_size(strip_w as u32, strip_h as u32), colour);

        if let Some(font) = &self.font {
            draw_text_mut(
                canvas,
                LABEL_TEXT_COLOUR,
                x1 + LABEL_PADDING,
                strip_y + LABEL_PADDING,
                scale,
                font,
                &text,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        assert_eq!(get_class_colour(0), get_class_colour(PALETTE.len()));
        assert_ne!(get_class_colour(0), get_class_colour(1));
    }

    #[test]
    fn no_annotations_leaves_image_untouched() {
        let img = RgbImage::from_pixel(32, 16, Rgb([10, 20, 30]));
        let out = Visualizer::default().annotate(&img, &[]);
        assert_eq!(out, img);
    }

    #[test]
    fn draws_box_outline_in_class_colour() {
        let img = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let annotation = Annotation {
            class_id: 6,
            bbox: ScanBox::new(20., 40., 80., 90.),
            label: "Can",
            confidence: 0.9,
        };
        let out = Visualizer::default().annotate(&img, &[annotation]);
        let colour = get_class_colour(6);
        assert_eq!(*out.get_pixel(20, 60), colour);
        assert_eq!(*out.get_pixel(21, 60), colour);
        assert_eq!(*out.get_pixel(50, 60), Rgb([0, 0, 0]));
        // label strip sits above the box
        assert_eq!(*out.get_pixel(22, 30), colour);
    }

    #[test]
    fn degenerate_box_is_skipped() {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let annotation = Annotation {
            class_id: 0,
            bbox: ScanBox::new(5., 5., 5., 9.),
            label: "Straw",
            confidence: 0.5,
        };
        assert_eq!(Visualizer::default().annotate(&img, &[annotation]), img);
    }

    #[test]
    fn missing_font_is_an_error() {
        assert!(Visualizer::new(Some(Path::new("/no/such/font.ttf"))).is_err());
    }
}
