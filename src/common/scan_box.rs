use serde::{Deserialize, Serialize};

/// Axis-aligned box in source-image pixel space.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct ScanBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub w: f32,
    pub h: f32,
}

impl ScanBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    /// Returns the bounding box coordinates as `[x1, y1, x2, y2]`.
    pub fn xyxy(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Computes the area of the bounding box.
    pub fn area(&self) -> f32 {
        self.h * self.w
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &ScanBox) -> f32 {
        let left = self.x1.max(other.x1);
        let right = self.x2.min(other.x2);
        let top = self.y1.max(other.y1);
        let bottom = self.y2.min(other.y2);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &ScanBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Clips the box to `[0, width] x [0, height]`.
    pub fn clamp_to(self, width: f32, height: f32) -> Self {
        Self::new(
            self.x1.clamp(0., width),
            self.y1.clamp(0., height),
            self.x2.clamp(0., width),
            self.y2.clamp(0., height),
        )
    }

    pub fn as_x1y1_x2y2_i32(&self) -> (i32, i32, i32, i32) {
        (self.x1.round() as i32,
         self.y1.round() as i32,
         self.x2.round() as i32,
         self.y2.round() as i32)
    }

    /// Sets the bounding box's coordinates and dimensions using `(cx, cy, w, h)`.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - (w / 2.0);
        self.y1 = cy - (h / 2.0);
        self.w = w;
        self.h = h;

        self.x2 = cx + (w / 2.0);
        self.y2 = cy + (h / 2.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes() {
        let a = ScanBox::new(0., 0., 10., 10.);
        let b = ScanBox::new(5., 5., 15., 15.);
        assert_eq!(a.intersect(&b), 25.);
        assert_eq!(a.union(&b), 175.);
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = ScanBox::new(0., 0., 10., 10.);
        let b = ScanBox::new(20., 20., 30., 30.);
        assert_eq!(a.intersect(&b), 0.);
    }

    #[test]
    fn center_form_matches_corner_form() {
        let a = ScanBox::default().with_cxcy_wh(10., 20., 4., 6.);
        assert_eq!(a.xyxy(), [8., 17., 12., 23.]);
    }

    #[test]
    fn clamp_keeps_box_inside_image() {
        let a = ScanBox::new(-5., -1., 120., 40.).clamp_to(100., 50.);
        assert_eq!(a.xyxy(), [0., 0., 100., 40.]);
        assert_eq!(a.w, 100.);
    }
}
