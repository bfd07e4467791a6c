pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    fn class_id(&self) -> usize;
}

/// Greedy per-class non-maximum suppression: a box is only suppressed by a
/// higher-scoring box of the same class. Survivors are left sorted by descending confidence.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
    boxes.sort_by(|b1, b2| {
        b2.confidence()
            .partial_cmp(&b1.confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            if boxes[prev_index].class_id() != boxes[index].class_id() {
                continue;
            }
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ScanBox, ScanDetection};

    fn det(conf: f32, x1: f32) -> ScanDetection {
        ScanDetection::new(0, ScanBox::new(x1, 0., x1 + 10., 10.), conf)
    }

    #[test]
    fn overlapping_boxes_of_different_classes_both_survive() {
        let mut boxes = vec![
            ScanDetection::new(3, ScanBox::new(0., 0., 100., 100.), 0.9),
            ScanDetection::new(6, ScanBox::new(2., 2., 100., 100.), 0.8),
            ScanDetection::new(3, ScanBox::new(1., 1., 100., 100.), 0.7),
        ];
        nms(&mut boxes, 0.7);
        let kept: Vec<(usize, f32)> = boxes.iter().map(|b| (b.class_id, b.confidence)).collect();
        assert_eq!(kept, vec![(3, 0.9), (6, 0.8)]);
    }

    #[test]
    fn suppresses_overlaps_and_sorts_by_confidence() {
        let mut boxes = vec![det(0.5, 0.), det(0.9, 1.), det(0.7, 50.)];
        nms(&mut boxes, 0.5);
        let confs: Vec<f32> = boxes.iter().map(|b| b.confidence).collect();
        assert_eq!(confs, vec![0.9, 0.7]);
    }

    #[test]
    fn keeps_everything_below_threshold() {
        let mut boxes = vec![det(0.4, 0.), det(0.6, 8.)];
        nms(&mut boxes, 0.7);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].confidence, 0.6);
    }
}
