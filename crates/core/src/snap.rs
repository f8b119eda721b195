//! Center-line snapping for the move gesture.
//!
//! Each axis is tested on its own: when the rectangle's center comes within
//! the threshold of the base's center line on that axis, the center is pulled
//! onto the line.

use postermill_model::{ImageSize, PlacementRect};

/// Which axes snapped during the last adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapHit {
    /// Snapped to the vertical center line (x axis adjusted).
    pub vertical: bool,
    /// Snapped to the horizontal center line (y axis adjusted).
    pub horizontal: bool,
}

impl SnapHit {
    pub fn any(&self) -> bool {
        self.vertical || self.horizontal
    }
}

/// Snap a value to `target` when it is strictly closer than `threshold`.
pub fn snap_value(value: f64, target: f64, threshold: f64) -> Option<f64> {
    ((value - target).abs() < threshold).then_some(target)
}

/// Pull the rectangle's center onto the base center lines.
///
/// `threshold` is in image pixels; callers convert from view pixels by
/// dividing by the current zoom.
pub fn snap_to_center(
    rect: PlacementRect,
    base: ImageSize,
    threshold: f64,
) -> (PlacementRect, SnapHit) {
    let (cx, cy) = rect.center();
    let (bx, by) = base.center();
    let mut snapped = rect;
    let mut hit = SnapHit::default();

    if let Some(x) = snap_value(cx, bx, threshold) {
        snapped.x = x - rect.w / 2.0;
        hit.vertical = true;
    }
    if let Some(y) = snap_value(cy, by, threshold) {
        snapped.y = y - rect.h / 2.0;
        hit.horizontal = true;
    }

    (snapped, hit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_value_is_strict() {
        assert_eq!(snap_value(95.0, 100.0, 10.0), Some(100.0));
        assert_eq!(snap_value(90.0, 100.0, 10.0), None);
    }

    #[test]
    fn test_axes_snap_independently() {
        let base = ImageSize::new(800, 600);
        // center at (405, 250): x near 400, y far from 300
        let rect = PlacementRect::new(355.0, 200.0, 100.0, 100.0);
        let (snapped, hit) = snap_to_center(rect, base, 10.0);

        assert!(hit.vertical);
        assert!(!hit.horizontal);
        assert_eq!(snapped.center().0, 400.0);
        assert_eq!(snapped.y, 200.0);
    }

    #[test]
    fn test_no_snap_outside_threshold() {
        let base = ImageSize::new(800, 600);
        let rect = PlacementRect::new(0.0, 0.0, 100.0, 100.0);
        let (snapped, hit) = snap_to_center(rect, base, 10.0);
        assert!(!hit.any());
        assert_eq!(snapped, rect);
    }
}
