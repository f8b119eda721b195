//! Placement rectangle and image size types.
//!
//! The rectangle lives in image space: `(0.0, 0.0)` is the top-left pixel of
//! the base image and one unit is one base pixel.

use serde::{Deserialize, Serialize};

/// Smallest width or height a placement may have, in image pixels.
pub const MIN_SIZE: f64 = 20.0;

/// Edge length of the default placement created when a base image loads.
pub const DEFAULT_SIZE: f64 = 200.0;

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center point in image space.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

/// Where the overlay goes on the base image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl PlacementRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The default 200×200 placement centered on a freshly loaded base.
    pub fn centered_default(base: ImageSize) -> Self {
        let (cx, cy) = base.center();
        Self {
            x: cx - DEFAULT_SIZE / 2.0,
            y: cy - DEFAULT_SIZE / 2.0,
            w: DEFAULT_SIZE,
            h: DEFAULT_SIZE,
        }
        .clamped_into(base)
    }

    /// Same size, centered on the base.
    pub fn centered_on(&self, base: ImageSize) -> Self {
        Self {
            x: (base.width as f64 - self.w) / 2.0,
            y: (base.height as f64 - self.h) / 2.0,
            ..*self
        }
        .clamped_into(base)
    }

    /// The center point of this rectangle.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.w / self.h
    }

    /// Check if an image-space point is within this rectangle.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Clamp the position so the rectangle stays inside the base.
    ///
    /// A rectangle larger than the base is pinned to the top-left corner.
    pub fn clamped_into(&self, base: ImageSize) -> Self {
        let max_x = base.width as f64 - self.w;
        let max_y = base.height as f64 - self.h;
        Self {
            x: self.x.min(max_x).max(0.0),
            y: self.y.min(max_y).max(0.0),
            ..*self
        }
    }

    /// Shrink the rectangle until it fits inside the base, then clamp it.
    ///
    /// With `locked_ratio` both sides shrink by the same factor; otherwise each
    /// side is capped on its own. The size floor always wins.
    pub fn fit_within(&self, base: ImageSize, locked_ratio: Option<f64>) -> Self {
        let (bw, bh) = (base.width as f64, base.height as f64);
        let (mut w, mut h) = (self.w, self.h);

        if w > bw || h > bh {
            if locked_ratio.is_some() {
                let s = (bw / w).min(bh / h);
                w *= s;
                h *= s;
            } else {
                w = w.min(bw);
                h = h.min(bh);
            }
        }

        Self {
            x: self.x,
            y: self.y,
            w: w.max(MIN_SIZE),
            h: h.max(MIN_SIZE),
        }
        .clamped_into(base)
    }

    /// Whether the rectangle lies fully inside the base (with a small tolerance).
    pub fn is_within(&self, base: ImageSize) -> bool {
        const EPS: f64 = 1e-6;
        self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= base.width as f64 + EPS
            && self.bottom() <= base.height as f64 + EPS
    }

    /// Round to whole pixels for compositing.
    pub fn to_pixels(&self) -> PixelRect {
        PixelRect {
            x: self.x.round() as i64,
            y: self.y.round() as i64,
            width: self.w.round().max(1.0) as u32,
            height: self.h.round().max(1.0) as u32,
        }
    }
}

impl Default for PlacementRect {
    fn default() -> Self {
        Self::new(0.0, 0.0, DEFAULT_SIZE, DEFAULT_SIZE)
    }
}

/// A placement rounded to whole pixels, frozen for one batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_centered_default() {
        let rect = PlacementRect::centered_default(ImageSize::new(800, 600));
        assert_eq!(rect, PlacementRect::new(300.0, 200.0, 200.0, 200.0));
    }

    #[test]
    fn test_centered_default_on_small_base_is_pinned() {
        let rect = PlacementRect::centered_default(ImageSize::new(150, 120));
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn test_clamp_into_base() {
        let base = ImageSize::new(800, 600);
        let rect = PlacementRect::new(-50.0, 700.0, 300.0, 300.0).clamped_into(base);
        assert_eq!(rect, PlacementRect::new(0.0, 300.0, 300.0, 300.0));
    }

    #[test]
    fn test_fit_within_locked_keeps_ratio() {
        let base = ImageSize::new(400, 300);
        let rect = PlacementRect::new(100.0, 50.0, 600.0, 400.0).fit_within(base, Some(1.5));
        assert!((rect.aspect_ratio() - 1.5).abs() < 1e-9);
        assert!(rect.is_within(base));
        assert!((rect.w - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_within_unlocked_caps_each_side() {
        let base = ImageSize::new(400, 300);
        let rect = PlacementRect::new(10.0, 10.0, 500.0, 100.0).fit_within(base, None);
        assert_eq!(rect.w, 400.0);
        assert_eq!(rect.h, 100.0);
        assert!(rect.is_within(base));
    }

    #[test]
    fn test_center_and_contains() {
        let rect = PlacementRect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.center(), (60.0, 45.0));
        assert!(rect.contains(60.0, 45.0));
        assert!(!rect.contains(5.0, 45.0));
    }

    #[test]
    fn test_to_pixels_rounds() {
        let px = PlacementRect::new(10.4, 10.6, 99.5, 100.49).to_pixels();
        assert_eq!(
            px,
            PixelRect {
                x: 10,
                y: 11,
                width: 100,
                height: 100
            }
        );
    }

    proptest! {
        #[test]
        fn fit_within_always_lands_inside(
            bw in 20u32..3000,
            bh in 20u32..3000,
            x in -5000.0f64..5000.0,
            y in -5000.0f64..5000.0,
            w in 1.0f64..6000.0,
            h in 1.0f64..6000.0,
            locked in any::<bool>(),
        ) {
            let base = ImageSize::new(bw, bh);
            let ratio = locked.then_some(w / h);
            let rect = PlacementRect::new(x, y, w, h).fit_within(base, ratio);
            prop_assert!(rect.is_within(base), "{:?} not inside {:?}", rect, base);
            prop_assert!(rect.w >= MIN_SIZE && rect.h >= MIN_SIZE);
        }
    }
}
