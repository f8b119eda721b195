//! View transform: maps between view space (screen pixels) and image space.
//!
//! `image = (view - offset) / scale` and `view = image * scale + offset`.

use serde::{Deserialize, Serialize};

use crate::rect::{ImageSize, PlacementRect};

/// Smallest allowed zoom.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed zoom.
pub const MAX_SCALE: f64 = 5.0;
/// Margin kept around the image when fitting it to the view (total, both sides).
pub const FIT_MARGIN: f64 = 40.0;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Scale + offset pair relating the drawing surface to the base image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    scale: f64,
    offset: Point2D,
    /// Cleared by the first manual zoom; set again by a new base image.
    auto_fit: bool,
}

impl ViewTransform {
    /// Identity transform with auto-fit enabled.
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            offset: Point2D::default(),
            auto_fit: true,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point2D {
        self.offset
    }

    pub fn auto_fit(&self) -> bool {
        self.auto_fit
    }

    /// Back to identity and re-arm auto-fit (a new base image was loaded).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// View-space point to image space.
    pub fn to_image(&self, p: Point2D) -> Point2D {
        Point2D::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    /// Image-space point to view space.
    pub fn to_view(&self, p: Point2D) -> Point2D {
        Point2D::new(
            p.x * self.scale + self.offset.x,
            p.y * self.scale + self.offset.y,
        )
    }

    /// Image-space rectangle to a view-space rectangle.
    pub fn rect_to_view(&self, rect: &PlacementRect) -> PlacementRect {
        let origin = self.to_view(Point2D::new(rect.x, rect.y));
        PlacementRect::new(origin.x, origin.y, rect.w * self.scale, rect.h * self.scale)
    }

    /// Fit and center the image in the view, never magnifying past 1:1.
    ///
    /// Does nothing once auto-fit has been cleared by a manual zoom, or when the
    /// view is too small to hold the margin. Returns whether the transform changed.
    pub fn fit_to_view(&mut self, view_w: f64, view_h: f64, image: ImageSize) -> bool {
        if !self.auto_fit
            || view_w <= FIT_MARGIN
            || view_h <= FIT_MARGIN
            || image.width == 0
            || image.height == 0
        {
            return false;
        }

        let (img_w, img_h) = (image.width as f64, image.height as f64);
        let scale = ((view_w - FIT_MARGIN) / img_w)
            .min((view_h - FIT_MARGIN) / img_h)
            .min(1.0)
            .clamp(MIN_SCALE, MAX_SCALE);

        self.scale = scale;
        self.offset = Point2D::new(
            (view_w - img_w * scale) / 2.0,
            (view_h - img_h * scale) / 2.0,
        );
        true
    }

    /// Zoom by `factor`, keeping the image point under `pointer` fixed.
    pub fn zoom_at(&mut self, pointer: Point2D, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let k = new_scale / self.scale;
        self.offset = Point2D::new(
            pointer.x - (pointer.x - self.offset.x) * k,
            pointer.y - (pointer.y - self.offset.y) * k,
        );
        self.scale = new_scale;
        self.auto_fit = false;
    }

    /// Shift the image by a view-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset.x += dx;
        self.offset.y += dy;
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}
