//! Placement engine.
//!
//! [`PlacementSession`] owns everything the editor needs to position the
//! overlay: the rectangle, the view transform, the aspect lock, the active
//! drag gesture and the undo history. UI adapters hold it by reference, feed
//! it pointer/scroll/entry intents and re-render from the rectangle it returns.
//!
//! Only committed operations touch history; per-motion drag updates never do.

use serde::{Deserialize, Serialize};

use postermill_common::config::PlacementDefaults;
use postermill_common::error::{PostermillError, PostermillResult};
use postermill_model::{History, ImageSize, PlacementRect, Point2D, ViewTransform, MIN_SIZE};

use crate::snap::{snap_to_center, SnapHit};

/// Distance (view pixels) within which a corner handle grabs the pointer.
pub const HANDLE_GRAB_RADIUS: f64 = 15.0;
/// Zoom step for one scroll notch.
pub const ZOOM_STEP_IN: f64 = 1.1;
pub const ZOOM_STEP_OUT: f64 = 0.9;
/// Offset change for one pan-scroll notch, in view pixels.
pub const PAN_SCROLL_STEP: f64 = 20.0;

/// Tuning knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementSettings {
    pub snap_enabled: bool,
    /// Snap tolerance in view pixels.
    pub snap_threshold_px: f64,
    /// A newly loaded overlay is fitted into a square of this size.
    pub overlay_box: f64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self::from(&PlacementDefaults::default())
    }
}

impl From<&PlacementDefaults> for PlacementSettings {
    fn from(defaults: &PlacementDefaults) -> Self {
        Self {
            snap_enabled: defaults.snap_enabled,
            snap_threshold_px: defaults.snap_threshold_px,
            overlay_box: defaults.overlay_box.max(MIN_SIZE),
        }
    }
}

/// What a pointer gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragMode {
    None,
    Move,
    ResizeTopLeft,
    ResizeTopRight,
    ResizeBottomLeft,
    ResizeBottomRight,
    Pan,
}

impl DragMode {
    pub fn is_resize(&self) -> bool {
        matches!(
            self,
            Self::ResizeTopLeft
                | Self::ResizeTopRight
                | Self::ResizeBottomLeft
                | Self::ResizeBottomRight
        )
    }

    /// Gestures that edit the rectangle (and therefore commit on release).
    pub fn edits_rect(&self) -> bool {
        matches!(self, Self::Move) || self.is_resize()
    }
}

/// An in-progress pointer gesture.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    mode: DragMode,
    /// Pointer position of the previous motion event (view space).
    last_pointer: Point2D,
    /// Rectangle when the gesture began.
    start_rect: PlacementRect,
}

/// Aspect lock with the ratio captured when it was engaged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectLock {
    pub enabled: bool,
    /// `w / h`.
    pub ratio: f64,
}

impl AspectLock {
    fn locked_ratio(&self) -> Option<f64> {
        self.enabled.then_some(self.ratio)
    }
}

impl Default for AspectLock {
    fn default() -> Self {
        Self {
            enabled: false,
            ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// A scroll event as classified by the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollIntent {
    /// Zoom around the pointer (scrolling up zooms in).
    Zoom {
        pointer: Point2D,
        direction: ScrollDirection,
    },
    /// Scroll the view vertically.
    Pan { direction: ScrollDirection },
}

/// A single edited dimension from the numeric entry fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Width(f64),
    Height(f64),
}

/// Parsed numeric rectangle entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualEntry {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ManualEntry {
    /// Parse the four entry fields.
    pub fn parse(x: &str, y: &str, w: &str, h: &str) -> PostermillResult<Self> {
        Ok(Self {
            x: parse_field("x", x)?,
            y: parse_field("y", y)?,
            w: parse_field("width", w)?,
            h: parse_field("height", h)?,
        })
    }

    /// Parse `x,y,w,h`.
    pub fn parse_csv(value: &str) -> PostermillResult<Self> {
        let parts: Vec<&str> = value.split(',').collect();
        match parts.as_slice() {
            [x, y, w, h] => Self::parse(x, y, w, h),
            _ => Err(PostermillError::input(format!(
                "Expected x,y,w,h but got '{value}'"
            ))),
        }
    }
}

fn parse_field(name: &str, value: &str) -> PostermillResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PostermillError::input(format!("{name} must be a number, got '{value}'")))
}

/// Base-image center lines in view space, drawn while snapping is on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapGuides {
    /// View x of the vertical center line.
    pub vertical_x: f64,
    /// View y of the horizontal center line.
    pub horizontal_y: f64,
    /// View-space bounds of the base image (the lines' extent).
    pub base_in_view: PlacementRect,
}

/// Editing session for one base image and its overlay placement.
#[derive(Debug, Clone)]
pub struct PlacementSession {
    settings: PlacementSettings,
    base: Option<ImageSize>,
    overlay: Option<ImageSize>,
    view_size: Option<(f64, f64)>,
    rect: PlacementRect,
    transform: ViewTransform,
    lock: AspectLock,
    drag: Option<DragSession>,
    last_snap: SnapHit,
    history: History,
}

impl PlacementSession {
    pub fn new(settings: PlacementSettings) -> Self {
        Self {
            settings,
            base: None,
            overlay: None,
            view_size: None,
            rect: PlacementRect::default(),
            transform: ViewTransform::new(),
            lock: AspectLock::default(),
            drag: None,
            last_snap: SnapHit::default(),
            history: History::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn rect(&self) -> PlacementRect {
        self.rect
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn base(&self) -> Option<ImageSize> {
        self.base
    }

    pub fn overlay(&self) -> Option<ImageSize> {
        self.overlay
    }

    pub fn aspect_lock(&self) -> AspectLock {
        self.lock
    }

    pub fn settings(&self) -> &PlacementSettings {
        &self.settings
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mode of the gesture in progress, if any.
    pub fn drag_mode(&self) -> DragMode {
        self.drag.map_or(DragMode::None, |d| d.mode)
    }

    /// Axes that snapped on the latest move update.
    pub fn last_snap(&self) -> SnapHit {
        self.last_snap
    }

    // ── Loading ───────────────────────────────────────────────────────

    /// A new base image replaced the old one.
    ///
    /// The view re-arms auto-fit, the rectangle goes back to its centered
    /// default (keeping the overlay's size if one is loaded) and history
    /// restarts from that single state.
    pub fn load_base(&mut self, size: ImageSize) -> PlacementRect {
        self.base = Some(size);
        self.drag = None;
        self.transform.reset();
        if let Some((w, h)) = self.view_size {
            self.transform.fit_to_view(w, h, size);
        }

        self.rect = match self.overlay {
            Some(_) => self
                .rect
                .fit_within(size, self.lock.locked_ratio())
                .centered_on(size),
            None => PlacementRect::centered_default(size),
        };
        self.history.reset(self.rect);

        tracing::debug!(
            width = size.width,
            height = size.height,
            rect = ?self.rect,
            "Base image loaded"
        );
        self.rect
    }

    /// A new overlay was picked. The rectangle takes the overlay's proportions,
    /// fitted into the configured box, and the lock ratio follows.
    pub fn load_overlay(&mut self, size: ImageSize) -> PlacementRect {
        self.overlay = Some(size);
        self.lock.ratio = size.aspect_ratio();

        let (ow, oh) = (size.width.max(1) as f64, size.height.max(1) as f64);
        let s = (self.settings.overlay_box / ow)
            .min(self.settings.overlay_box / oh)
            .min(1.0);
        let (w, h) = floor_dims(ow * s, oh * s, Some(self.lock.ratio));

        let rect = PlacementRect::new(self.rect.x, self.rect.y, w, h);
        self.commit(self.normalized(rect, Some(self.lock.ratio)))
    }

    /// The drawing surface changed size; refit while auto-fit is armed.
    pub fn set_view_size(&mut self, width: f64, height: f64) -> bool {
        self.view_size = Some((width, height));
        match self.base {
            Some(base) => self.transform.fit_to_view(width, height, base),
            None => false,
        }
    }

    // ── View ──────────────────────────────────────────────────────────

    pub fn zoom_at(&mut self, pointer: Point2D, factor: f64) {
        self.transform.zoom_at(pointer, factor);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform.pan(dx, dy);
    }

    pub fn scroll(&mut self, intent: ScrollIntent) {
        match intent {
            ScrollIntent::Zoom { pointer, direction } => {
                let factor = match direction {
                    ScrollDirection::Up => ZOOM_STEP_IN,
                    ScrollDirection::Down => ZOOM_STEP_OUT,
                };
                self.zoom_at(pointer, factor);
            }
            ScrollIntent::Pan { direction } => {
                let dy = match direction {
                    ScrollDirection::Up => PAN_SCROLL_STEP,
                    ScrollDirection::Down => -PAN_SCROLL_STEP,
                };
                self.pan(0.0, dy);
            }
        }
    }

    /// The rectangle on screen.
    pub fn rect_in_view(&self) -> PlacementRect {
        self.transform.rect_to_view(&self.rect)
    }

    /// Corner handle centers on screen, with the resize mode each one starts.
    pub fn handles_in_view(&self) -> [(DragMode, Point2D); 4] {
        let r = self.rect_in_view();
        [
            (DragMode::ResizeTopLeft, Point2D::new(r.x, r.y)),
            (DragMode::ResizeTopRight, Point2D::new(r.right(), r.y)),
            (DragMode::ResizeBottomLeft, Point2D::new(r.x, r.bottom())),
            (DragMode::ResizeBottomRight, Point2D::new(r.right(), r.bottom())),
        ]
    }

    /// Center lines to draw, when snapping is on and a base is loaded.
    pub fn snap_guides(&self) -> Option<SnapGuides> {
        if !self.settings.snap_enabled {
            return None;
        }
        let base = self.base?;
        let (cx, cy) = base.center();
        let center = self.transform.to_view(Point2D::new(cx, cy));
        let full = PlacementRect::new(0.0, 0.0, base.width as f64, base.height as f64);
        Some(SnapGuides {
            vertical_x: center.x,
            horizontal_y: center.y,
            base_in_view: self.transform.rect_to_view(&full),
        })
    }

    /// Which gesture a press at `pointer` would start.
    ///
    /// Handles win over the body; nothing is hit before an overlay is loaded.
    pub fn hit_test(&self, pointer: Point2D) -> DragMode {
        if self.overlay.is_none() {
            return DragMode::None;
        }

        for (mode, handle) in self.handles_in_view() {
            if (pointer.x - handle.x).abs() < HANDLE_GRAB_RADIUS
                && (pointer.y - handle.y).abs() < HANDLE_GRAB_RADIUS
            {
                return mode;
            }
        }

        if self.rect_in_view().contains(pointer.x, pointer.y) {
            DragMode::Move
        } else {
            DragMode::None
        }
    }

    // ── Drag gestures ─────────────────────────────────────────────────

    /// Start a gesture. Editing gestures need an overlay; panning does not.
    /// Returns whether a gesture is now active.
    pub fn begin_drag(&mut self, mode: DragMode, pointer: Point2D) -> bool {
        if mode == DragMode::None || (mode.edits_rect() && self.overlay.is_none()) {
            self.drag = None;
            return false;
        }

        self.drag = Some(DragSession {
            mode,
            last_pointer: pointer,
            start_rect: self.rect,
        });
        self.last_snap = SnapHit::default();
        true
    }

    /// Apply one pointer motion event. Deltas are measured from the previous
    /// event, not from where the gesture began.
    pub fn update_drag(&mut self, pointer: Point2D) -> PlacementRect {
        let Some(mut drag) = self.drag else {
            return self.rect;
        };

        let view_dx = pointer.x - drag.last_pointer.x;
        let view_dy = pointer.y - drag.last_pointer.y;
        drag.last_pointer = pointer;
        self.drag = Some(drag);

        if drag.mode == DragMode::Pan {
            self.transform.pan(view_dx, view_dy);
            return self.rect;
        }

        let scale = self.transform.scale();
        let (dx, dy) = (view_dx / scale, view_dy / scale);

        self.rect = match drag.mode {
            DragMode::Move => self.moved(dx, dy),
            mode => resize(self.rect, mode, dx, dy, self.lock.locked_ratio()),
        };
        self.rect
    }

    /// Finish the gesture. Editing gestures commit one history entry when the
    /// rectangle actually changed; panning never commits.
    pub fn end_drag(&mut self) -> Option<PlacementRect> {
        let drag = self.drag.take()?;
        self.last_snap = SnapHit::default();

        if !drag.mode.edits_rect() {
            return None;
        }

        let finished = self.normalized(self.rect, self.lock.locked_ratio());
        if finished == drag.start_rect {
            self.rect = finished;
            return None;
        }
        Some(self.commit(finished))
    }

    fn moved(&mut self, dx: f64, dy: f64) -> PlacementRect {
        let mut rect = PlacementRect {
            x: self.rect.x + dx,
            y: self.rect.y + dy,
            ..self.rect
        };

        if let Some(base) = self.base {
            if self.settings.snap_enabled {
                let threshold = self.settings.snap_threshold_px / self.transform.scale();
                let (snapped, hit) = snap_to_center(rect, base, threshold);
                rect = snapped;
                self.last_snap = hit;
            }
            rect = rect.clamped_into(base);
        }
        rect
    }

    // ── Committed edits ───────────────────────────────────────────────

    /// Replace the rectangle from numeric entry.
    ///
    /// Width and height must be positive. The position is clamped to the base
    /// for the new size, and a locked ratio is re-captured from the entry.
    pub fn manual_set(&mut self, x: f64, y: f64, w: f64, h: f64) -> PostermillResult<PlacementRect> {
        if !(w > 0.0 && h > 0.0) || !w.is_finite() || !h.is_finite() {
            return Err(PostermillError::input(
                "Width and height must be greater than zero",
            ));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(PostermillError::input("Position must be a finite number"));
        }

        let (w, h) = (w.max(MIN_SIZE), h.max(MIN_SIZE));
        if self.lock.enabled {
            self.lock.ratio = w / h;
        }

        let rect = self.normalized(PlacementRect::new(x, y, w, h), self.lock.locked_ratio());
        Ok(self.commit(rect))
    }

    /// [`manual_set`](Self::manual_set) from an already-parsed entry.
    pub fn apply_entry(&mut self, entry: ManualEntry) -> PostermillResult<PlacementRect> {
        self.manual_set(entry.x, entry.y, entry.w, entry.h)
    }

    /// Change one dimension. Under the aspect lock the other dimension is
    /// derived from the cached ratio, so callers get both values back at once.
    pub fn set_dimension(&mut self, dimension: Dimension) -> PostermillResult<PlacementRect> {
        let value = match dimension {
            Dimension::Width(v) | Dimension::Height(v) => v,
        };
        if !(value > 0.0) || !value.is_finite() {
            return Err(PostermillError::input(
                "Width and height must be greater than zero",
            ));
        }

        let ratio = self.lock.locked_ratio();
        let (w, h) = match (dimension, ratio) {
            (Dimension::Width(w), Some(r)) => (w, w / r),
            (Dimension::Height(h), Some(r)) => (h * r, h),
            (Dimension::Width(w), None) => (w, self.rect.h),
            (Dimension::Height(h), None) => (self.rect.w, h),
        };
        let (w, h) = floor_dims(w, h, ratio);

        let rect = PlacementRect::new(self.rect.x, self.rect.y, w, h);
        Ok(self.commit(self.normalized(rect, ratio)))
    }

    /// Center the rectangle on the base.
    pub fn center(&mut self) -> PostermillResult<PlacementRect> {
        let base = self
            .base
            .ok_or_else(|| PostermillError::input("Load a base image first"))?;
        Ok(self.commit(self.rect.centered_on(base)))
    }

    /// Size the rectangle to the overlay's native pixels and re-capture the ratio.
    pub fn reset_to_original(&mut self) -> PostermillResult<PlacementRect> {
        let overlay = self
            .overlay
            .ok_or_else(|| PostermillError::input("Load an overlay image first"))?;

        self.lock.ratio = overlay.aspect_ratio();
        let (w, h) = floor_dims(
            overlay.width as f64,
            overlay.height as f64,
            Some(self.lock.ratio),
        );
        let rect = PlacementRect::new(self.rect.x, self.rect.y, w, h);
        Ok(self.commit(self.normalized(rect, Some(self.lock.ratio))))
    }

    /// Engage or release the aspect lock. Engaging captures the current
    /// rectangle's ratio once an overlay is loaded.
    pub fn toggle_aspect_lock(&mut self, enable: bool) -> AspectLock {
        if enable && self.overlay.is_some() {
            self.lock.ratio = self.rect.aspect_ratio();
        }
        self.lock.enabled = enable;
        self.lock
    }

    pub fn set_snap(&mut self, enabled: bool) {
        self.settings.snap_enabled = enabled;
    }

    pub fn undo(&mut self) -> PostermillResult<PlacementRect> {
        let rect = self
            .history
            .undo()
            .ok_or(PostermillError::HistoryUnavailable { action: "undo" })?;
        self.rect = rect;
        Ok(rect)
    }

    pub fn redo(&mut self) -> PostermillResult<PlacementRect> {
        let rect = self
            .history
            .redo()
            .ok_or(PostermillError::HistoryUnavailable { action: "redo" })?;
        self.rect = rect;
        Ok(rect)
    }

    // ── Internals ─────────────────────────────────────────────────────

    /// Fit inside the base when there is one.
    fn normalized(&self, rect: PlacementRect, locked_ratio: Option<f64>) -> PlacementRect {
        match self.base {
            Some(base) => rect.fit_within(base, locked_ratio),
            None => rect,
        }
    }

    fn commit(&mut self, rect: PlacementRect) -> PlacementRect {
        self.rect = rect;
        self.history.push(rect);
        tracing::debug!(
            x = rect.x,
            y = rect.y,
            w = rect.w,
            h = rect.h,
            depth = self.history.undo_depth(),
            "Placement committed"
        );
        rect
    }
}

impl Default for PlacementSession {
    fn default() -> Self {
        Self::new(PlacementSettings::default())
    }
}

/// Smallest width allowed under a lock, so that the derived height also
/// stays above the floor.
fn min_width(ratio: f64) -> f64 {
    MIN_SIZE.max(MIN_SIZE * ratio)
}

/// Apply the size floor; with a ratio, the floor goes on the width and the
/// height is derived.
fn floor_dims(w: f64, h: f64, ratio: Option<f64>) -> (f64, f64) {
    match ratio {
        Some(r) => {
            let w = w.max(min_width(r));
            (w, w / r)
        }
        None => (w.max(MIN_SIZE), h.max(MIN_SIZE)),
    }
}

/// One resize step for a corner handle, with deltas in image pixels.
///
/// Under a lock the two deltas are averaged along the handle's diagonal and
/// the height follows the width. The opposite corner stays fixed.
pub fn resize(
    rect: PlacementRect,
    mode: DragMode,
    dx: f64,
    dy: f64,
    locked_ratio: Option<f64>,
) -> PlacementRect {
    let PlacementRect { mut x, mut y, w, h } = rect;

    let (new_w, new_h) = match (mode, locked_ratio) {
        (DragMode::ResizeBottomRight, Some(r)) => floor_dims(w + (dx + dy) / 2.0, 0.0, Some(r)),
        (DragMode::ResizeTopLeft, Some(r)) => floor_dims(w - (dx + dy) / 2.0, 0.0, Some(r)),
        (DragMode::ResizeTopRight, Some(r)) => floor_dims(w + (dx - dy) / 2.0, 0.0, Some(r)),
        (DragMode::ResizeBottomLeft, Some(r)) => floor_dims(w + (-dx + dy) / 2.0, 0.0, Some(r)),
        (DragMode::ResizeBottomRight, None) => floor_dims(w + dx, h + dy, None),
        (DragMode::ResizeTopLeft, None) => floor_dims(w - dx, h - dy, None),
        (DragMode::ResizeTopRight, None) => floor_dims(w + dx, h - dy, None),
        (DragMode::ResizeBottomLeft, None) => floor_dims(w - dx, h + dy, None),
        _ => return rect,
    };

    match mode {
        DragMode::ResizeTopLeft => {
            x += w - new_w;
            y += h - new_h;
        }
        DragMode::ResizeTopRight => y += h - new_h,
        DragMode::ResizeBottomLeft => x += w - new_w,
        _ => {}
    }

    PlacementRect::new(x, y, new_w, new_h)
}
