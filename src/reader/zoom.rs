//! Zoom and pan state for the page view
//!
//! Zoom is changed in fixed wheel steps or continuously by pinching. Panning
//! only means something while zoomed in, so the pan offset is dropped as soon
//! as the factor falls back to 100% or below.

use std::time::{Duration, Instant};

use super::types::{PanOffset, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchAnchor {
    distance: f32,
    factor: f32,
}

/// Zoom and pan state for one reader session
#[derive(Debug)]
pub struct Zoom {
    /// Current zoom factor (1.0 = 100%)
    factor: f32,

    /// Image displacement while zoomed, unbounded
    pan: PanOffset,

    /// Pointer position minus pan offset at drag start
    pan_anchor: Option<Point>,

    pinch: Option<PinchAnchor>,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            factor: 1.0,
            pan: PanOffset::ZERO,
            pan_anchor: None,
            pinch: None,
        }
    }
}

impl Zoom {
    /// Minimum allowed zoom factor
    pub const MIN: f32 = 0.5;
    /// Maximum allowed zoom factor
    pub const MAX: f32 = 3.0;
    /// Change per wheel notch
    pub const WHEEL_STEP: f32 = 0.1;

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn pan(&self) -> PanOffset {
        self.pan
    }

    pub fn is_zoomed(&self) -> bool {
        self.factor > 1.0
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Rounded percentage for the on-screen indicator.
    pub fn percent(&self) -> u32 {
        (self.factor * 100.0).round() as u32
    }

    /// Clamp factor to valid range, handling NaN/Inf
    pub fn clamp_factor(factor: f32) -> f32 {
        if !factor.is_finite() {
            1.0
        } else {
            factor.clamp(Self::MIN, Self::MAX)
        }
    }

    /// Set the zoom factor. Returns true if it changed.
    pub fn set_factor(&mut self, factor: f32) -> bool {
        let factor = Self::clamp_factor(factor);
        if factor == self.factor {
            return false;
        }
        self.factor = factor;
        if !self.is_zoomed() {
            self.pan = PanOffset::ZERO;
            self.pan_anchor = None;
        }
        true
    }

    /// Apply one wheel notch: scrolling down (positive delta) zooms out.
    pub fn wheel(&mut self, delta: f32) -> bool {
        if delta == 0.0 || !delta.is_finite() {
            return false;
        }
        let step = if delta > 0.0 {
            -Self::WHEEL_STEP
        } else {
            Self::WHEEL_STEP
        };
        // Keep wheel steps on the 0.1 grid so they land exactly on 1.0.
        let next = ((self.factor + step) * 100.0).round() / 100.0;
        self.set_factor(next)
    }

    pub fn reset(&mut self) -> bool {
        self.pinch = None;
        self.set_factor(1.0)
    }

    /// Record the two-finger distance and factor at the start of a pinch.
    pub fn pinch_start(&mut self, distance: f32) {
        self.pinch = Some(PinchAnchor {
            distance,
            factor: self.factor,
        });
    }

    /// Scale the factor recorded at pinch start by the distance ratio.
    pub fn pinch_update(&mut self, distance: f32) -> bool {
        let Some(anchor) = self.pinch else {
            return false;
        };
        if anchor.distance <= 0.0 || !distance.is_finite() {
            return false;
        }
        self.set_factor(anchor.factor * (distance / anchor.distance))
    }

    pub fn pinch_end(&mut self) {
        self.pinch = None;
    }

    /// Begin a drag. Ignored unless zoomed in.
    pub fn pan_start(&mut self, at: Point) -> bool {
        if !self.is_zoomed() {
            return false;
        }
        self.pan_anchor = Some(Point::new(at.x - self.pan.x, at.y - self.pan.y));
        true
    }

    /// Move the image with the pointer. No bounds are applied.
    pub fn pan_move(&mut self, to: Point) -> bool {
        let Some(anchor) = self.pan_anchor else {
            return false;
        };
        self.pan = PanOffset::new(to.x - anchor.x, to.y - anchor.y);
        true
    }

    pub fn pan_end(&mut self) {
        self.pan_anchor = None;
    }
}

/// Transient "150%" badge shown after a zoom change.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomIndicator {
    pub text: String,
    pub expires_at: Instant,
}

impl ZoomIndicator {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(1000);

    pub fn new(zoom: &Zoom, now: Instant, duration: Duration) -> Self {
        Self {
            text: format!("{}%", zoom.percent()),
            expires_at: now + duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_is_clamped_at_both_ends() {
        let mut zoom = Zoom::default();
        for _ in 0..50 {
            zoom.wheel(-1.0);
        }
        assert_eq!(zoom.factor(), Zoom::MAX);
        assert!(!zoom.wheel(-1.0));

        for _ in 0..50 {
            zoom.wheel(1.0);
        }
        assert_eq!(zoom.factor(), Zoom::MIN);
    }

    #[test]
    fn pinch_ratio_is_clamped() {
        let mut zoom = Zoom::default();
        zoom.pinch_start(100.0);
        zoom.pinch_update(1000.0);
        assert_eq!(zoom.factor(), 3.0);
        zoom.pinch_update(10.0);
        assert_eq!(zoom.factor(), 0.5);
        zoom.pinch_update(150.0);
        assert!((zoom.factor() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn pinch_scales_from_factor_at_start() {
        let mut zoom = Zoom::default();
        zoom.set_factor(2.0);
        zoom.pinch_start(200.0);
        zoom.pinch_update(100.0);
        assert_eq!(zoom.factor(), 1.0);
    }

    #[test]
    fn returning_to_one_resets_pan() {
        let mut zoom = Zoom::default();
        zoom.set_factor(1.2);
        assert!(zoom.pan_start(Point::new(10.0, 10.0)));
        zoom.pan_move(Point::new(40.0, -20.0));
        zoom.pan_end();
        assert_eq!(zoom.pan(), PanOffset::new(30.0, -30.0));

        zoom.wheel(1.0);
        assert!(!zoom.pan().is_zero());
        zoom.wheel(1.0);
        assert_eq!(zoom.factor(), 1.0);
        assert_eq!(zoom.pan(), PanOffset::ZERO);
    }

    #[test]
    fn pan_accumulates_across_drags_without_bounds() {
        let mut zoom = Zoom::default();
        zoom.set_factor(2.0);
        zoom.pan_start(Point::new(0.0, 0.0));
        zoom.pan_move(Point::new(5000.0, 0.0));
        zoom.pan_end();
        zoom.pan_start(Point::new(100.0, 100.0));
        zoom.pan_move(Point::new(150.0, 90.0));
        assert_eq!(zoom.pan(), PanOffset::new(5050.0, -10.0));
    }

    #[test]
    fn pan_is_inactive_at_normal_zoom() {
        let mut zoom = Zoom::default();
        assert!(!zoom.pan_start(Point::new(1.0, 1.0)));
        assert!(!zoom.pan_move(Point::new(9.0, 9.0)));
        assert_eq!(zoom.pan(), PanOffset::ZERO);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut zoom = Zoom::default();
        zoom.set_factor(2.0);
        zoom.set_factor(f32::NAN);
        assert_eq!(zoom.factor(), 1.0);
        assert!(!zoom.wheel(f32::INFINITY));
    }

    #[test]
    fn indicator_expires() {
        let now = Instant::now();
        let mut zoom = Zoom::default();
        zoom.set_factor(1.5);
        let indicator = ZoomIndicator::new(&zoom, now, ZoomIndicator::DEFAULT_DURATION);
        assert_eq!(indicator.text, "150%");
        assert!(!indicator.is_expired(now + Duration::from_millis(999)));
        assert!(indicator.is_expired(now + Duration::from_millis(1000)));
    }
}
