//! Time-to-pixel mapping and the pan/zoom transform applied on top of it.

/// Horizontal margin left free of bars on both viewport edges.
pub const MARGIN: f64 = 10.0;

/// Zoom factor bounds. Gestures outside this range are clamped, not rejected.
pub const MIN_ZOOM: f64 = 0.6;
pub const MAX_ZOOM: f64 = 1000.0;

/// Fraction of the viewport a bar occupies after a focus transition.
pub const FOCUS_FRACTION: f64 = 0.8;

/// Fallback domain width when the data domain is empty or degenerate.
pub const SYNTHETIC_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Linear mapping between epoch-millisecond instants and pixel positions.
///
/// The domain is the data time range, the range is the pixel extent inside
/// the viewport margins. Pan/zoom is deliberately not part of this type; it
/// lives in [`ViewTransform`] so the domain can be recomputed on data
/// mutation without disturbing the user's current view.
#[derive(Debug, Clone, Copy)]
pub struct TimeScale {
    domain: (i64, i64),
    range: (f64, f64),
}

impl TimeScale {
    /// Build a scale for `width` pixels over `[min_ms, max_ms]`.
    ///
    /// A degenerate domain (no activities, or a single distinct instant) is
    /// replaced by a synthetic 24-hour window ending at `now_ms` so the
    /// mapping never divides by zero.
    pub fn new(min_ms: i64, max_ms: i64, now_ms: i64, width: f64) -> Self {
        let domain = if min_ms < max_ms {
            (min_ms, max_ms)
        } else {
            (now_ms - SYNTHETIC_WINDOW_MS, now_ms)
        };

        Self {
            domain,
            range: Self::range_for(width),
        }
    }

    fn range_for(width: f64) -> (f64, f64) {
        let right = (width - MARGIN).max(MARGIN + 1.0);
        (MARGIN, right)
    }

    pub fn domain(&self) -> (i64, i64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map an instant to its base (untransformed) pixel position.
    pub fn to_pixel(&self, ms: i64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (ms - d0) as f64 / (d1 - d0) as f64 * (r1 - r0)
    }

    /// Inverse of [`TimeScale::to_pixel`], rounded to the nearest millisecond.
    pub fn to_instant(&self, x: f64) -> i64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        d0 + ((x - r0) / (r1 - r0) * (d1 - d0) as f64).round() as i64
    }

    /// Milliseconds represented by one base pixel.
    pub fn ms_per_pixel(&self) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        (d1 - d0) as f64 / (r1 - r0)
    }
}

/// User-driven pan offset and zoom factor composed on top of a [`TimeScale`].
///
/// Screen position of a base pixel `x` is `x * zoom + pan`.
#[derive(Debug, Clone, Copy)]
pub struct ViewTransform {
    pan: f64,
    zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { pan: 0.0, zoom: 1.0 }
    }
}

impl ViewTransform {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn is_identity(&self) -> bool {
        self.pan == 0.0 && self.zoom == 1.0
    }

    pub fn pan_by(&mut self, dx: f64) {
        self.pan += dx;
    }

    /// Scale by `factor` keeping the screen position `anchor_x` stationary.
    ///
    /// The resulting zoom level is clamped to `[MIN_ZOOM, MAX_ZOOM]`; the pan
    /// offset is derived from the zoom that was actually applied, so the
    /// anchor invariant holds even when the clamp kicks in.
    pub fn zoom_at(&mut self, factor: f64, anchor_x: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let target = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let applied = target / self.zoom;
        self.pan = anchor_x - (anchor_x - self.pan) * applied;
        self.zoom = target;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// One-shot transform that makes the bar spanning `[left_px, right_px]`
    /// (base pixels) occupy [`FOCUS_FRACTION`] of `width`, centered.
    pub fn focus_on(&mut self, left_px: f64, right_px: f64, width: f64) {
        let span = (right_px - left_px).max(1.0);
        self.zoom = (FOCUS_FRACTION * width / span).clamp(MIN_ZOOM, MAX_ZOOM);
        let center = (left_px + right_px) / 2.0;
        self.pan = width / 2.0 - center * self.zoom;
    }

    /// Transformed screen position of a base pixel.
    pub fn apply(&self, x: f64) -> f64 {
        x * self.zoom + self.pan
    }

    /// Base pixel for a transformed screen position.
    pub fn unapply(&self, x: f64) -> f64 {
        (x - self.pan) / self.zoom
    }
}

/// The effective screen mapping: scale and transform composed.
#[derive(Debug, Clone, Copy)]
pub struct Mapping<'a> {
    pub scale: &'a TimeScale,
    pub view: &'a ViewTransform,
}

impl<'a> Mapping<'a> {
    pub fn new(scale: &'a TimeScale, view: &'a ViewTransform) -> Self {
        Self { scale, view }
    }

    pub fn to_pixel(&self, ms: i64) -> f64 {
        self.view.apply(self.scale.to_pixel(ms))
    }

    pub fn to_instant(&self, x: f64) -> i64 {
        self.scale.to_instant(self.view.unapply(x))
    }

    /// Milliseconds represented by one screen pixel at the current zoom.
    pub fn ms_per_pixel(&self) -> f64 {
        self.scale.ms_per_pixel() / self.view.zoom()
    }

    /// Instants visible in `[0, width]` of the viewport.
    pub fn visible_range(&self, width: f64) -> (i64, i64) {
        (self.to_instant(0.0), self.to_instant(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 60 * 60 * 1000;

    fn scale() -> TimeScale {
        TimeScale::new(0, 10 * HOUR, 10 * HOUR, 800.0)
    }

    #[test]
    fn pixel_mapping_is_monotonic() {
        let scale = scale();
        let mut view = ViewTransform::default();
        view.zoom_at(3.0, 250.0);
        view.pan_by(-120.0);
        let mapping = Mapping::new(&scale, &view);

        let mut prev = f64::NEG_INFINITY;
        for hour in 0..=10 {
            let x = mapping.to_pixel(hour * HOUR);
            assert!(x > prev, "hour {hour} mapped to {x} after {prev}");
            prev = x;
        }
    }

    #[test]
    fn round_trip_within_pixel_resolution() {
        let scale = scale();
        let view = ViewTransform::default();
        let mapping = Mapping::new(&scale, &view);

        let tolerance = mapping.ms_per_pixel().ceil() as i64;
        for ms in [0, 1, HOUR, 3 * HOUR + 17, 10 * HOUR] {
            let back = mapping.to_instant(mapping.to_pixel(ms));
            assert!(
                (back - ms).abs() <= tolerance,
                "round trip of {ms} gave {back} (tolerance {tolerance})"
            );
        }
    }

    #[test]
    fn degenerate_domain_becomes_synthetic_window() {
        let now = 1_700_000_000_000;
        let empty = TimeScale::new(i64::MAX, i64::MIN, now, 800.0);
        assert_eq!(empty.domain(), (now - SYNTHETIC_WINDOW_MS, now));

        let single = TimeScale::new(now, now, now, 800.0);
        assert_eq!(single.domain(), (now - SYNTHETIC_WINDOW_MS, now));
        assert!(single.ms_per_pixel().is_finite());
    }

    #[test]
    fn anchored_zoom_keeps_anchor_fixed() {
        let scale = scale();
        let mut view = ViewTransform::default();

        let before = Mapping::new(&scale, &view).to_instant(400.0);
        view.zoom_at(2.0, 400.0);
        let after = Mapping::new(&scale, &view).to_pixel(before);
        assert!(
            (after - 400.0).abs() <= 1.0,
            "instant under the anchor moved to {after}"
        );
    }

    #[test]
    fn anchor_holds_even_when_zoom_clamps() {
        let scale = scale();
        let mut view = ViewTransform::default();
        view.zoom_at(0.5, 100.0);
        assert_eq!(view.zoom(), MIN_ZOOM);

        let before = Mapping::new(&scale, &view).to_instant(100.0);
        view.zoom_at(1.0e9, 100.0);
        assert_eq!(view.zoom(), MAX_ZOOM);
        let after = Mapping::new(&scale, &view).to_pixel(before);
        assert!((after - 100.0).abs() <= 1.0);
    }

    #[test]
    fn zoom_ignores_non_positive_factors() {
        let mut view = ViewTransform::default();
        view.zoom_at(0.0, 10.0);
        view.zoom_at(-3.0, 10.0);
        view.zoom_at(f64::NAN, 10.0);
        assert!(view.is_identity());
    }

    #[test]
    fn focus_on_centers_bar_at_focus_fraction() {
        let mut view = ViewTransform::default();
        view.focus_on(100.0, 300.0, 1000.0);

        let left = view.apply(100.0);
        let right = view.apply(300.0);
        assert!((right - left - FOCUS_FRACTION * 1000.0).abs() < 0.5);
        assert!(((left + right) / 2.0 - 500.0).abs() < 0.5);
    }

    #[test]
    fn focus_on_respects_zoom_bounds() {
        let mut view = ViewTransform::default();
        // A 1 px bar would need a zoom of 800, which fits; a sub-pixel span
        // is widened to 1 px first, so the clamp still applies.
        view.focus_on(10.0, 10.2, 1_000_000.0);
        assert_eq!(view.zoom(), MAX_ZOOM);
    }

    #[test]
    fn reset_restores_identity() {
        let mut view = ViewTransform::default();
        view.zoom_at(4.0, 200.0);
        view.pan_by(55.0);
        view.reset();
        assert!(view.is_identity());
    }
}
