//! The chart engine: activity collections, viewport state, and the layout
//! pass that keeps the scene consistent with both.
//!
//! Everything here is renderer-agnostic. The canvas programs in
//! `crate::timeline` read the scene and tick lists; they never recompute
//! geometry themselves.

pub mod indicators;
pub mod rows;
pub mod scale;
pub mod scene;
pub mod ticks;

use crate::data::{Activity, ChartConfig, Marker};
use indicators::edge_indicators;
use scale::{Mapping, TimeScale, ViewTransform};
use scene::{BarGeometry, BarTarget, ReconcileCounts, Scene};
use ticks::Tick;

/// Bars never render narrower than this, so zero-length and short
/// activities stay clickable.
pub const MIN_BAR_WIDTH: f64 = 6.0;

/// Height reserved at the bottom of the chart area for the time axis.
pub const AXIS_HEIGHT: f64 = 35.0;

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Notifications emitted toward subscribers on user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ActivityClick(u64),
    LeftIndicatorClick(u64),
    RightIndicatorClick(u64),
}

/// A positioned marker, recomputed every pass.
#[derive(Debug, Clone)]
pub struct MarkerVisual {
    pub id: u64,
    pub x: f64,
    pub label: String,
}

pub struct ChartEngine {
    activities: Vec<Activity>,
    markers: Vec<Marker>,
    width: f64,
    height: f64,
    scale: TimeScale,
    view: ViewTransform,
    scene: Scene,
    marker_visuals: Vec<MarkerVisual>,
    view_ticks: Vec<Tick>,
    overview: (String, String),
    selected: Option<u64>,
    subscribers: Vec<Box<dyn Fn(&Notice)>>,
    pending: Vec<Notice>,
    last_counts: ReconcileCounts,
}

impl ChartEngine {
    pub fn new(config: &ChartConfig) -> Self {
        let now = now_ms();
        let scale = TimeScale::new(0, 0, now, config.width);
        let mut engine = Self {
            activities: Vec::new(),
            markers: Vec::new(),
            width: config.width,
            height: config.height,
            scale,
            view: ViewTransform::default(),
            scene: Scene::default(),
            marker_visuals: Vec::new(),
            view_ticks: Vec::new(),
            overview: (String::new(), String::new()),
            selected: None,
            subscribers: Vec::new(),
            pending: Vec::new(),
            last_counts: ReconcileCounts::default(),
        };
        engine.layout_pass();
        engine
    }

    // ---- mutation entry points -------------------------------------------

    /// Add activities; runs one synchronous layout pass.
    pub fn add(&mut self, items: impl IntoIterator<Item = Activity>) {
        self.activities.extend(items);
        self.layout_pass();
    }

    pub fn add_markers(&mut self, items: impl IntoIterator<Item = Marker>) {
        self.markers.extend(items);
        self.layout_pass();
    }

    pub fn remove_by_id(&mut self, id: u64) {
        self.remove_where(|activity| activity.id == id);
    }

    pub fn remove_where(&mut self, predicate: impl Fn(&Activity) -> bool) {
        self.activities.retain(|activity| !predicate(activity));
        if self.selected.is_some_and(|id| self.activity(id).is_none()) {
            self.selected = None;
        }
        self.layout_pass();
    }

    /// Replace the activity with the same id, or add it if unknown.
    pub fn update(&mut self, item: Activity) {
        match self.activities.iter_mut().find(|a| a.id == item.id) {
            Some(existing) => *existing = item,
            None => self.activities.push(item),
        }
        self.layout_pass();
    }

    /// Caller-triggered re-render with new viewport dimensions.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width > 0.0 {
            self.width = width;
        }
        if height > 0.0 {
            self.height = height;
        }
        self.layout_pass();
    }

    // ---- viewport gestures -----------------------------------------------

    /// Pan by `dx` screen pixels. Repositions only; the bar set is unchanged.
    pub fn pan(&mut self, dx: f64) {
        self.view.pan_by(dx);
        self.reposition_pass_at(now_ms());
    }

    /// Anchored zoom at `anchor_x`; the factor is clamped to the zoom bounds.
    pub fn zoom(&mut self, factor: f64, anchor_x: f64) {
        self.view.zoom_at(factor, anchor_x);
        self.reposition_pass_at(now_ms());
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
        self.reposition_pass_at(now_ms());
    }

    /// Advance enter/exit/move transitions. Returns true while animating.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        self.scene.tick(dt_ms)
    }

    // ---- interaction -----------------------------------------------------

    pub fn click_activity(&mut self, id: u64) {
        self.selected = Some(id);
        self.emit(Notice::ActivityClick(id));
    }

    /// Left indicator click also focuses the bar: zoom so it spans most of
    /// the viewport, centered.
    pub fn click_left_indicator(&mut self, id: u64) {
        self.emit(Notice::LeftIndicatorClick(id));
        if let Some(activity) = self.activity(id).cloned() {
            let now = now_ms();
            let left = self.scale.to_pixel(activity.begin_ms);
            let right = self.scale.to_pixel(activity.effective_end(now));
            self.view.focus_on(left, right, self.width);
            self.reposition_pass_at(now);
        }
    }

    pub fn click_right_indicator(&mut self, id: u64) {
        self.emit(Notice::RightIndicatorClick(id));
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&Notice) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Notices accumulated since the last drain, for callers that poll
    /// instead of subscribing.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    fn emit(&mut self, notice: Notice) {
        for subscriber in &self.subscribers {
            subscriber(&notice);
        }
        self.pending.push(notice);
    }

    // ---- layout ----------------------------------------------------------

    pub fn layout_pass(&mut self) {
        self.layout_pass_at(now_ms());
    }

    /// Full pass: recompute the domain (preserving pan/zoom), re-derive all
    /// bands and bar geometry, reconcile the scene, refresh markers, edge
    /// indicators and both axes.
    pub fn layout_pass_at(&mut self, now_ms: i64) {
        self.rebuild_scale(now_ms);
        let targets = self.bar_targets(now_ms);
        self.last_counts = self.scene.reconcile(&targets);
        self.refresh_markers();
        self.refresh_ticks();
        self.overview = ticks::overview_labels(&self.scale);
    }

    /// Transform-only pass: no reconciliation, no transitions, and the
    /// overview axis keeps its labels (it reflects the data domain).
    fn reposition_pass_at(&mut self, now_ms: i64) {
        let targets = self.bar_targets(now_ms);
        self.scene.reposition(&targets);
        self.refresh_markers();
        self.refresh_ticks();
    }

    fn rebuild_scale(&mut self, now_ms: i64) {
        let mut min_ms = i64::MAX;
        let mut max_ms = i64::MIN;
        for activity in &self.activities {
            min_ms = min_ms.min(activity.begin_ms);
            max_ms = max_ms.max(activity.effective_end(now_ms));
        }
        // The view transform is intentionally left alone: only the base
        // mapping is replaced when the data domain moves.
        self.scale = TimeScale::new(min_ms, max_ms, now_ms, self.width);
    }

    fn sorted_activities(&self) -> Vec<&Activity> {
        let mut sorted: Vec<&Activity> = self.activities.iter().collect();
        sorted.sort_by_key(|activity| activity.begin_ms);
        sorted
    }

    fn bar_targets(&self, now_ms: i64) -> Vec<BarTarget> {
        let mapping = Mapping::new(&self.scale, &self.view);
        let sorted = self.sorted_activities();
        let count = sorted.len();
        let rows_height = (self.height - AXIS_HEIGHT).max(0.0);

        sorted
            .into_iter()
            .enumerate()
            .map(|(row, activity)| {
                let left = mapping.to_pixel(activity.begin_ms);
                let right = mapping.to_pixel(activity.effective_end(now_ms));
                let width = (right - left).max(MIN_BAR_WIDTH);
                let band = rows::band(row, count, rows_height);
                let edges = edge_indicators(left, left + width, self.width);

                BarTarget {
                    id: activity.id,
                    row,
                    geometry: BarGeometry {
                        x: left,
                        width,
                        y: band.y,
                        height: band.height,
                    },
                    color: activity.color,
                    label: activity.label.clone(),
                    scroll_left: edges.left,
                    scroll_right: edges.right,
                }
            })
            .collect()
    }

    fn refresh_markers(&mut self) {
        let mapping = Mapping::new(&self.scale, &self.view);
        self.marker_visuals = self
            .markers
            .iter()
            .map(|marker| MarkerVisual {
                id: marker.id,
                x: mapping.to_pixel(marker.at_ms),
                label: marker.label.clone(),
            })
            .collect();
    }

    fn refresh_ticks(&mut self) {
        let mapping = Mapping::new(&self.scale, &self.view);
        self.view_ticks = ticks::view_ticks(&mapping, self.width);
    }

    // ---- read access for the renderer and tests --------------------------

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn markers(&self) -> &[MarkerVisual] {
        &self.marker_visuals
    }

    pub fn view_ticks(&self) -> &[Tick] {
        &self.view_ticks
    }

    pub fn overview_labels(&self) -> (&str, &str) {
        (&self.overview.0, &self.overview.1)
    }

    pub fn mapping(&self) -> Mapping<'_> {
        Mapping::new(&self.scale, &self.view)
    }

    pub fn scale(&self) -> &TimeScale {
        &self.scale
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn activity(&self, id: u64) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == id)
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn selected(&self) -> Option<&Activity> {
        self.selected.and_then(|id| self.activity(id))
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn last_counts(&self) -> ReconcileCounts {
        self.last_counts
    }
}
