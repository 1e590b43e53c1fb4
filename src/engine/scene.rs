//! Keyed reconciliation of bar visuals: entering / retained / exiting.
//!
//! The scene owns one visual handle per activity id. A layout pass hands it
//! the full target list; the scene diffs that against what is on screen and
//! animates the difference. The renderer only ever reads interpolated
//! geometry, so it stays independent of how the handles came to be.

use iced::Color;
use std::collections::{HashMap, HashSet};

/// Duration of enter/exit/move transitions.
pub const TRANSITION_MS: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
}

impl BarGeometry {
    /// The zero-size state entering bars grow out of and exiting bars
    /// shrink into: anchored at the bar's own left edge and row center.
    fn collapsed(&self) -> BarGeometry {
        BarGeometry {
            x: self.x,
            width: 0.0,
            y: self.y + self.height / 2.0,
            height: 0.0,
        }
    }

    fn lerp(a: &BarGeometry, b: &BarGeometry, t: f64) -> BarGeometry {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        BarGeometry {
            x: mix(a.x, b.x),
            width: mix(a.width, b.width),
            y: mix(a.y, b.y),
            height: mix(a.height, b.height),
        }
    }
}

/// Desired end state for one bar, derived by a layout pass.
#[derive(Debug, Clone)]
pub struct BarTarget {
    pub id: u64,
    pub row: usize,
    pub geometry: BarGeometry,
    pub color: Color,
    pub label: String,
    pub scroll_left: bool,
    pub scroll_right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Active,
    Exiting,
}

/// One on-screen bar with its in-flight transition state.
#[derive(Debug, Clone)]
pub struct BarVisual {
    pub id: u64,
    pub row: usize,
    pub label: String,
    pub color: Color,
    pub phase: Phase,
    pub scroll_left: bool,
    pub scroll_right: bool,
    from: BarGeometry,
    target: BarGeometry,
    from_opacity: f32,
    target_opacity: f32,
    progress: f64,
}

fn ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

impl BarVisual {
    fn entering(target: &BarTarget) -> Self {
        Self {
            id: target.id,
            row: target.row,
            label: target.label.clone(),
            color: target.color,
            phase: Phase::Entering,
            scroll_left: target.scroll_left,
            scroll_right: target.scroll_right,
            from: target.geometry.collapsed(),
            target: target.geometry,
            from_opacity: 0.0,
            target_opacity: 1.0,
            progress: 0.0,
        }
    }

    /// Current interpolated geometry.
    pub fn geometry(&self) -> BarGeometry {
        if self.progress >= 1.0 {
            self.target
        } else {
            BarGeometry::lerp(&self.from, &self.target, ease_out(self.progress))
        }
    }

    pub fn opacity(&self) -> f32 {
        if self.progress >= 1.0 {
            self.target_opacity
        } else {
            let t = ease_out(self.progress) as f32;
            self.from_opacity + (self.target_opacity - self.from_opacity) * t
        }
    }

    pub fn target_geometry(&self) -> BarGeometry {
        self.target
    }

    fn settled(&self) -> bool {
        self.progress >= 1.0
    }

    /// Restart the transition toward `geometry` from wherever the bar
    /// currently is. Supersedes any transition still in flight.
    fn retarget(&mut self, geometry: BarGeometry, opacity: f32) {
        self.from = self.geometry();
        self.from_opacity = self.opacity();
        self.target = geometry;
        self.target_opacity = opacity;
        self.progress = if self.from == self.target && self.from_opacity == self.target_opacity {
            1.0
        } else {
            0.0
        };
    }

    /// Jump to `geometry` with no transition. Used when only the viewport
    /// transform changed and bars merely shift.
    fn warp(&mut self, geometry: BarGeometry) {
        self.from = geometry;
        self.target = geometry;
        self.from_opacity = self.target_opacity;
        self.progress = 1.0;
    }
}

/// Per-pass classification counts, primarily for tests and logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileCounts {
    pub entering: usize,
    pub retained: usize,
    pub exiting: usize,
}

#[derive(Debug, Default)]
pub struct Scene {
    bars: Vec<BarVisual>,
    leaving: Vec<BarVisual>,
}

impl Scene {
    /// Diff the target list against the current handles by id.
    ///
    /// Retained bars keep their handle and transition to the new geometry,
    /// even when only their row index changed; they never re-enter. Exiting
    /// bars collapse and are dropped once their transition finishes.
    /// A duplicate id within one pass keeps its first occurrence.
    pub fn reconcile(&mut self, targets: &[BarTarget]) -> ReconcileCounts {
        let mut counts = ReconcileCounts::default();
        let mut old: HashMap<u64, BarVisual> =
            self.bars.drain(..).map(|bar| (bar.id, bar)).collect();
        let mut seen = HashSet::new();

        for target in targets {
            if !seen.insert(target.id) {
                log::warn!("duplicate activity id {}; keeping the first occurrence", target.id);
                continue;
            }

            if let Some(mut bar) = old.remove(&target.id) {
                counts.retained += 1;
                bar.phase = Phase::Active;
                bar.row = target.row;
                bar.label = target.label.clone();
                bar.color = target.color;
                bar.scroll_left = target.scroll_left;
                bar.scroll_right = target.scroll_right;
                bar.retarget(target.geometry, 1.0);
                self.bars.push(bar);
            } else {
                counts.entering += 1;
                self.bars.push(BarVisual::entering(target));
            }
        }

        for (_, mut bar) in old {
            counts.exiting += 1;
            bar.phase = Phase::Exiting;
            bar.scroll_left = false;
            bar.scroll_right = false;
            let collapsed = bar.target.collapsed();
            bar.retarget(collapsed, 0.0);
            self.leaving.push(bar);
        }

        counts
    }

    /// Update geometry without reclassifying anything.
    ///
    /// Pan/zoom changes the mapping but not the set of bars, so there is no
    /// set difference to compute and no transition to play.
    pub fn reposition(&mut self, targets: &[BarTarget]) {
        let mut by_id: HashMap<u64, &BarTarget> =
            targets.iter().map(|target| (target.id, target)).collect();

        for bar in &mut self.bars {
            if let Some(target) = by_id.remove(&bar.id) {
                bar.scroll_left = target.scroll_left;
                bar.scroll_right = target.scroll_right;
                bar.warp(target.geometry);
            }
        }
    }

    /// Advance transitions by `dt_ms`. Returns true while any bar is still
    /// animating.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        let step = dt_ms / TRANSITION_MS;

        for bar in self.bars.iter_mut().chain(self.leaving.iter_mut()) {
            bar.progress = (bar.progress + step).min(1.0);
        }
        for bar in &mut self.bars {
            if bar.settled() && bar.phase == Phase::Entering {
                bar.phase = Phase::Active;
            }
        }
        self.leaving.retain(|bar| !bar.settled());

        self.is_animating()
    }

    pub fn is_animating(&self) -> bool {
        !self.leaving.is_empty() || self.bars.iter().any(|bar| !bar.settled())
    }

    /// Live bars in row order, then bars still animating out.
    pub fn bars(&self) -> impl Iterator<Item = &BarVisual> {
        self.bars.iter().chain(self.leaving.iter())
    }

    pub fn get(&self, id: u64) -> Option<&BarVisual> {
        self.bars.iter().find(|bar| bar.id == id)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u64, row: usize) -> BarTarget {
        BarTarget {
            id,
            row,
            geometry: BarGeometry {
                x: 10.0 * id as f64,
                width: 40.0,
                y: 30.0 * row as f64,
                height: 24.0,
            },
            color: Color::BLACK,
            label: format!("activity {id}"),
            scroll_left: false,
            scroll_right: false,
        }
    }

    fn targets(ids: &[u64]) -> Vec<BarTarget> {
        ids.iter()
            .enumerate()
            .map(|(row, &id)| target(id, row))
            .collect()
    }

    #[test]
    fn adding_one_to_three_enters_exactly_one() {
        let mut scene = Scene::default();
        scene.reconcile(&targets(&[1, 2, 3]));

        let counts = scene.reconcile(&targets(&[1, 2, 3, 4]));
        assert_eq!(
            counts,
            ReconcileCounts { entering: 1, retained: 3, exiting: 0 }
        );
    }

    #[test]
    fn removing_one_of_four_exits_exactly_one() {
        let mut scene = Scene::default();
        scene.reconcile(&targets(&[1, 2, 3, 4]));

        let counts = scene.reconcile(&targets(&[1, 2, 4]));
        assert_eq!(
            counts,
            ReconcileCounts { entering: 0, retained: 3, exiting: 1 }
        );
        assert!(scene.get(3).is_none());
    }

    #[test]
    fn reordering_moves_rows_without_reclassifying() {
        let mut scene = Scene::default();
        scene.reconcile(&targets(&[1, 2, 3]));
        scene.tick(TRANSITION_MS + 1.0);

        // Insert an earlier activity: every existing id shifts down one row.
        let counts = scene.reconcile(&targets(&[9, 1, 2, 3]));
        assert_eq!(
            counts,
            ReconcileCounts { entering: 1, retained: 3, exiting: 0 }
        );

        for id in [1, 2, 3] {
            let bar = scene.get(id).unwrap();
            assert_eq!(bar.phase, Phase::Active, "id {id} must not re-enter");
            assert_eq!(bar.row, id as usize);
        }
        assert_eq!(scene.get(9).unwrap().phase, Phase::Entering);
    }

    #[test]
    fn entering_bars_start_collapsed_and_grow() {
        let mut scene = Scene::default();
        scene.reconcile(&targets(&[1]));

        let bar = scene.get(1).unwrap();
        assert_eq!(bar.geometry().width, 0.0);
        assert_eq!(bar.opacity(), 0.0);

        scene.tick(TRANSITION_MS);
        let bar = scene.get(1).unwrap();
        assert_eq!(bar.geometry(), bar.target_geometry());
        assert_eq!(bar.opacity(), 1.0);
    }

    #[test]
    fn exiting_bars_linger_until_transition_finishes() {
        let mut scene = Scene::default();
        scene.reconcile(&targets(&[1, 2]));
        scene.tick(TRANSITION_MS + 1.0);

        scene.reconcile(&targets(&[1]));
        assert_eq!(scene.bars().count(), 2);
        assert!(scene.is_animating());

        scene.tick(TRANSITION_MS / 2.0);
        assert_eq!(scene.bars().count(), 2);

        scene.tick(TRANSITION_MS);
        assert_eq!(scene.bars().count(), 1);
        assert!(!scene.is_animating());
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut scene = Scene::default();
        let mut list = targets(&[1, 2]);
        let mut dup = target(1, 5);
        dup.label = "imposter".to_string();
        list.push(dup);

        let counts = scene.reconcile(&list);
        assert_eq!(counts.entering, 2);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(1).unwrap().label, "activity 1");
    }

    #[test]
    fn reposition_warps_without_transitions() {
        let mut scene = Scene::default();
        scene.reconcile(&targets(&[1, 2]));
        scene.tick(TRANSITION_MS + 1.0);

        let mut moved = targets(&[1, 2]);
        for target in &mut moved {
            target.geometry.x += 500.0;
        }
        scene.reposition(&moved);

        assert!(!scene.is_animating());
        assert_eq!(scene.get(1).unwrap().geometry().x, 510.0);
        assert_eq!(scene.get(1).unwrap().phase, Phase::Active);
    }

    #[test]
    fn new_pass_supersedes_running_transition() {
        let mut scene = Scene::default();
        scene.reconcile(&targets(&[1]));
        scene.tick(TRANSITION_MS / 4.0);

        // Retarget mid-flight; the bar keeps animating from where it was.
        let mut moved = targets(&[1]);
        moved[0].geometry.y = 300.0;
        let counts = scene.reconcile(&moved);
        assert_eq!(counts.retained, 1);

        scene.tick(TRANSITION_MS);
        assert_eq!(scene.get(1).unwrap().geometry().y, 300.0);
    }
}
