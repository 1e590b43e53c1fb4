//! Off-screen indicators: which side of the viewport a bar scrolled past.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeIndicators {
    pub left: bool,
    pub right: bool,
}

/// Classify a bar by its transformed pixel edges.
///
/// Purely a function of current geometry; callers recompute this after every
/// layout pass and every transform change instead of toggling stored state.
pub fn edge_indicators(left_px: f64, right_px: f64, viewport_width: f64) -> EdgeIndicators {
    EdgeIndicators {
        left: right_px <= 0.0,
        right: left_px >= viewport_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fully_left_shows_only_left_indicator() {
        let ind = edge_indicators(-120.0, -50.0, 800.0);
        assert_eq!(ind, EdgeIndicators { left: true, right: false });
    }

    #[test]
    fn bar_fully_right_shows_only_right_indicator() {
        let ind = edge_indicators(850.0, 920.0, 800.0);
        assert_eq!(ind, EdgeIndicators { left: false, right: true });
    }

    #[test]
    fn visible_bar_shows_neither() {
        assert_eq!(edge_indicators(100.0, 300.0, 800.0), EdgeIndicators::default());
        // Partially visible bars count as visible.
        assert_eq!(edge_indicators(-40.0, 10.0, 800.0), EdgeIndicators::default());
        assert_eq!(edge_indicators(790.0, 900.0, 800.0), EdgeIndicators::default());
    }

    #[test]
    fn edge_touching_bars_use_closed_comparison() {
        assert!(edge_indicators(-60.0, 0.0, 800.0).left);
        assert!(edge_indicators(800.0, 860.0, 800.0).right);
    }
}
