//! Vertical row banding: activity index -> pixel band, independent of time.

/// Fraction of each row step left empty between adjacent bands.
pub const PADDING_FRACTION: f64 = 0.05;

/// Bands never shrink below this height, regardless of row count.
pub const MIN_BAND_HEIGHT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub y: f64,
    pub height: f64,
}

/// Compute the band for row `index` out of `count` rows in `height` pixels.
///
/// Pure function of its inputs: the reconciler re-derives every band on each
/// pass, so identical `(count, height)` must always produce identical bands.
/// Edges are rounded to whole pixels.
pub fn band(index: usize, count: usize, height: f64) -> Band {
    if count == 0 || height <= 0.0 {
        return Band { y: 0.0, height: MIN_BAND_HEIGHT };
    }

    let step = height / count as f64;
    let band_height = (step * (1.0 - PADDING_FRACTION)).round().max(MIN_BAND_HEIGHT);

    Band {
        y: (index as f64 * step).round(),
        height: band_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_deterministic() {
        for index in 0..7 {
            assert_eq!(band(index, 7, 543.0), band(index, 7, 543.0));
        }
    }

    #[test]
    fn bands_are_rounded_and_padded() {
        let count = 6;
        let height = 500.0;
        for index in 0..count {
            let band = band(index, count, height);
            assert_eq!(band.y, band.y.round());
            assert_eq!(band.height, band.height.round());
            // The padding gap stays between consecutive bands.
            assert!(band.height < height / count as f64);
        }
    }

    #[test]
    fn bands_do_not_overlap() {
        let count = 9;
        let height = 400.0;
        for index in 1..count {
            let prev = band(index - 1, count, height);
            let cur = band(index, count, height);
            assert!(prev.y + prev.height <= cur.y + 1.0);
        }
    }

    #[test]
    fn tiny_viewport_keeps_minimum_band_height() {
        let band = band(40, 50, 60.0);
        assert_eq!(band.height, MIN_BAND_HEIGHT);
    }

    #[test]
    fn empty_row_set_yields_a_usable_band() {
        let band = band(0, 0, 300.0);
        assert!(band.height >= MIN_BAND_HEIGHT);
    }
}
