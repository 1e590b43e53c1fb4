//! Axis tick intervals and labels for wall-clock time.

use super::scale::{Mapping, TimeScale};
use chrono::{DateTime, Utc};

/// Target pixel spacing between adjacent ticks.
pub const TICK_PIXEL_INTERVAL: f64 = 90.0;

const SECOND_MS: i64 = 1000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const YEAR_MS: i64 = 365 * DAY_MS;

/// Calendar-aware ladder of tick steps, finest first.
const STEPS_MS: &[i64] = &[
    SECOND_MS,
    2 * SECOND_MS,
    5 * SECOND_MS,
    10 * SECOND_MS,
    15 * SECOND_MS,
    30 * SECOND_MS,
    MINUTE_MS,
    2 * MINUTE_MS,
    5 * MINUTE_MS,
    10 * MINUTE_MS,
    15 * MINUTE_MS,
    30 * MINUTE_MS,
    HOUR_MS,
    2 * HOUR_MS,
    3 * HOUR_MS,
    6 * HOUR_MS,
    12 * HOUR_MS,
    DAY_MS,
    2 * DAY_MS,
    7 * DAY_MS,
    14 * DAY_MS,
    30 * DAY_MS,
    90 * DAY_MS,
    182 * DAY_MS,
    YEAR_MS,
];

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub x: f64,
    pub label: String,
}

/// Smallest ladder step that keeps ticks at least [`TICK_PIXEL_INTERVAL`]
/// pixels apart. Beyond one year the step grows in 1/2/5 multiples of a year.
pub fn tick_step(ms_per_pixel: f64) -> i64 {
    let target = TICK_PIXEL_INTERVAL * ms_per_pixel;
    if !target.is_finite() || target <= 0.0 {
        return SECOND_MS;
    }

    if let Some(step) = STEPS_MS.iter().copied().find(|&step| step as f64 >= target) {
        return step;
    }

    let years = target / YEAR_MS as f64;
    let log10 = years.log10().floor();
    let base = 10.0f64.powf(log10);
    let ratio = years / base;
    let nice_years = if ratio <= 1.0 {
        base
    } else if ratio <= 2.0 {
        base * 2.0
    } else if ratio <= 5.0 {
        base * 5.0
    } else {
        base * 10.0
    };
    (nice_years * YEAR_MS as f64) as i64
}

/// Label appropriate for the magnitude of `step_ms`.
pub fn format_tick(ms: i64, step_ms: i64) -> String {
    let Some(time) = DateTime::<Utc>::from_timestamp_millis(ms) else {
        return ms.to_string();
    };

    if step_ms < MINUTE_MS {
        time.format("%H:%M:%S").to_string()
    } else if step_ms < DAY_MS {
        time.format("%H:%M").to_string()
    } else if step_ms < 30 * DAY_MS {
        time.format("%b %d").to_string()
    } else {
        time.format("%b %Y").to_string()
    }
}

/// Long label used by the overview axis for the domain endpoints.
pub fn format_long(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

/// Ticks for the visible part of the composed mapping.
///
/// The first tick snaps to a step boundary at or before the left viewport
/// edge; generation stops past the right edge.
pub fn view_ticks(mapping: &Mapping<'_>, width: f64) -> Vec<Tick> {
    let mut ticks = Vec::new();
    if width <= 0.0 {
        return ticks;
    }

    let step = tick_step(mapping.ms_per_pixel());
    let (min_ms, _) = mapping.visible_range(width);
    let mut ms = min_ms.div_euclid(step) * step;

    while ticks.len() < 256 {
        let x = mapping.to_pixel(ms);
        if x > width {
            break;
        }
        if x >= 0.0 {
            ticks.push(Tick {
                x,
                label: format_tick(ms, step),
            });
        }
        ms = match ms.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }

    ticks
}

/// The overview axis: exactly two long labels for the data domain itself.
///
/// Reflects the domain, not the viewport transform, so it only changes on
/// data mutation.
pub fn overview_labels(scale: &TimeScale) -> (String, String) {
    let (min_ms, max_ms) = scale.domain();
    (format_long(min_ms), format_long(max_ms))
}
