//! Sensor reading heuristics.
//!
//! Firmware revisions of the same hardware family disagree on the scale a
//! reading is reported at: centi-degrees on one, deci-degrees on the next.
//! The functions here pick the scale from the magnitude of the reading
//! itself. Thresholds, retry order and boundary behavior are validated
//! against deployed hardware; do not tune them.

/// Default divisor for centi-scaled readings.
pub const DEFAULT_DIVISOR: f64 = 100.0;

/// Default divisor applied to battery readings no other branch claims.
pub const DEFAULT_FALLBACK_DIVISOR: f64 = 2.0;

/// Plausible temperature window in degrees Celsius.
pub const TEMPERATURE_MIN: f64 = -50.0;
pub const TEMPERATURE_MAX: f64 = 100.0;

/// Battery voltage endpoints for the millivolt branch.
pub const BATTERY_MV_EMPTY: f64 = 2700.0;
pub const BATTERY_MV_FULL: f64 = 3200.0;

/// Wire threshold above which illuminance uses the logarithmic encoding.
pub const ILLUMINANCE_LOG_THRESHOLD: f64 = 10000.0;

/// Temperature in degrees Celsius from a wire reading.
///
/// Divides by `divisor` and applies `offset`; a result outside the
/// plausible window retries at deci-degree scale with one decimal of
/// precision.
pub fn temperature(value: f64, divisor: f64, offset: f64) -> f64 {
    let scaled = value / divisor + offset;
    if (TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&scaled) {
        return scaled;
    }
    round1(value / 10.0 + offset)
}

/// Wire reading for a temperature in degrees Celsius.
pub fn temperature_to_wire(value: f64, divisor: f64, offset: f64) -> f64 {
    ((value - offset) * divisor).round()
}

/// Relative humidity percentage from a wire reading.
///
/// Tries centi-percent, then deci-percent, then unscaled, and clamps to
/// `[min, max]`.
pub fn humidity(value: f64, divisor: f64, min: f64, max: f64) -> f64 {
    let mut scaled = value / divisor;
    if scaled > 100.0 {
        scaled = value / 10.0;
    }
    if scaled > 100.0 {
        scaled = value;
    }
    scaled.clamp(min, max)
}

/// Wire reading for a humidity percentage.
pub fn humidity_to_wire(value: f64, divisor: f64, min: f64, max: f64) -> f64 {
    (value.clamp(min, max) * divisor).round()
}

/// Battery percentage from a wire reading.
///
/// Branches on magnitude: half-percent counts in `(100, 200]`, plain
/// percentages in `[0, 100]`, millivolts in `(2000, 4000)` mapped linearly
/// from the empty to full voltage, and everything else divided by
/// `fallback_divisor`. The result clamps to `[0, 100]`.
pub fn battery(value: f64, fallback_divisor: f64) -> f64 {
    let scaled = if value > 100.0 && value <= 200.0 {
        value / 2.0
    } else if (0.0..=100.0).contains(&value) {
        value
    } else if value > 2000.0 && value < 4000.0 {
        (value - BATTERY_MV_EMPTY) / (BATTERY_MV_FULL - BATTERY_MV_EMPTY) * 100.0
    } else {
        value / fallback_divisor
    };
    scaled.clamp(0.0, 100.0)
}

/// Wire reading for a battery percentage, in half-percent counts.
pub fn battery_to_wire(value: f64) -> f64 {
    (value.clamp(0.0, 100.0) * 2.0).round()
}

/// Illuminance in lux from a wire reading.
///
/// Large readings carry the ZCL logarithmic encoding; small ones are plain
/// lux floored at zero.
pub fn illuminance(value: f64) -> f64 {
    if value > ILLUMINANCE_LOG_THRESHOLD {
        10f64.powf((value - 1.0) / ILLUMINANCE_LOG_THRESHOLD)
    } else {
        value.max(0.0)
    }
}

/// Wire reading for an illuminance in lux.
pub fn illuminance_to_wire(value: f64) -> f64 {
    if value > 10.0 {
        (value.log10() * ILLUMINANCE_LOG_THRESHOLD + 1.0).round()
    } else {
        value.max(0.0).round()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
