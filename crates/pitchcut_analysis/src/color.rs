//! Hue arithmetic for team-color alignment.
//!
//! Jersey clustering happens upstream; this helper compares cluster hues
//! against reference team colors. Hue is an angle, so distance must wrap
//! at 360 degrees: red (0°) and magenta (300°) are 60° apart, not 300°.

/// Circular distance between two hues, in degrees (`0..=180`).
#[must_use]
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Whether `hue` is within `tolerance` degrees of `reference`,
/// accounting for wraparound.
#[must_use]
pub fn hue_matches(hue: f64, reference: f64, tolerance: f64) -> bool {
    hue_distance(hue, reference) <= tolerance
}
