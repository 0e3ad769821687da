//! Nearest-note resolution over the fixed note table.

use crate::result::DetectionResult;
use crate::table::NOTE_TABLE;

/// Round a float to the specified number of decimal places.
fn round_f64(value: f64, decimals: i32) -> f64 {
    let multiplier = 10_f64.powi(decimals);
    (value * multiplier).round() / multiplier
}

/// Resolve a raw frequency estimate to the nearest note.
///
/// Non-finite or non-positive inputs (a pitch estimator reports "no
/// reliable pitch" as zero) resolve to [`DetectionResult::NotDetected`].
/// Otherwise the table entry minimizing the absolute distance to
/// `frequency_hz` wins; the scan is stable, so an exact tie goes to the
/// lower-frequency entry. The reported frequency is the input rounded
/// to two decimal places; table values are never rounded.
pub fn resolve(frequency_hz: f64) -> DetectionResult {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return DetectionResult::NotDetected;
    }

    let mut best = &NOTE_TABLE[0];
    let mut best_distance = (best.frequency_hz - frequency_hz).abs();
    for entry in &NOTE_TABLE[1..] {
        let distance = (entry.frequency_hz - frequency_hz).abs();
        if distance < best_distance {
            best = entry;
            best_distance = distance;
        }
    }

    DetectionResult::Detected {
        note: best.name,
        frequency_hz: round_f64(frequency_hz, 2),
    }
}
