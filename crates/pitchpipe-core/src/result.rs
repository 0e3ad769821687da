//! Detection result wire type.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Note name reported when no positive frequency estimate is available.
pub const NO_NOTE_DETECTED: &str = "No note detected";

/// Outcome of resolving a frequency estimate against the note table.
///
/// Every transport serializes this to the same wire shape:
/// `{"note": "<name>", "frequency": <hz>}` for a detection, or
/// `{"note": "No note detected"}` (no `frequency` key) otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionResult {
    /// A note was matched. `frequency_hz` is the input estimate rounded
    /// to two decimal places.
    Detected {
        /// Matched note name from the table.
        note: &'static str,
        /// Input frequency, rounded for the payload.
        frequency_hz: f64,
    },
    /// No usable pitch in the input.
    NotDetected,
}

impl DetectionResult {
    /// Returns the matched note name, or `None` for `NotDetected`.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            DetectionResult::Detected { note, .. } => Some(note),
            DetectionResult::NotDetected => None,
        }
    }
}

impl Serialize for DetectionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DetectionResult::Detected { note, frequency_hz } => {
                let mut s = serializer.serialize_struct("DetectionResult", 2)?;
                s.serialize_field("note", note)?;
                s.serialize_field("frequency", frequency_hz)?;
                s.end()
            }
            DetectionResult::NotDetected => {
                let mut s = serializer.serialize_struct("DetectionResult", 1)?;
                s.serialize_field("note", NO_NOTE_DETECTED)?;
                s.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detected_serializes_note_and_frequency() {
        let result = DetectionResult::Detected {
            note: "A4",
            frequency_hz: 440.0,
        };
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json, serde_json::json!({"note": "A4", "frequency": 440.0}));
    }

    #[test]
    fn not_detected_omits_frequency() {
        let json = serde_json::to_value(DetectionResult::NotDetected).unwrap();
        assert_eq!(json, serde_json::json!({"note": "No note detected"}));
        assert!(json.get("frequency").is_none());
    }

    #[test]
    fn fractional_frequency_survives_serialization() {
        let result = DetectionResult::Detected {
            note: "C4",
            frequency_hz: 261.5,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"note":"C4","frequency":261.5}"#);
    }
}
