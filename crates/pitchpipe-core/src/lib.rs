//! pitchpipe core types
//!
//! This crate holds the reproducible heart of pitchpipe: the fixed
//! equal-tempered note table and the nearest-note resolver that maps a
//! raw frequency estimate to a note name. It performs no I/O and holds
//! no mutable state; every transport adapter shares the same
//! [`resolve`] function.
//!
//! # Example
//!
//! ```
//! use pitchpipe_core::{resolve, DetectionResult};
//!
//! match resolve(440.0) {
//!     DetectionResult::Detected { note, frequency_hz } => {
//!         assert_eq!(note, "A4");
//!         assert_eq!(frequency_hz, 440.0);
//!     }
//!     DetectionResult::NotDetected => unreachable!(),
//! }
//! ```

pub mod resolver;
pub mod result;
pub mod table;

// Re-export main types at crate root
pub use resolver::resolve;
pub use result::{DetectionResult, NO_NOTE_DETECTED};
pub use table::{NoteEntry, NOTE_TABLE};
