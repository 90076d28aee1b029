// src/status/mod.rs - Progress message pipeline: sanitize, rotate, render
pub mod accuracy;
pub mod rotator;
pub mod sanitizer;
pub mod time_format;

pub use accuracy::Accuracy;
pub use rotator::{MessageRotator, RotationState, RotatorError, LAYER_MARKER};
pub use sanitizer::{LayerProgress, ProgressSnapshot, TelemetrySanitizer, NO_ETA, NO_ETL};
pub use time_format::{format_eta, format_time_left, TimeParts};
