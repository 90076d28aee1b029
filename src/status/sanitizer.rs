// src/status/sanitizer.rs - Turn raw host telemetry into displayable fields
use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::config::StatusConfig;
use crate::host::RawProgress;
use crate::status::accuracy::Accuracy;
use crate::status::time_format::{format_eta, format_time_left};
use crate::template::FieldValue;

pub const NO_ETL: &str = "No ETL yet";
pub const NO_ETA: &str = "No ETA yet";

/// Last reported layer counts. 0/0 until a layer event arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerProgress {
    pub current: u32,
    pub total: u32,
}

/// One tick's worth of display data.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completion: Option<f64>,
    pub time_left_seconds: Option<u64>,
    pub estimation_origin: Option<String>,
    pub rendered_time_left: String,
    pub rendered_eta: String,
    pub accuracy: Accuracy,
    pub current_layer: u32,
    pub total_layer: u32,
}

impl ProgressSnapshot {
    /// Placeholder values for message templates. Unknown completion shows as 0.
    pub fn fields(&self) -> [(&'static str, FieldValue); 6] {
        [
            ("completion", FieldValue::Float(self.completion.unwrap_or(0.0))),
            ("printTimeLeft", FieldValue::Text(self.rendered_time_left.clone())),
            ("ETA", FieldValue::Text(self.rendered_eta.clone())),
            ("accuracy", FieldValue::from(self.accuracy.label())),
            ("currentLayer", FieldValue::Int(i64::from(self.current_layer))),
            ("totalLayer", FieldValue::Int(i64::from(self.total_layer))),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySanitizer {
    etl_format: String,
    eta_strftime: String,
}

impl TelemetrySanitizer {
    pub fn new(etl_format: impl Into<String>, eta_strftime: impl Into<String>) -> Self {
        Self {
            etl_format: etl_format.into(),
            eta_strftime: eta_strftime.into(),
        }
    }

    pub fn from_config(config: &StatusConfig) -> Self {
        Self::new(config.etl_format.clone(), config.eta_strftime.clone())
    }

    /// Fill in every display field. Formatting failures fall back to the
    /// "No ETL yet" / "No ETA yet" placeholders and never propagate.
    pub fn sanitize<Tz>(&self, raw: &RawProgress, layers: LayerProgress, now: DateTime<Tz>) -> ProgressSnapshot
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let time_left_seconds = raw
            .print_time_left
            .and_then(|secs| u64::try_from(secs).ok())
            .or_else(|| {
                raw.estimated_print_time
                    .filter(|secs| secs.is_finite() && *secs >= 0.0)
                    .map(|secs| secs.trunc() as u64)
            });

        let origin = raw.print_time_left_origin.as_deref();
        let accuracy = Accuracy::classify(origin);
        if accuracy == Accuracy::Unmapped {
            tracing::warn!("Unmapped accuracy value: {:?}", origin);
        }

        let rendered_time_left = format_time_left(time_left_seconds, &self.etl_format).unwrap_or_else(|e| {
            tracing::debug!("Could not render time left from {:?}: {}", raw, e);
            NO_ETL.to_string()
        });
        let rendered_eta = format_eta(now, time_left_seconds, &self.eta_strftime).unwrap_or_else(|e| {
            tracing::debug!("Could not render ETA from {:?}: {}", raw, e);
            NO_ETA.to_string()
        });

        ProgressSnapshot {
            completion: raw
                .completion
                .filter(|pct| !pct.is_nan())
                .map(|pct| pct.clamp(0.0, 100.0)),
            time_left_seconds,
            estimation_origin: raw.print_time_left_origin.clone(),
            rendered_time_left,
            rendered_eta,
            accuracy,
            current_layer: layers.current,
            total_layer: layers.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sanitizer() -> TelemetrySanitizer {
        TelemetrySanitizer::from_config(&StatusConfig::default())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_snapshot() {
        let raw = RawProgress {
            completion: Some(42.5),
            print_time_left: Some(7325),
            print_time_left_origin: Some("genius".to_string()),
            estimated_print_time: Some(9000.0),
            is_printing: true,
        };
        let snap = sanitizer().sanitize(&raw, LayerProgress { current: 12, total: 80 }, now());
        assert_eq!(snap.completion, Some(42.5));
        assert_eq!(snap.time_left_seconds, Some(7325));
        assert_eq!(snap.rendered_time_left, "02:02:05");
        assert_eq!(snap.rendered_eta, "14:02:05 01th Jun");
        assert_eq!(snap.accuracy, Accuracy::Good);
        assert_eq!((snap.current_layer, snap.total_layer), (12, 80));
    }

    #[test]
    fn test_falls_back_to_estimated_print_time() {
        let raw = RawProgress {
            completion: Some(0.0),
            print_time_left: None,
            estimated_print_time: Some(3661.9),
            is_printing: true,
            ..Default::default()
        };
        let snap = sanitizer().sanitize(&raw, LayerProgress::default(), now());
        assert_eq!(snap.time_left_seconds, Some(3661));
        assert_eq!(snap.rendered_time_left, "01:01:01");
        assert_eq!(snap.accuracy, Accuracy::NotAvailable);
    }

    #[test]
    fn test_nothing_known_degrades_to_placeholders() {
        let raw = RawProgress::default();
        let snap = sanitizer().sanitize(&raw, LayerProgress::default(), now());
        assert_eq!(snap.completion, None);
        assert_eq!(snap.time_left_seconds, None);
        assert_eq!(snap.rendered_time_left, NO_ETL);
        assert_eq!(snap.rendered_eta, NO_ETA);
        assert_eq!((snap.current_layer, snap.total_layer), (0, 0));
    }

    #[test]
    fn test_negative_and_invalid_values_are_unknown() {
        let raw = RawProgress {
            completion: Some(f64::NAN),
            print_time_left: Some(-5),
            estimated_print_time: Some(f64::INFINITY),
            ..Default::default()
        };
        let snap = sanitizer().sanitize(&raw, LayerProgress::default(), now());
        assert_eq!(snap.completion, None);
        assert_eq!(snap.time_left_seconds, None);
        assert_eq!(snap.rendered_time_left, NO_ETL);
    }

    #[test]
    fn test_bad_formats_fall_back() {
        let sanitizer = TelemetrySanitizer::new("{days}", "%Q");
        let raw = RawProgress { print_time_left: Some(100), ..Default::default() };
        let snap = sanitizer.sanitize(&raw, LayerProgress::default(), now());
        assert_eq!(snap.rendered_time_left, NO_ETL);
        assert_eq!(snap.rendered_eta, NO_ETA);
    }

    #[test]
    fn test_unmapped_origin() {
        let raw = RawProgress {
            print_time_left: Some(10),
            print_time_left_origin: Some("crystal-ball".to_string()),
            ..Default::default()
        };
        let snap = sanitizer().sanitize(&raw, LayerProgress::default(), now());
        assert_eq!(snap.accuracy.label(), "ERR");
        assert_eq!(snap.estimation_origin.as_deref(), Some("crystal-ball"));
    }

    #[test]
    fn test_completion_is_clamped() {
        let raw = RawProgress { completion: Some(100.4), ..Default::default() };
        let snap = sanitizer().sanitize(&raw, LayerProgress::default(), now());
        assert_eq!(snap.completion, Some(100.0));
    }
}
