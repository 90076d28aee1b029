// src/status/rotator.rs - Round-robin selection of display messages
use thiserror::Error;

use crate::config::ConfigurationError;
use crate::status::sanitizer::ProgressSnapshot;
use crate::template::{render, FormatError};

/// Messages containing this text need layer telemetry to make sense.
pub const LAYER_MARKER: &str = "Layer";

#[derive(Debug, Error)]
pub enum RotatorError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("every configured message needs layer information and none is available")]
    NoDisplayableMessage,
    #[error("failed to render message {index} ('{template}'): {source}")]
    Format {
        index: usize,
        template: String,
        #[source]
        source: FormatError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationState {
    /// Index of the next message to show, always below `message_count`.
    pub cursor: usize,
    pub message_count: usize,
    pub layer_info_available: bool,
}

#[derive(Debug, Clone)]
pub struct MessageRotator {
    messages: Vec<String>,
    state: RotationState,
}

impl MessageRotator {
    pub fn new(messages: Vec<String>) -> Self {
        let state = RotationState {
            cursor: 0,
            message_count: messages.len(),
            layer_info_available: false,
        };
        Self { messages, state }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn set_layer_info_available(&mut self, available: bool) {
        self.state.layer_info_available = available;
    }

    fn is_skipped(&self, index: usize) -> bool {
        !self.state.layer_info_available && self.messages[index].contains(LAYER_MARKER)
    }

    /// Pick the index of the message to show now and advance the cursor.
    ///
    /// Layer messages are stepped over while layer info is unavailable. The
    /// skipped count and the normal advance are summed before one modulo, so
    /// a skip moves the cursor two places.
    ///
    /// The returned index is the first displayable message at or after the
    /// cursor, not the message at the cursor itself. Returning the cursor
    /// message and skipping the one after it would show layer messages with
    /// no layer info, which the rotation must never do.
    pub fn select(&mut self) -> Result<usize, RotatorError> {
        let count = self.state.message_count;
        if count == 0 {
            return Err(ConfigurationError::NoMessages.into());
        }

        let cursor = self.state.cursor;
        let skipped = (0..count)
            .find(|offset| !self.is_skipped((cursor + offset) % count))
            .ok_or(RotatorError::NoDisplayableMessage)?;

        let selected = (cursor + skipped) % count;
        self.state.cursor = (cursor + skipped + 1) % count;
        Ok(selected)
    }

    /// Render the next message in the rotation against `snapshot`.
    pub fn next_message(&mut self, snapshot: &ProgressSnapshot) -> Result<String, RotatorError> {
        let index = self.select()?;
        let template = &self.messages[index];
        render(template, &snapshot.fields()).map_err(|source| RotatorError::Format {
            index,
            template: template.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::accuracy::Accuracy;

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            completion: Some(12.345),
            time_left_seconds: Some(7325),
            estimation_origin: Some("linear".to_string()),
            rendered_time_left: "02:02:05".to_string(),
            rendered_eta: "14:02:05 01th Jun".to_string(),
            accuracy: Accuracy::Poor,
            current_layer: 3,
            total_layer: 40,
        }
    }

    fn stock() -> Vec<String> {
        [
            "{completion:.2f}% complete",
            "ETL {printTimeLeft}",
            "ETA {ETA}",
            "Layer {currentLayer}/{totalLayer}",
            "Accuracy: {accuracy}",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_cycles_in_order_with_layer_info() {
        let mut rotator = MessageRotator::new(stock());
        rotator.set_layer_info_available(true);
        let snap = snapshot();
        let expected = [
            "12.35% complete",
            "ETL 02:02:05",
            "ETA 14:02:05 01th Jun",
            "Layer 3/40",
            "Accuracy: poor",
        ];
        for _ in 0..2 {
            for want in expected {
                assert_eq!(rotator.next_message(&snap).unwrap(), want);
            }
        }
        assert_eq!(rotator.state().cursor, 0);
    }

    #[test]
    fn test_layer_message_skipped_without_layer_info() {
        let mut rotator = MessageRotator::new(stock());
        let snap = snapshot();
        let shown: Vec<String> = (0..8).map(|_| rotator.next_message(&snap).unwrap()).collect();
        assert!(shown.iter().all(|m| !m.contains("Layer")));
        assert_eq!(shown[2], "ETA 14:02:05 01th Jun");
        assert_eq!(shown[3], "Accuracy: poor");
        assert_eq!(shown[4], "12.35% complete");
    }

    #[test]
    fn test_skip_advances_cursor_by_two() {
        let messages = vec!["Layer {currentLayer}".to_string(), "a".to_string(), "b".to_string()];
        let mut rotator = MessageRotator::new(messages);
        assert_eq!(rotator.select().unwrap(), 1);
        assert_eq!(rotator.state().cursor, 2);
        assert_eq!(rotator.select().unwrap(), 2);
        assert_eq!(rotator.state().cursor, 0);
        assert_eq!(rotator.select().unwrap(), 1);
    }

    #[test]
    fn test_cursor_stays_in_range() {
        let mut messages = stock();
        messages.push("Layer again".to_string());
        let mut rotator = MessageRotator::new(messages);
        for i in 0..50 {
            rotator.set_layer_info_available(i % 3 == 0);
            rotator.select().unwrap();
            let state = rotator.state();
            assert!(state.cursor < state.message_count);
        }
    }

    #[test]
    fn test_two_message_scenario() {
        let messages = vec!["{completion:.2f}% done".to_string(), "ETL {printTimeLeft}".to_string()];
        let mut rotator = MessageRotator::new(messages);
        let snap = snapshot();
        assert_eq!(rotator.next_message(&snap).unwrap(), "12.35% done");
        assert_eq!(rotator.next_message(&snap).unwrap(), "ETL 02:02:05");
        assert_eq!(rotator.next_message(&snap).unwrap(), "12.35% done");
    }

    #[test]
    fn test_empty_rotation_is_a_configuration_error() {
        let mut rotator = MessageRotator::new(Vec::new());
        assert!(matches!(
            rotator.next_message(&snapshot()),
            Err(RotatorError::Configuration(ConfigurationError::NoMessages))
        ));
    }

    #[test]
    fn test_only_layer_messages_without_layer_info() {
        let mut rotator = MessageRotator::new(vec!["Layer {currentLayer}".to_string()]);
        assert!(matches!(rotator.next_message(&snapshot()), Err(RotatorError::NoDisplayableMessage)));
        rotator.set_layer_info_available(true);
        assert_eq!(rotator.next_message(&snapshot()).unwrap(), "Layer 3");
    }

    #[test]
    fn test_unknown_completion_and_layers_render_as_zero() {
        let mut snap = snapshot();
        snap.completion = None;
        snap.current_layer = 0;
        snap.total_layer = 0;
        let mut rotator = MessageRotator::new(vec![
            "{completion:.2f}%".to_string(),
            "L {currentLayer}/{totalLayer}".to_string(),
        ]);
        assert_eq!(rotator.next_message(&snap).unwrap(), "0.00%");
        assert_eq!(rotator.next_message(&snap).unwrap(), "L 0/0");
    }

    #[test]
    fn test_render_failure_still_advances() {
        let mut rotator = MessageRotator::new(vec!["{bogus}".to_string(), "ok".to_string()]);
        let snap = snapshot();
        assert!(matches!(
            rotator.next_message(&snap),
            Err(RotatorError::Format { index: 0, .. })
        ));
        assert_eq!(rotator.next_message(&snap).unwrap(), "ok");
    }
}
