//! Tap-versus-hold classification of raw touch input.
//!
//! Pressing anywhere pauses playback. Releasing quickly counts as a tap and
//! navigates according to the side pressed; releasing after the hold
//! threshold only resumes.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::intents::PlaybackIntent;
use crate::config::PlaybackConfig;

/// Which half of the viewport was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapSide {
    /// Go back.
    Left,
    /// Go forward.
    Right,
}

/// Turns press/release pairs into playback intents.
#[derive(Debug)]
pub struct GestureClassifier {
    hold_threshold: Duration,
    pressed_at: Option<DateTime<Utc>>,
}

impl GestureClassifier {
    #[must_use]
    pub fn new(hold_threshold: Duration) -> Self {
        Self {
            hold_threshold,
            pressed_at: None,
        }
    }

    /// Uses the configured hold threshold.
    #[must_use]
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.hold_threshold())
    }

    /// A finger went down.
    pub fn press(&mut self, at: DateTime<Utc>) -> Vec<PlaybackIntent> {
        self.pressed_at = Some(at);
        vec![PlaybackIntent::Pause]
    }

    /// The finger came up on `side`. A release without a press is ignored.
    pub fn release(&mut self, side: TapSide, at: DateTime<Utc>) -> Vec<PlaybackIntent> {
        let Some(pressed_at) = self.pressed_at.take() else {
            return Vec::new();
        };
        let held = (at - pressed_at).to_std().unwrap_or(Duration::ZERO);
        if held >= self.hold_threshold {
            return vec![PlaybackIntent::Resume];
        }
        let navigate = match side {
            TapSide::Left => PlaybackIntent::Retreat,
            TapSide::Right => PlaybackIntent::Advance,
        };
        vec![navigate, PlaybackIntent::Resume]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_test_support::base_time;

    fn later(millis: i64) -> DateTime<Utc> {
        base_time() + chrono::Duration::milliseconds(millis)
    }

    #[test]
    fn test_quick_release_on_right_advances() {
        // Arrange
        let mut gestures = GestureClassifier::from_config(&PlaybackConfig::default());

        // Act
        let on_press = gestures.press(base_time());
        let on_release = gestures.release(TapSide::Right, later(80));

        // Assert
        assert_eq!(on_press, vec![PlaybackIntent::Pause]);
        assert_eq!(
            on_release,
            vec![PlaybackIntent::Advance, PlaybackIntent::Resume]
        );
    }

    #[test]
    fn test_quick_release_on_left_retreats() {
        let mut gestures = GestureClassifier::from_config(&PlaybackConfig::default());
        gestures.press(base_time());

        let intents = gestures.release(TapSide::Left, later(50));

        assert_eq!(
            intents,
            vec![PlaybackIntent::Retreat, PlaybackIntent::Resume]
        );
    }

    #[test]
    fn test_long_hold_only_resumes() {
        let mut gestures = GestureClassifier::from_config(&PlaybackConfig::default());
        gestures.press(base_time());

        let intents = gestures.release(TapSide::Right, later(900));

        assert_eq!(intents, vec![PlaybackIntent::Resume]);
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut gestures = GestureClassifier::from_config(&PlaybackConfig::default());

        assert!(gestures.release(TapSide::Right, later(10)).is_empty());
    }

    #[test]
    fn test_configured_hold_threshold_decides_tap_or_hold() {
        // Arrange
        let config = PlaybackConfig {
            hold_threshold_ms: 500,
            ..PlaybackConfig::default()
        };
        let mut relaxed = GestureClassifier::from_config(&config);
        let mut default = GestureClassifier::from_config(&PlaybackConfig::default());
        relaxed.press(base_time());
        default.press(base_time());

        // Act
        let relaxed_release = relaxed.release(TapSide::Right, later(300));
        let default_release = default.release(TapSide::Right, later(300));

        // Assert
        assert_eq!(
            relaxed_release,
            vec![PlaybackIntent::Advance, PlaybackIntent::Resume]
        );
        assert_eq!(default_release, vec![PlaybackIntent::Resume]);
    }
}
