//! Control panel commands and height label
//!
//! The host draws the panel; this module names the buttons and formats the
//! text the label shows.

use serde::{Deserialize, Serialize};

use crate::consts::{PANEL_HEIGHT, PANEL_TITLE, PANEL_WIDTH};

/// Label text after a reset
pub const RESET_TEXT: &str = "Sphere and plane removed - Simulation reset";

/// Label text for the current height
pub fn height_text(height: f32) -> String {
    format!("Height: {height:.2} meters")
}

/// Window caption with the panel size the host should open
pub fn panel_caption() -> String {
    let buttons: Vec<&str> = UiAction::ALL.iter().map(UiAction::as_str).collect();
    format!(
        "{PANEL_TITLE} ({PANEL_WIDTH}x{PANEL_HEIGHT}): {}",
        buttons.join(" | ")
    )
}

/// A panel button, each mapped to one controller command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiAction {
    Start,
    Stop,
    Reset,
    RecolorSphere,
    RecolorGround,
}

impl UiAction {
    /// Buttons in panel order
    pub const ALL: [UiAction; 5] = [
        UiAction::Start,
        UiAction::Stop,
        UiAction::Reset,
        UiAction::RecolorSphere,
        UiAction::RecolorGround,
    ];

    /// Button caption
    pub fn as_str(&self) -> &'static str {
        match self {
            UiAction::Start => "Start",
            UiAction::Stop => "Stop",
            UiAction::Reset => "Reset",
            UiAction::RecolorSphere => "Change S color",
            UiAction::RecolorGround => "Change G color",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "start" => Some(UiAction::Start),
            "stop" => Some(UiAction::Stop),
            "reset" => Some(UiAction::Reset),
            "change s color" | "recolor-sphere" | "sphere" => Some(UiAction::RecolorSphere),
            "change g color" | "recolor-ground" | "ground" => Some(UiAction::RecolorGround),
            _ => None,
        }
    }
}

/// Text label owned by the host panel
pub trait LabelSink {
    fn set_text(&mut self, text: &str);
}

/// Label that keeps every update (headless runs and tests)
#[derive(Debug, Clone, Default)]
pub struct RecordingLabel {
    pub history: Vec<String>,
}

impl RecordingLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }
}

impl LabelSink for RecordingLabel {
    fn set_text(&mut self, text: &str) {
        self.history.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_text() {
        assert_eq!(height_text(20.0), "Height: 20.00 meters");
        assert_eq!(height_text(3.14159), "Height: 3.14 meters");
        assert_eq!(height_text(0.0), "Height: 0.00 meters");
    }

    #[test]
    fn test_panel_caption() {
        assert_eq!(
            panel_caption(),
            "Bouncing Sphere Controller (300x300): Start | Stop | Reset | Change S color | Change G color"
        );
    }

    #[test]
    fn test_action_captions_round_trip() {
        for action in UiAction::ALL {
            assert_eq!(UiAction::from_str(action.as_str()), Some(action));
        }
        assert_eq!(UiAction::from_str(" STOP "), Some(UiAction::Stop));
        assert_eq!(UiAction::from_str("jump"), None);
    }

    #[test]
    fn test_recording_label() {
        let mut label = RecordingLabel::new();
        assert_eq!(label.text(), None);
        label.set_text("a");
        label.set_text("b");
        assert_eq!(label.text(), Some("b"));
        assert_eq!(label.history.len(), 2);
    }
}
