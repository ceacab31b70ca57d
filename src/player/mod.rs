// Embedded video player - one session driving one external widget at a time
// The widget itself (an iframe embed, a sidecar, a simulator) sits behind the traits in `widget`

pub mod session;
pub mod simulated;
pub mod widget;

pub use session::{PlayerSession, ReadySignal, SessionPhase, StateChangeCallback};
pub use simulated::{SimulatedFactory, SimulatedPlayer, WidgetCall};
pub use widget::{EmbeddedPlayer, PlayerFactory, WidgetEvent, WidgetEvents};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of playable content (a video id on the embed side)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Mount point the widget renders into (element id on the web side)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Container(String);

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Container {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Playback state reported by the widget, using the embed API's numeric codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
    Unknown(i32),
}

impl PlayerState {
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => PlayerState::Unstarted,
            0 => PlayerState::Ended,
            1 => PlayerState::Playing,
            2 => PlayerState::Paused,
            3 => PlayerState::Buffering,
            5 => PlayerState::Cued,
            other => PlayerState::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            PlayerState::Unstarted => -1,
            PlayerState::Ended => 0,
            PlayerState::Playing => 1,
            PlayerState::Paused => 2,
            PlayerState::Buffering => 3,
            PlayerState::Cued => 5,
            PlayerState::Unknown(code) => *code,
        }
    }
}

/// A state-change notification as handed to the session's listener
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub media_id: MediaId,
    pub state: PlayerState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes() {
        assert_eq!(PlayerState::from_code(1), PlayerState::Playing);
        assert_eq!(PlayerState::from_code(-1), PlayerState::Unstarted);
        assert_eq!(PlayerState::from_code(4), PlayerState::Unknown(4));
        assert_eq!(PlayerState::Cued.code(), 5);
        assert_eq!(PlayerState::Unknown(42).code(), 42);
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = MediaId::new("dQw4w9WgXcQ");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"dQw4w9WgXcQ\"");
        assert_eq!(Container::from("player-root").to_string(), "player-root");
    }
}
