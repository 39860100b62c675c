//! Built-in game events published on the engine's event bus

use ember_core::Vec2;
use serde::{Deserialize, Serialize};

/// Events exchanged between gameplay systems.
///
/// Serialized externally tagged under the same snake_case names the bus uses,
/// e.g. `score = { points = 5 }` in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEvent {
    /// The state machine switched states
    StateChanged { from: Option<String>, to: String },
    /// Something blew up at `position`; `intensity` scales the effect (1.0 = normal)
    Explosion { position: Vec2, intensity: f32 },
    /// Play a named sound
    Sound { name: String, volume: f32 },
    /// Points were scored
    Score { points: i64 },
    /// The run ended with a final score
    GameOver { score: i64 },
    /// Game-specific event with a free-form payload
    Custom(String),
}

impl GameEvent {
    /// Bus key this event is published under
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::StateChanged { .. } => Self::STATE_CHANGED,
            GameEvent::Explosion { .. } => Self::EXPLOSION,
            GameEvent::Sound { .. } => Self::SOUND,
            GameEvent::Score { .. } => Self::SCORE,
            GameEvent::GameOver { .. } => Self::GAME_OVER,
            GameEvent::Custom(_) => Self::CUSTOM,
        }
    }

    pub const STATE_CHANGED: &'static str = "state_changed";
    pub const EXPLOSION: &'static str = "explosion";
    pub const SOUND: &'static str = "sound";
    pub const SCORE: &'static str = "score";
    pub const GAME_OVER: &'static str = "game_over";
    pub const CUSTOM: &'static str = "custom";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let events = [
            GameEvent::StateChanged {
                from: None,
                to: "menu".into(),
            },
            GameEvent::Explosion {
                position: Vec2::ZERO,
                intensity: 1.0,
            },
            GameEvent::Sound {
                name: "laser".into(),
                volume: 1.0,
            },
            GameEvent::Score { points: 10 },
            GameEvent::GameOver { score: 10 },
            GameEvent::Custom("x".into()),
        ];
        let mut names: Vec<_> = events.iter().map(|e| e.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), events.len());
    }

    #[test]
    fn test_parse_from_toml_under_bus_name() {
        let event: GameEvent = toml::from_str("score = { points = 5 }").unwrap();
        assert_eq!(event, GameEvent::Score { points: 5 });
        assert_eq!(event.name(), "score");

        let event: GameEvent =
            toml::from_str("explosion = { position = { x = 1.0, y = 2.0 }, intensity = 0.5 }")
                .unwrap();
        assert_eq!(
            event,
            GameEvent::Explosion {
                position: Vec2::new(1.0, 2.0),
                intensity: 0.5
            }
        );
    }
}
