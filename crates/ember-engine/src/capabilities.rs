//! Platform capabilities the runtime calls but never implements.
//!
//! Audio playback and leaderboards live in platform plugins. Systems talk to
//! them through these traits; a missing capability answers with
//! [`EmberError::CapabilityUnavailable`] instead of taking the frame down.

use ember_core::{EmberError, Result};

/// Sound playback
pub trait AudioPlayer {
    /// Play a named sound at `volume` (0.0 to 1.0)
    fn play_sound(&mut self, name: &str, volume: f32) -> Result<()>;
}

/// Default audio capability: accepts every request and plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioPlayer for SilentAudio {
    fn play_sound(&mut self, name: &str, volume: f32) -> Result<()> {
        log::trace!("silent audio: '{name}' at {volume:.2}");
        Ok(())
    }
}

/// A score to post to a leaderboard
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub leaderboard_id: String,
    pub score: i64,
}

/// Online leaderboard service
pub trait Leaderboard {
    fn authenticate(&mut self) -> Result<()>;
    fn submit_score(&mut self, submission: &ScoreSubmission) -> Result<()>;
    /// Show a leaderboard UI. `None` shows the service's default board.
    fn show_leaderboard(&mut self, leaderboard_id: Option<&str>) -> Result<()>;
}

/// Default leaderboard capability for hosts without one: rejects every call
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableLeaderboard;

impl UnavailableLeaderboard {
    fn unavailable() -> EmberError {
        EmberError::CapabilityUnavailable("leaderboard".to_string())
    }
}

impl Leaderboard for UnavailableLeaderboard {
    fn authenticate(&mut self) -> Result<()> {
        Err(Self::unavailable())
    }

    fn submit_score(&mut self, _submission: &ScoreSubmission) -> Result<()> {
        Err(Self::unavailable())
    }

    fn show_leaderboard(&mut self, _leaderboard_id: Option<&str>) -> Result<()> {
        Err(Self::unavailable())
    }
}

/// In-process leaderboard. Scores are kept only for the lifetime of the value.
#[derive(Debug, Default, Clone)]
pub struct MemoryLeaderboard {
    authenticated: bool,
    scores: Vec<ScoreSubmission>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Scores for one board, highest first
    pub fn top_scores(&self, leaderboard_id: &str) -> Vec<i64> {
        let mut scores: Vec<i64> = self
            .scores
            .iter()
            .filter(|s| s.leaderboard_id == leaderboard_id)
            .map(|s| s.score)
            .collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores
    }
}

impl Leaderboard for MemoryLeaderboard {
    fn authenticate(&mut self) -> Result<()> {
        self.authenticated = true;
        Ok(())
    }

    fn submit_score(&mut self, submission: &ScoreSubmission) -> Result<()> {
        if !self.authenticated {
            return Err(EmberError::CapabilityUnavailable(
                "leaderboard: not authenticated".to_string(),
            ));
        }
        self.scores.push(submission.clone());
        Ok(())
    }

    fn show_leaderboard(&mut self, leaderboard_id: Option<&str>) -> Result<()> {
        let id = leaderboard_id.unwrap_or("default");
        log::info!("leaderboard '{id}': {:?}", self.top_scores(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_leaderboard_rejects() {
        let mut board = UnavailableLeaderboard;
        assert!(matches!(
            board.authenticate(),
            Err(EmberError::CapabilityUnavailable(_))
        ));
        let submission = ScoreSubmission {
            leaderboard_id: "main".into(),
            score: 10,
        };
        assert!(board.submit_score(&submission).is_err());
        assert!(board.show_leaderboard(None).is_err());
    }

    #[test]
    fn test_memory_leaderboard_requires_auth() {
        let mut board = MemoryLeaderboard::new();
        let submission = ScoreSubmission {
            leaderboard_id: "main".into(),
            score: 10,
        };
        assert!(board.submit_score(&submission).is_err());

        board.authenticate().unwrap();
        board.submit_score(&submission).unwrap();
        board
            .submit_score(&ScoreSubmission {
                score: 30,
                ..submission.clone()
            })
            .unwrap();
        assert_eq!(board.top_scores("main"), vec![30, 10]);
        assert!(board.top_scores("other").is_empty());
    }

    #[test]
    fn test_silent_audio_accepts_everything() {
        assert!(SilentAudio.play_sound("boom", 1.0).is_ok());
    }
}
