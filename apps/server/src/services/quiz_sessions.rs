//! In-memory registry of running matching games.
//!
//! Each user has at most one game; starting another replaces it. Games idle
//! for longer than [`SESSION_IDLE_LIMIT_MINUTES`] are dropped.

use chrono::{DateTime, Duration, Utc};
use hsk_core::quiz::MatchingSession;
use hsk_core::HskLevel;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{ApiError, Result};

pub const SESSION_IDLE_LIMIT_MINUTES: i64 = 60;

/// A game and the lesson it was built from.
#[derive(Debug)]
pub struct MatchingGame {
    pub username: String,
    pub level: HskLevel,
    pub lesson: u32,
    pub session: MatchingSession,
    last_used: DateTime<Utc>,
}

#[derive(Default)]
pub struct QuizSessions {
    games: Mutex<HashMap<Uuid, MatchingGame>>,
}

impl QuizSessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn games(&self) -> Result<MutexGuard<'_, HashMap<Uuid, MatchingGame>>> {
        self.games
            .lock()
            .map_err(|_| ApiError::Internal("quiz session lock poisoned".to_string()))
    }

    /// Register a new game for `username`, replacing any game they already had.
    pub fn start(
        &self,
        username: &str,
        level: HskLevel,
        lesson: u32,
        session: MatchingSession,
        now: DateTime<Utc>,
    ) -> Result<Uuid> {
        let mut games = self.games()?;
        let idle_limit = Duration::minutes(SESSION_IDLE_LIMIT_MINUTES);
        games.retain(|_, g| g.username != username && now - g.last_used < idle_limit);

        let id = Uuid::new_v4();
        games.insert(
            id,
            MatchingGame {
                username: username.to_string(),
                level,
                lesson,
                session,
                last_used: now,
            },
        );
        Ok(id)
    }

    /// Run `f` on the caller's game. Games owned by someone else look missing.
    pub fn with_game<T>(
        &self,
        id: Uuid,
        username: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut MatchingGame) -> T,
    ) -> Result<T> {
        let mut games = self.games()?;
        let game = games
            .get_mut(&id)
            .filter(|g| g.username == username)
            .ok_or_else(|| ApiError::NotFound(format!("matching game {}", id)))?;
        game.last_used = now;
        Ok(f(game))
    }

    pub fn finish(&self, id: Uuid) -> Result<()> {
        self.games()?.remove(&id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.games().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
