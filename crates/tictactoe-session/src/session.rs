//! Game session hosting.
//!
//! Each session owns its own `GameEngine`; nothing is shared between games.
//! Subscribers receive a `SessionUpdate` after every applied move, bot
//! replies included. The bot's reply is delayed on a tokio task and is
//! dropped if the game was reset or moved on in the meantime.

use crate::protocol::{SessionInfo, SessionUpdate};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tictactoe_core::{BotTurn, GameEngine, GameEvent, GameState, MoveError, Opponent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Move rejected: {0}")]
    Move(#[from] MoveError),
}

/// One hosted game.
pub struct GameSession {
    pub id: Uuid,
    engine: GameEngine,
    subscribers: Vec<mpsc::UnboundedSender<SessionUpdate>>,
}

impl GameSession {
    pub fn new(id: Uuid, engine: GameEngine) -> Self {
        Self {
            id,
            engine,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Send to every subscriber, dropping the ones that hung up
    fn send(&mut self, update: SessionUpdate) {
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    /// Announce the current state after a move
    fn publish_move(&mut self, events: Vec<GameEvent>) {
        let state = self.engine.state();
        let game_over = state.is_finished().then(|| SessionUpdate::GameOver {
            session_id: self.id,
            winner: state.winner(),
            line: state.winning_line(),
        });
        let update = SessionUpdate::State {
            session_id: self.id,
            state: state.to_json_friendly(),
            events,
        };

        self.send(update);
        if let Some(update) = game_over {
            self.send(update);
        }
    }

    pub fn to_info(&self) -> SessionInfo {
        let state = self.engine.state();
        SessionInfo {
            id: self.id,
            opponent: self.engine.opponent(),
            move_count: state.move_count(),
            finished: state.is_finished(),
            status_text: state.status_text(),
        }
    }
}

/// All sessions hosted by this process.
pub struct SessionHost {
    sessions: DashMap<Uuid, GameSession>,
    bot_delay: Duration,
}

impl SessionHost {
    pub fn new(bot_delay: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            bot_delay,
        }
    }

    /// Start a new game. Renderers attach with [`SessionHost::subscribe`].
    pub fn create_session(&self, opponent: Opponent) -> Uuid {
        self.host(GameEngine::new(opponent))
    }

    /// Start a new game whose bot is seeded, for reproducible runs
    pub fn create_seeded_session(&self, opponent: Opponent, seed: u64) -> Uuid {
        self.host(GameEngine::with_seed(opponent, seed))
    }

    fn host(&self, engine: GameEngine) -> Uuid {
        let id = Uuid::new_v4();
        let opponent = engine.opponent();
        self.sessions.insert(id, GameSession::new(id, engine));

        info!(session = %id, ?opponent, "Session created");
        id
    }

    /// Attach a renderer to a session
    pub fn subscribe(
        &self,
        id: Uuid,
    ) -> Result<mpsc::UnboundedReceiver<SessionUpdate>, SessionError> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        Ok(session.subscribe())
    }

    /// Copy of the session's current state
    pub fn snapshot(&self, id: Uuid) -> Result<GameState, SessionError> {
        let session = self.sessions.get(&id).ok_or(SessionError::NotFound)?;
        Ok(session.state().clone())
    }

    /// Human selects a cell. Schedules the bot's reply when one is due.
    pub fn select_cell(self: &Arc<Self>, id: Uuid, index: usize) -> Result<(), SessionError> {
        let pending = {
            let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound)?;

            match session.engine.select_cell(index) {
                Ok(events) => {
                    debug!(session = %id, index, "Human move applied");
                    session.publish_move(events);
                    session.engine.pending_bot_turn()
                }
                Err(e) => {
                    warn!(session = %id, index, error = %e, "Move ignored");
                    session.send(SessionUpdate::Rejected {
                        session_id: id,
                        error: e,
                    });
                    return Err(e.into());
                }
            }
        };

        if let Some(turn) = pending {
            self.schedule_bot_turn(id, turn);
        }
        Ok(())
    }

    fn schedule_bot_turn(self: &Arc<Self>, id: Uuid, turn: BotTurn) {
        if self.bot_delay.is_zero() {
            if let Err(e) = self.play_bot_turn(id, turn) {
                debug!(session = %id, error = %e, "Bot move dropped");
            }
            return;
        }

        let host = Arc::clone(self);
        let delay = self.bot_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = host.play_bot_turn(id, turn) {
                debug!(session = %id, error = %e, "Scheduled bot move dropped");
            }
        });
    }

    /// Apply the bot's move for a ticket. Returns false if the ticket went stale.
    pub fn play_bot_turn(&self, id: Uuid, turn: BotTurn) -> Result<bool, SessionError> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound)?;

        let events = session.engine.play_bot_turn(turn);
        if events.is_empty() {
            debug!(session = %id, ?turn, "Stale bot ticket ignored");
            return Ok(false);
        }

        debug!(session = %id, "Bot move applied");
        session.publish_move(events);
        Ok(true)
    }

    /// Replace the session's game, optionally switching opponent
    pub fn reset(&self, id: Uuid, opponent: Option<Opponent>) -> Result<(), SessionError> {
        let mut session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound)?;

        let opponent = opponent.unwrap_or_else(|| session.engine.opponent());
        session.engine.reset_with(opponent);
        let state = session.engine.state().to_json_friendly();
        session.send(SessionUpdate::Reset {
            session_id: id,
            state,
        });

        info!(session = %id, ?opponent, "Session reset");
        Ok(())
    }

    /// Drop a session; any scheduled bot move for it becomes a no-op
    pub fn close(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions.remove(&id).ok_or(SessionError::NotFound)?;
        info!(session = %id, "Session closed");
        Ok(())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        self.sessions.iter().map(|s| s.to_info()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_core::{GameStatus, Player};

    fn host(delay_ms: u64) -> Arc<SessionHost> {
        Arc::new(SessionHost::new(Duration::from_millis(delay_ms)))
    }

    #[tokio::test]
    async fn test_immediate_bot_reply() {
        let host = host(0);
        let id = host.create_seeded_session(Opponent::Bot, 1);
        let mut rx = host.subscribe(id).unwrap();

        host.select_cell(id, 4).unwrap();

        let human = rx.recv().await.unwrap();
        assert!(matches!(human, SessionUpdate::State { ref state, .. } if state.move_count == 1));
        let bot = rx.recv().await.unwrap();
        assert!(matches!(bot, SessionUpdate::State { ref state, .. } if state.move_count == 2));

        let state = host.snapshot(id).unwrap();
        assert_eq!(state.current_player(), Player::First);
    }

    #[tokio::test]
    async fn test_delayed_bot_reply() {
        let host = host(20);
        let id = host.create_seeded_session(Opponent::Bot, 2);
        let mut rx = host.subscribe(id).unwrap();

        host.select_cell(id, 0).unwrap();
        assert_eq!(host.snapshot(id).unwrap().move_count(), 1);

        // Human cannot move while the bot is thinking
        assert_eq!(
            host.select_cell(id, 1),
            Err(SessionError::Move(MoveError::NotYourTurn))
        );

        let _human = rx.recv().await.unwrap();
        let _rejected = rx.recv().await.unwrap();
        let bot = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("bot reply in time")
            .unwrap();
        assert!(matches!(bot, SessionUpdate::State { ref state, .. } if state.move_count == 2));
    }

    #[tokio::test]
    async fn test_reset_cancels_scheduled_bot_move() {
        let host = host(30);
        let id = host.create_seeded_session(Opponent::Bot, 3);
        let mut rx = host.subscribe(id).unwrap();

        host.select_cell(id, 4).unwrap();
        host.reset(id, None).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(host.snapshot(id).unwrap(), GameState::new());

        let _human = rx.recv().await.unwrap();
        assert!(matches!(rx.recv().await.unwrap(), SessionUpdate::Reset { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_close_cancels_scheduled_bot_move() {
        let host = host(20);
        let id = host.create_session(Opponent::Bot);

        host.select_cell(id, 4).unwrap();
        host.close(id).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(host.session_count(), 0);
        assert_eq!(host.snapshot(id), Err(SessionError::NotFound));
    }

    #[tokio::test]
    async fn test_rejected_move_is_reported() {
        let host = host(0);
        let id = host.create_session(Opponent::Human);
        let mut rx = host.subscribe(id).unwrap();

        assert_eq!(
            host.select_cell(id, 12),
            Err(SessionError::Move(MoveError::OutOfRange(12)))
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            SessionUpdate::Rejected {
                error: MoveError::OutOfRange(12),
                ..
            }
        ));
        assert_eq!(host.snapshot(id).unwrap(), GameState::new());
    }

    #[tokio::test]
    async fn test_hot_seat_game_over() {
        let host = host(0);
        let id = host.create_session(Opponent::Human);
        let mut rx = host.subscribe(id).unwrap();
        let mut second = host.subscribe(id).unwrap();

        for index in [0, 3, 1, 4, 2] {
            host.select_cell(id, index).unwrap();
        }

        let mut last = None;
        while let Ok(update) = rx.try_recv() {
            last = Some(update);
        }
        assert!(matches!(
            last,
            Some(SessionUpdate::GameOver {
                winner: Some(Player::First),
                line: Some([0, 1, 2]),
                ..
            })
        ));
        assert!(second.try_recv().is_ok());
        assert!(matches!(
            host.snapshot(id).unwrap().status(),
            GameStatus::Won { .. }
        ));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let host = host(0);
        let a = host.create_session(Opponent::Human);
        let b = host.create_session(Opponent::Human);

        host.select_cell(a, 0).unwrap();
        host.select_cell(b, 8).unwrap();

        assert!(host.snapshot(a).unwrap().board().is_empty_at(8));
        assert!(host.snapshot(b).unwrap().board().is_empty_at(0));
        assert_eq!(host.list_sessions().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let host = host(0);
        assert_eq!(
            host.select_cell(Uuid::new_v4(), 0),
            Err(SessionError::NotFound)
        );
        assert_eq!(host.reset(Uuid::new_v4(), None), Err(SessionError::NotFound));
    }
}
