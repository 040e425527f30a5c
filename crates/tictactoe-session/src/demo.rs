//! Self-driven demo sessions.
//!
//! Stands in for a renderer: listens to a session's updates and clicks a
//! random free cell whenever the human seat is to move. A demo can also
//! restart its game once while the bot's first reply is still pending, the
//! way a player hits "new game" mid-turn.

use crate::protocol::SessionUpdate;
use crate::session::SessionHost;
use rand::prelude::*;
use std::sync::Arc;
use tictactoe_core::{GameEvent, Opponent, Player};
use tracing::{debug, info};
use uuid::Uuid;

/// How a demo game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoOutcome {
    Won(Player),
    Draw,
}

/// Play one game against the bot with random human moves.
///
/// With `restart_once`, the game is reset right after the opening move. The
/// bot reply scheduled for the abandoned game must never reach the renderer.
pub async fn run_demo_session(
    host: Arc<SessionHost>,
    seed: Option<u64>,
    restart_once: bool,
) -> anyhow::Result<DemoOutcome> {
    let id = match seed {
        Some(seed) => host.create_seeded_session(Opponent::Bot, seed),
        None => host.create_session(Opponent::Bot),
    };
    let mut rx = host.subscribe(id)?;
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    play_random_move(&host, id, &mut rng)?;
    let mut awaiting_reset = restart_once;
    if restart_once {
        host.reset(id, None)?;
    }
    let mut check_restart = false;

    while let Some(update) = rx.recv().await {
        let rendered = serde_json::to_string(&update)?;
        debug!(session = %id, update = %rendered, "Render");
        match update {
            // Updates from the abandoned game are still queued ahead of the reset
            SessionUpdate::State { .. } if awaiting_reset => {}
            SessionUpdate::State { state, events, .. } => {
                if check_restart {
                    check_restart = false;
                    let opening = matches!(
                        events.first(),
                        Some(GameEvent::MovePlayed {
                            player: Player::First,
                            ..
                        })
                    );
                    if !opening || state.move_count != 1 {
                        anyhow::bail!("stale bot reply delivered after reset in session {}", id);
                    }
                }

                let human_to_move =
                    state.status == "InProgress" && state.current_player == Player::First;
                if human_to_move {
                    play_random_move(&host, id, &mut rng)?;
                }
            }
            SessionUpdate::Reset { .. } => {
                debug!(session = %id, "Demo game restarted");
                awaiting_reset = false;
                check_restart = true;
                play_random_move(&host, id, &mut rng)?;
            }
            SessionUpdate::GameOver { winner, line, .. } => {
                let outcome = winner.map_or(DemoOutcome::Draw, DemoOutcome::Won);
                info!(session = %id, ?outcome, ?line, "Demo game finished");
                host.close(id)?;
                return Ok(outcome);
            }
            SessionUpdate::Rejected { .. } => {}
        }
    }

    anyhow::bail!("session {} closed before the game ended", id)
}

fn play_random_move(host: &Arc<SessionHost>, id: Uuid, rng: &mut StdRng) -> anyhow::Result<()> {
    let state = host.snapshot(id)?;
    if let Some(&index) = state.valid_moves().choose(rng) {
        host.select_cell(id, index)?;
    }
    Ok(())
}
