//! WebAssembly bindings for the browser front end.
//!
//! The page owns the DOM and the bot delay. A typical click handler:
//!
//! ```js
//! game.selectCell(index);          // throws on an ignored click
//! render(JSON.parse(game.getState()));
//! const ticket = game.pendingBotTurn();
//! if (ticket) setTimeout(() => {
//!     game.playBotTurn(ticket);     // no-op if reset in the meantime
//!     render(JSON.parse(game.getState()));
//! }, 500);
//! ```

use wasm_bindgen::prelude::*;

use crate::game::{BotTurn, GameEngine};
use crate::player::{Opponent, Player};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn seat_number(player: Player) -> u8 {
    match player {
        Player::First => 1,
        Player::Second => 2,
    }
}

fn opponent_for(vs_bot: bool) -> Opponent {
    if vs_bot {
        Opponent::Bot
    } else {
        Opponent::Human
    }
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    engine: GameEngine,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game, against the computer or hot-seat
    #[wasm_bindgen(constructor)]
    pub fn new(vs_bot: bool) -> WasmGame {
        WasmGame {
            engine: GameEngine::new(opponent_for(vs_bot)),
        }
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        let state = self.engine.state().to_json_friendly();
        serde_json::to_string(&state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Cell contents as an array of `"X"`, `"O"` or `""`
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> Vec<String> {
        self.engine.state().to_json_friendly().cells
    }

    /// 1 or 2, for the turn highlight
    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        seat_number(self.engine.state().current_player())
    }

    #[wasm_bindgen(js_name = getStatusText)]
    pub fn get_status_text(&self) -> String {
        self.engine.state().status_text()
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.engine.state().is_finished()
    }

    /// Winner as 1 or 2, if the game was won
    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.engine.state().winner().map(seat_number)
    }

    /// Indices of the winning line, for the victory animation
    #[wasm_bindgen(js_name = getWinningLine)]
    pub fn get_winning_line(&self) -> Option<Vec<u8>> {
        self.engine
            .state()
            .winning_line()
            .map(|line| line.iter().map(|&i| i as u8).collect())
    }

    /// Human click on a cell. Returns events JSON, or throws if the click is ignored.
    #[wasm_bindgen(js_name = selectCell)]
    pub fn select_cell(&mut self, index: u32) -> Result<String, JsValue> {
        match self.engine.select_cell(index as usize) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Move ignored: {}", e))),
        }
    }

    /// Ticket JSON for the bot's move, or None if the bot is not to move
    #[wasm_bindgen(js_name = pendingBotTurn)]
    pub fn pending_bot_turn(&self) -> Option<String> {
        self.engine
            .pending_bot_turn()
            .and_then(|turn| serde_json::to_string(&turn).ok())
    }

    /// Play the bot's move for a ticket. Returns events JSON; `[]` if the ticket is stale.
    #[wasm_bindgen(js_name = playBotTurn)]
    pub fn play_bot_turn(&mut self, ticket_json: &str) -> Result<String, JsValue> {
        let turn: BotTurn = serde_json::from_str(ticket_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid ticket JSON: {}", e)))?;
        let events = self.engine.play_bot_turn(turn);
        Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Start a new game; `vs_bot` switches between computer and hot-seat
    pub fn reset(&mut self, vs_bot: bool) {
        self.engine.reset_with(opponent_for(vs_bot));
    }
}
