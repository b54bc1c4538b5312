/// The long-lived game session: configuration, sprites, the high score and
/// the round currently being played.  Created once at start-up and reused
/// for every round until the player quits.

use rand::Rng;
use tracing::{info, warn};

use crate::assets::SpriteSet;
use crate::compute::{init_state, is_round_over, GameState};
use crate::config::{GameConfig, KeyBindings};
use crate::entities::Rect;
use crate::high_score::HighScoreStore;

/// Which message closes a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndMessage {
    HighScore,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub new_high_score: bool,
    /// `None` when the round was abandoned by quitting.
    pub message: Option<EndMessage>,
}

pub struct Session {
    pub config: GameConfig,
    pub sprites: SpriteSet,
    pub bindings: KeyBindings,
    pub field: Rect,
    /// Best score so far; read once from the store at start-up.
    pub high_score: u32,
    store: HighScoreStore,
    pub state: GameState,
    /// Outer loop flag: cleared when the player confirms quitting.
    pub is_still_playing: bool,
    /// Inner loop flag: cleared to abandon the current round.
    pub is_round_running: bool,
}

impl Session {
    pub fn new(config: GameConfig, store: HighScoreStore, field: Rect, rng: &mut impl Rng) -> Self {
        let sprites = SpriteSet::load(&config);
        Self::with_sprites(config, sprites, store, field, rng)
    }

    pub fn with_sprites(
        config: GameConfig,
        sprites: SpriteSet,
        store: HighScoreStore,
        field: Rect,
        rng: &mut impl Rng,
    ) -> Self {
        let high_score = store.load();
        let bindings = config.key_bindings();
        let state = init_state(&config, &sprites, field, rng);
        info!(high_score, width = field.w, height = field.h, "session started");
        Session {
            config,
            sprites,
            bindings,
            field,
            high_score,
            store,
            state,
            is_still_playing: true,
            is_round_running: true,
        }
    }

    /// Throw away the previous round and set up a new one.
    pub fn start_round(&mut self, rng: &mut impl Rng) {
        self.state = init_state(&self.config, &self.sprites, self.field, rng);
        self.is_round_running = true;
    }

    /// Keep running the round's frame loop?
    pub fn round_should_continue(&self) -> bool {
        self.is_round_running && !is_round_over(&self.state)
    }

    /// Record a beaten high score and decide which message ends the round.
    pub fn conclude_round(&mut self) -> RoundOutcome {
        let new_high_score = self.state.score > i64::from(self.high_score);
        if new_high_score {
            self.update_high_score();
        }

        let message = if is_round_over(&self.state) {
            Some(if new_high_score {
                EndMessage::HighScore
            } else {
                EndMessage::GameOver
            })
        } else {
            None
        };

        info!(score = self.state.score, new_high_score, "round over");
        RoundOutcome {
            new_high_score,
            message,
        }
    }

    fn update_high_score(&mut self) {
        self.high_score = u32::try_from(self.state.score).unwrap_or(u32::MAX);
        if let Err(e) = self.store.save(self.high_score) {
            warn!(
                path = %self.store.path().display(),
                error = %e,
                "couldn't record the high score"
            );
        }
    }

    pub fn message_text(&self, message: EndMessage) -> &str {
        match message {
            EndMessage::HighScore => &self.config.message_high_score,
            EndMessage::GameOver => &self.config.message_game_over,
        }
    }

    /// Apply the answer of the quit confirmation.  Declining resumes play.
    pub fn resolve_quit(&mut self, is_sure_quit: bool) {
        if is_sure_quit {
            info!("quit confirmed");
            self.is_still_playing = false;
            self.is_round_running = false;
        } else {
            self.state.is_paused = false;
        }
    }
}
