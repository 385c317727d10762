use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::warn;

use super::Direction;

static STATE_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_state_lock_poison_once(operation: &'static str) {
    if STATE_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "game state lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::Hit => "hit",
            Outcome::Miss => "miss",
        }
    }
}

/// Score and aim. Owned and mutated by the simulation loop only; everyone
/// else reads copies published through [`GameStateHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub accepted_direction: Direction,
    pub hits: u64,
    pub misses: u64,
    pub run_started_ms: u64,
    pub high_score_ms: u64,
}

impl GameState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            accepted_direction: Direction::default(),
            hits: 0,
            misses: 0,
            run_started_ms: now_ms,
            high_score_ms: 0,
        }
    }

    /// Classifies an expired entity approaching from `direction`.
    pub(crate) fn resolve(&mut self, direction: Direction, now_ms: u64) -> Outcome {
        if direction == self.accepted_direction {
            self.hits = self.hits.saturating_add(1);
            return Outcome::Hit;
        }

        self.misses = self.misses.saturating_add(1);
        self.high_score_ms = self.high_score_ms.max(self.elapsed_ms(now_ms));
        self.run_started_ms = now_ms;
        Outcome::Miss
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.run_started_ms)
    }

    pub fn elapsed_secs(&self, now_ms: u64) -> f32 {
        self.elapsed_ms(now_ms) as f32 / 1_000.0
    }

    pub fn high_score_secs(&self) -> f32 {
        self.high_score_ms as f32 / 1_000.0
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct GameStateHandle {
    state: Arc<RwLock<GameState>>,
}

impl GameStateHandle {
    pub fn snapshot(&self) -> GameState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_state_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, state: GameState) {
        match self.state.write() {
            Ok(mut guard) => *guard = state,
            Err(poisoned) => {
                warn_state_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = state;
            }
        }
    }
}
