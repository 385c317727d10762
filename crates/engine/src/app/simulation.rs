use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::{debug, info};

use super::metrics::TickCounter;
use super::{
    Clock, DeadlineTimer, Direction, DirectionInput, Entity, EntityId, EntityQueue,
    EntityQueueReader, EntityVariant, GameState, GameStateHandle, Outcome, StopSignal,
};
use crate::config::{GameConfig, SpawnTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub entity: Entity,
    pub outcome: Outcome,
}

/// What a single tick did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub now_ms: u64,
    pub spawned: Option<Entity>,
    pub resolved: Option<Resolution>,
}

struct Spawner {
    tuning: SpawnTuning,
    rng: Pcg32,
    next_spawn_deadline_ms: Option<u64>,
    next_id: u64,
}

impl Spawner {
    fn new(tuning: SpawnTuning) -> Self {
        let rng = match tuning.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        };
        Self {
            tuning,
            rng,
            next_spawn_deadline_ms: None,
            next_id: 0,
        }
    }

    fn maybe_spawn(&mut self, now_ms: u64) -> Option<Entity> {
        if self
            .next_spawn_deadline_ms
            .is_some_and(|deadline| now_ms <= deadline)
        {
            return None;
        }
        self.next_spawn_deadline_ms = Some(now_ms.saturating_add(self.tuning.spawn_cooldown_ms));
        Some(self.generate(now_ms))
    }

    fn generate(&mut self, now_ms: u64) -> Entity {
        let direction = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];
        let variant = EntityVariant::ALL[self.rng.random_range(0..EntityVariant::ALL.len())];
        let lifetime_ms = variant.lifetime_ms(&self.tuning, &mut self.rng);
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        Entity::new(
            id,
            now_ms.saturating_add(self.tuning.start_delay_ms),
            lifetime_ms,
            direction,
            variant,
        )
    }
}

/// Fixed-rate game clock. Sole writer of the entity queue and game state.
///
/// Each tick runs spawn, input sampling and resolution in that order, and
/// resolves at most one expired entity.
pub struct SimulationLoop {
    queue: EntityQueue,
    state: GameState,
    state_handle: GameStateHandle,
    input: Arc<dyn DirectionInput>,
    tick_timer: DeadlineTimer,
    spawner: Spawner,
    tick_counter: TickCounter,
}

impl SimulationLoop {
    pub fn new(config: &GameConfig, input: Arc<dyn DirectionInput>, start_ms: u64) -> Self {
        let state = GameState::new(start_ms);
        let state_handle = GameStateHandle::default();
        state_handle.publish(state);

        Self {
            queue: EntityQueue::new(),
            state,
            state_handle,
            input,
            tick_timer: DeadlineTimer::new(config.loop_config.tick_interval_ms()),
            spawner: Spawner::new(config.tuning.clone()),
            tick_counter: TickCounter::default(),
        }
    }

    pub fn queue_reader(&self) -> EntityQueueReader {
        self.queue.reader()
    }

    pub fn state_handle(&self) -> GameStateHandle {
        self.state_handle.clone()
    }

    pub(crate) fn tick_counter(&self) -> TickCounter {
        self.tick_counter.clone()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Runs a tick if the tick deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<TickReport> {
        if !self.tick_timer.poll(now_ms) {
            return None;
        }
        Some(self.tick(now_ms))
    }

    pub fn tick(&mut self, now_ms: u64) -> TickReport {
        let spawned = self.spawn_step(now_ms);
        self.sample_input();
        let resolved = self.resolve_step(now_ms);

        self.state_handle.publish(self.state);
        self.tick_counter.increment();

        TickReport {
            now_ms,
            spawned,
            resolved,
        }
    }

    /// Busy-polls `clock` until `stop` is raised and returns the final state.
    pub fn run<C: Clock + ?Sized>(mut self, clock: &C, stop: &StopSignal) -> GameState {
        info!(
            tick_interval_ms = self.tick_timer.interval_ms(),
            spawn_cooldown_ms = self.spawner.tuning.spawn_cooldown_ms,
            start_delay_ms = self.spawner.tuning.start_delay_ms,
            "simulation_started"
        );

        while !stop.is_stop_requested() {
            if self.poll(clock.now_ms()).is_none() {
                std::hint::spin_loop();
            }
        }

        info!(
            hits = self.state.hits,
            misses = self.state.misses,
            high_score_ms = self.state.high_score_ms,
            live_entities = self.queue.len(),
            "simulation_stopped"
        );
        self.state
    }

    fn spawn_step(&mut self, now_ms: u64) -> Option<Entity> {
        let entity = self.spawner.maybe_spawn(now_ms)?;
        debug!(
            id = entity.id().0,
            direction = %entity.direction(),
            variant = entity.variant().tag(),
            expiry_ms = entity.expiry_ms(),
            lifetime_ms = entity.lifetime_ms(),
            "entity_spawned"
        );
        self.queue.insert(entity);
        Some(entity)
    }

    fn sample_input(&mut self) {
        let Some(action) = self.input.latest_press() else {
            return;
        };
        if let Ok(direction) = Direction::try_from(action) {
            self.state.accepted_direction = direction;
        }
    }

    fn resolve_step(&mut self, now_ms: u64) -> Option<Resolution> {
        let earliest = self.queue.peek_earliest()?;
        if !earliest.is_expired(now_ms) {
            return None;
        }

        let previous_run_ms = self.state.elapsed_ms(now_ms);
        let outcome = self.state.resolve(earliest.direction(), now_ms);
        let removed = self.queue.remove_earliest();
        debug_assert_eq!(removed, Some(earliest));

        debug!(
            id = earliest.id().0,
            direction = %earliest.direction(),
            aimed = %self.state.accepted_direction,
            outcome = outcome.as_str(),
            late_ms = now_ms - earliest.expiry_ms(),
            "entity_resolved"
        );
        if outcome == Outcome::Miss {
            info!(
                run_ms = previous_run_ms,
                high_score_ms = self.state.high_score_ms,
                misses = self.state.misses,
                "run_reset"
            );
        }

        Some(Resolution {
            entity: earliest,
            outcome,
        })
    }
}
