use std::sync::Arc;

use super::{
    DeadlineTimer, DirectionInput, Entity, EntityQueueReader, GameState, GameStateHandle,
    InputAction, StopSignal,
};

/// Everything one frame draws: a consistent entity copy plus the score.
///
/// The two halves are read one after the other, so the score may be a tick
/// newer or older than the entities. Neither half is ever torn.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub now_ms: u64,
    pub entities: &'a [Entity],
    pub state: GameState,
}

impl<'a> FrameSnapshot<'a> {
    pub fn visible_entities(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        let now_ms = self.now_ms;
        self.entities
            .iter()
            .filter(move |entity| entity.is_visible(now_ms))
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.state.elapsed_secs(self.now_ms)
    }
}

/// Read-only window onto simulation state for a render loop.
pub struct RenderView {
    queue: EntityQueueReader,
    state: GameStateHandle,
    input: Arc<dyn DirectionInput>,
    entities: Vec<Entity>,
}

impl RenderView {
    pub fn new(
        queue: EntityQueueReader,
        state: GameStateHandle,
        input: Arc<dyn DirectionInput>,
    ) -> Self {
        Self {
            queue,
            state,
            input,
            entities: Vec::new(),
        }
    }

    pub fn exit_requested(&self) -> bool {
        self.input.action_state(InputAction::Exit)
    }

    pub fn capture(&mut self, now_ms: u64) -> FrameSnapshot<'_> {
        self.queue.snapshot_into(&mut self.entities);
        FrameSnapshot {
            now_ms,
            entities: &self.entities,
            state: self.state.snapshot(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePoll {
    /// Exit was requested; the stop signal has been raised.
    Exit,
    Idle,
    Due,
}

/// Frame pacing for a render loop, independent of the simulation clock.
pub struct RenderLoop {
    view: RenderView,
    frame_timer: DeadlineTimer,
    stop: StopSignal,
    frames: u64,
}

impl RenderLoop {
    pub fn new(view: RenderView, frame_interval_ms: u64, stop: StopSignal) -> Self {
        Self {
            view,
            frame_timer: DeadlineTimer::new(frame_interval_ms),
            stop,
            frames: 0,
        }
    }

    /// Checks the exit action first, then the frame deadline.
    pub fn poll_frame(&mut self, now_ms: u64) -> FramePoll {
        if self.stop.is_stop_requested() {
            return FramePoll::Exit;
        }
        if self.view.exit_requested() {
            self.stop.request_stop();
            return FramePoll::Exit;
        }
        if self.frame_timer.poll(now_ms) {
            FramePoll::Due
        } else {
            FramePoll::Idle
        }
    }

    pub fn capture(&mut self, now_ms: u64) -> FrameSnapshot<'_> {
        self.frames = self.frames.saturating_add(1);
        self.view.capture(now_ms)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
