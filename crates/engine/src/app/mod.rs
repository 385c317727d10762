mod clock;
mod direction;
mod entity;
mod frame;
mod headless;
mod input;
mod loop_runner;
mod metrics;
mod pacing;
mod queue;
mod rendering;
mod simulation;
mod state;
mod vector;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use direction::{Direction, ParseDirectionError};
pub use entity::{Entity, EntityId, EntityVariant};
pub use frame::{FramePoll, FrameSnapshot, RenderLoop, RenderView};
pub use headless::{run_headless, run_headless_with_metrics, HeadlessExit, HeadlessSummary};
pub use input::{
    DirectionInput, InputAction, ScriptParseError, ScriptedInput, ScriptedPress, SharedInput,
};
pub use loop_runner::{run_app, run_app_with_metrics, AppError};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use pacing::{DeadlineTimer, StopSignal};
pub use queue::{EntityQueue, EntityQueueReader};
pub use rendering::{
    hud_lines, ArenaProjection, HudData, Renderer, Viewport, ENTITY_RADIUS, PLAYER_RADIUS,
};
pub use simulation::{Resolution, SimulationLoop, TickReport};
pub use state::{GameState, GameStateHandle, Outcome};
pub use vector::Vec2;
