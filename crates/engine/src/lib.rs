pub mod app;
pub mod config;

pub use app::{
    hud_lines, run_app, run_app_with_metrics, run_headless, run_headless_with_metrics, AppError,
    ArenaProjection, Clock, DeadlineTimer, Direction, DirectionInput, Entity, EntityId,
    EntityQueue, EntityQueueReader, EntityVariant, FramePoll, FrameSnapshot, GameState,
    GameStateHandle, HeadlessExit, HeadlessSummary, HudData, InputAction, LoopMetricsSnapshot,
    ManualClock, MetricsHandle, MonotonicClock, Outcome, ParseDirectionError, RenderLoop,
    RenderView, Renderer, Resolution, ScriptParseError, ScriptedInput, ScriptedPress,
    SharedInput, SimulationLoop, StopSignal, TickReport, Vec2, Viewport, ENTITY_RADIUS,
    PLAYER_RADIUS,
};
pub use config::{
    ConfigError, GameConfig, LoopConfig, SpawnTuning, CONFIG_PATH_ENV_VAR, FPS_ENV_VAR,
    SEED_ENV_VAR, TPS_ENV_VAR,
};
