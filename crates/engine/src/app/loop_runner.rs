use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::config::{ConfigError, GameConfig};

use super::metrics::MetricsAccumulator;
use super::rendering::HudData;
use super::{
    Clock, FramePoll, GameState, InputAction, MetricsHandle, MonotonicClock, RenderLoop,
    RenderView, Renderer, SharedInput, SimulationLoop, StopSignal,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
    #[error("failed to spawn simulation thread: {0}")]
    SpawnSimulation(#[source] std::io::Error),
    #[error("simulation thread panicked")]
    SimulationPanicked,
}

pub(crate) const SIMULATION_THREAD_NAME: &str = "simulation";

pub(crate) fn spawn_simulation<C>(
    simulation: SimulationLoop,
    clock: C,
    stop: StopSignal,
) -> Result<JoinHandle<GameState>, AppError>
where
    C: Clock + 'static,
{
    thread::Builder::new()
        .name(SIMULATION_THREAD_NAME.to_string())
        .spawn(move || simulation.run(&clock, &stop))
        .map_err(AppError::SpawnSimulation)
}

/// Joins the simulation thread; a panic on that thread becomes
/// [`AppError::SimulationPanicked`].
pub(crate) fn finish_simulation(handle: JoinHandle<GameState>) -> Result<GameState, AppError> {
    handle.join().map_err(|_| AppError::SimulationPanicked)
}

pub fn run_app(config: GameConfig) -> Result<(), AppError> {
    let metrics_handle = MetricsHandle::default();
    run_app_with_metrics(config, metrics_handle)
}

pub fn run_app_with_metrics(
    config: GameConfig,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    config.validate()?;
    let loop_config = config.loop_config.clone();
    let clock = MonotonicClock::start();
    let input = SharedInput::default();
    let stop = StopSignal::new();

    let simulation = SimulationLoop::new(&config, Arc::new(input.clone()), clock.now_ms());
    let tick_counter = simulation.tick_counter();
    let view = RenderView::new(
        simulation.queue_reader(),
        simulation.state_handle(),
        Arc::new(input.clone()),
    );
    let mut render_loop = RenderLoop::new(view, loop_config.frame_interval_ms(), stop.clone());

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(loop_config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                loop_config.window_width as f64,
                loop_config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window), config.tuning.spawn_distance)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    info!(
        target_tps = loop_config.target_tps,
        tick_interval_ms = loop_config.tick_interval_ms(),
        target_fps = loop_config.target_fps,
        frame_interval_ms = loop_config.frame_interval_ms(),
        metrics_log_interval_ms = loop_config.metrics_log_interval().as_millis() as u64,
        seed = ?config.tuning.seed,
        "loop_config"
    );

    let mut simulation_thread = Some(spawn_simulation(simulation, clock, stop.clone())?);
    let mut metrics_accumulator =
        MetricsAccumulator::new(loop_config.metrics_log_interval(), tick_counter.load());
    let mut last_frame_instant = Instant::now();
    let simulation_failure: Rc<Cell<Option<AppError>>> = Rc::new(Cell::new(None));
    let failure_slot = Rc::clone(&simulation_failure);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    stop.request_stop();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        stop.request_stop();
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let Some(action) = action_for_key(event.physical_key) {
                        match event.state {
                            ElementState::Pressed => input.press(action),
                            ElementState::Released => input.release(action),
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let hud = HudData {
                        metrics: metrics_handle.snapshot(),
                    };
                    let frame = render_loop.capture(clock.now_ms());
                    if let Err(error) = renderer.render_frame(&frame, &hud) {
                        warn!(error = %error, "renderer_draw_failed");
                        stop.request_stop();
                        window_target.exit();
                        return;
                    }
                    let live_entities = frame.entities.len();
                    metrics_accumulator.record_frame(frame_dt);

                    if let Some(snapshot) =
                        metrics_accumulator.maybe_snapshot(now, tick_counter.load())
                    {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            live_entities,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => match render_loop.poll_frame(clock.now_ms()) {
                FramePoll::Exit => {
                    info!(reason = "exit_action", "shutdown_requested");
                    window_target.exit();
                }
                FramePoll::Due => window.request_redraw(),
                FramePoll::Idle => {}
            },
            Event::LoopExiting => {
                stop.request_stop();
                if let Some(handle) = simulation_thread.take() {
                    match finish_simulation(handle) {
                        Ok(final_state) => info!(
                            hits = final_state.hits,
                            misses = final_state.misses,
                            best_secs = final_state.high_score_secs(),
                            "final_score"
                        ),
                        Err(err) => {
                            error!(error = %err, "simulation_thread_panicked");
                            failure_slot.set(Some(err));
                        }
                    }
                }
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    match simulation_failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    match key {
        PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
            Some(InputAction::MoveUp)
        }
        PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
            Some(InputAction::MoveDown)
        }
        PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
            Some(InputAction::MoveLeft)
        }
        PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
            Some(InputAction::MoveRight)
        }
        PhysicalKey::Code(KeyCode::Escape) => Some(InputAction::Exit),
        _ => None,
    }
}
