use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::GameConfig;

use super::loop_runner::{finish_simulation, spawn_simulation};
use super::metrics::MetricsAccumulator;
use super::{
    AppError, Clock, DirectionInput, FramePoll, GameState, MetricsHandle, RenderLoop, RenderView,
    SimulationLoop, StopSignal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessExit {
    DurationElapsed,
    ExitRequested,
}

impl HeadlessExit {
    pub const fn as_str(self) -> &'static str {
        match self {
            HeadlessExit::DurationElapsed => "duration_elapsed",
            HeadlessExit::ExitRequested => "exit_action",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessSummary {
    pub final_state: GameState,
    pub exit: HeadlessExit,
    pub run_ms: u64,
    pub frames: u64,
    pub ticks: u64,
    pub live_entities: usize,
}

/// Runs the simulation thread against a windowless render loop that takes
/// a snapshot every frame, until `duration` passes or exit is requested.
pub fn run_headless<C>(
    config: &GameConfig,
    clock: C,
    input: Arc<dyn DirectionInput>,
    duration: Duration,
) -> Result<HeadlessSummary, AppError>
where
    C: Clock + Clone + 'static,
{
    run_headless_with_metrics(config, clock, input, duration, MetricsHandle::default())
}

pub fn run_headless_with_metrics<C>(
    config: &GameConfig,
    clock: C,
    input: Arc<dyn DirectionInput>,
    duration: Duration,
    metrics_handle: MetricsHandle,
) -> Result<HeadlessSummary, AppError>
where
    C: Clock + Clone + 'static,
{
    config.validate()?;
    let loop_config = &config.loop_config;
    let stop = StopSignal::new();
    let started_ms = clock.now_ms();
    let deadline_ms = started_ms.saturating_add(duration.as_millis() as u64);

    let simulation = SimulationLoop::new(config, Arc::clone(&input), started_ms);
    let tick_counter = simulation.tick_counter();
    let view = RenderView::new(simulation.queue_reader(), simulation.state_handle(), input);
    let mut render_loop = RenderLoop::new(view, loop_config.frame_interval_ms(), stop.clone());

    info!(
        target_tps = loop_config.target_tps,
        tick_interval_ms = loop_config.tick_interval_ms(),
        target_fps = loop_config.target_fps,
        frame_interval_ms = loop_config.frame_interval_ms(),
        duration_ms = duration.as_millis() as u64,
        seed = ?config.tuning.seed,
        "loop_config"
    );

    let simulation_thread = spawn_simulation(simulation, clock.clone(), stop.clone())?;
    let mut metrics_accumulator =
        MetricsAccumulator::new(loop_config.metrics_log_interval(), tick_counter.load());
    let mut last_frame_instant = Instant::now();
    let mut live_entities = 0;

    let exit = loop {
        let now_ms = clock.now_ms();
        if now_ms >= deadline_ms {
            break HeadlessExit::DurationElapsed;
        }
        match render_loop.poll_frame(now_ms) {
            FramePoll::Exit => break HeadlessExit::ExitRequested,
            FramePoll::Idle => std::hint::spin_loop(),
            FramePoll::Due => {
                let frame = render_loop.capture(now_ms);
                live_entities = frame.entities.len();
                debug!(
                    now_ms,
                    live_entities,
                    visible_entities = frame.visible_entities().count(),
                    hits = frame.state.hits,
                    misses = frame.state.misses,
                    "frame"
                );

                let now = Instant::now();
                metrics_accumulator.record_frame(now.saturating_duration_since(last_frame_instant));
                last_frame_instant = now;
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
        }
    };

    info!(reason = exit.as_str(), "shutdown_requested");
    stop.request_stop();
    let final_state = finish_simulation(simulation_thread)?;

    let summary = HeadlessSummary {
        final_state,
        exit,
        run_ms: clock.now_ms().saturating_sub(started_ms),
        frames: render_loop.frames(),
        ticks: tick_counter.load(),
        live_entities,
    };
    info!(
        exit = exit.as_str(),
        run_ms = summary.run_ms,
        frames = summary.frames,
        ticks = summary.ticks,
        hits = final_state.hits,
        misses = final_state.misses,
        "shutdown"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{InputAction, MonotonicClock, ScriptedInput, ScriptedPress, SharedInput};

    fn fast_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.tuning.seed = Some(11);
        config.tuning.spawn_cooldown_ms = 20;
        config.tuning.start_delay_ms = 30;
        config.tuning.base_lifetime_ms = 20;
        config.tuning.jitter_ms = 10;
        config.tuning.fixed_offset_ms = 5;
        config
    }

    #[test]
    fn short_run_resolves_entities_and_stops_both_loops() {
        let input = SharedInput::default();
        input.press(InputAction::MoveLeft);

        let summary = run_headless(
            &fast_config(),
            MonotonicClock::start(),
            Arc::new(input),
            Duration::from_millis(400),
        )
        .expect("headless run");

        assert_eq!(summary.exit, HeadlessExit::DurationElapsed);
        assert!(summary.run_ms >= 400);
        assert!(summary.frames > 0);
        assert!(summary.ticks > 0);
        let resolved = summary.final_state.hits + summary.final_state.misses;
        assert!(resolved > 0, "nothing resolved in {summary:?}");
        assert!(resolved <= summary.ticks);
        assert_eq!(
            summary.final_state.accepted_direction,
            crate::app::Direction::Left
        );
    }

    #[test]
    fn scripted_exit_ends_run_early() {
        let clock = MonotonicClock::start();
        let input = ScriptedInput::new(
            vec![ScriptedPress {
                at_ms: 50,
                action: InputAction::Exit,
            }],
            Arc::new(clock),
        );

        let summary = run_headless(
            &fast_config(),
            clock,
            Arc::new(input),
            Duration::from_secs(30),
        )
        .expect("headless run");

        assert_eq!(summary.exit, HeadlessExit::ExitRequested);
        assert!(summary.run_ms < 30_000);
    }

    #[test]
    fn invalid_config_is_rejected_before_threads_start() {
        let mut config = fast_config();
        config.tuning.spawn_cooldown_ms = 0;

        let result = run_headless(
            &config,
            MonotonicClock::start(),
            Arc::new(SharedInput::default()),
            Duration::from_millis(10),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
