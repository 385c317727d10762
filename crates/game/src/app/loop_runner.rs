use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use engine::{
    run_app, run_headless, DirectionInput, GameConfig, HeadlessSummary, MonotonicClock,
    ScriptedInput, SharedInput,
};
use tracing::error;

use super::cli::RunMode;

pub(crate) fn run(config: GameConfig, mode: RunMode) -> ExitCode {
    match mode {
        RunMode::Windowed => {
            if let Err(err) = run_app(config) {
                error!(error = %err, "startup_failed");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        RunMode::Headless {
            duration_ms,
            script,
        } => run_headless_mode(&config, duration_ms, script.as_deref()),
    }
}

fn run_headless_mode(config: &GameConfig, duration_ms: u64, script: Option<&str>) -> ExitCode {
    let clock = MonotonicClock::start();
    let input: Arc<dyn DirectionInput> = match script {
        Some(script) => match ScriptedInput::parse_script(script) {
            Ok(presses) => Arc::new(ScriptedInput::new(presses, Arc::new(clock))),
            Err(err) => {
                error!(error = %err, "invalid_script");
                return ExitCode::FAILURE;
            }
        },
        None => Arc::new(SharedInput::default()),
    };

    match run_headless(config, clock, input, Duration::from_millis(duration_ms)) {
        Ok(summary) => {
            println!("{}", format_summary(&summary));
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "headless_run_failed");
            ExitCode::FAILURE
        }
    }
}

fn format_summary(summary: &HeadlessSummary) -> String {
    let state = summary.final_state;
    format!(
        "exit={} run_ms={} hits={} misses={} best_secs={:.3} aim={} ticks={} frames={} live_entities={}",
        summary.exit.as_str(),
        summary.run_ms,
        state.hits,
        state.misses,
        state.high_score_secs(),
        state.accepted_direction,
        summary.ticks,
        summary.frames,
        summary.live_entities,
    )
}
