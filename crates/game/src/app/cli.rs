use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunMode {
    Windowed,
    Headless {
        duration_ms: u64,
        script: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CliOptions {
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) mode: RunMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    Run(CliOptions),
    Help,
}

const DEFAULT_HEADLESS_DURATION_MS: u64 = 10_000;

pub(crate) fn parse_args(args: &[String]) -> Result<CliCommand, String> {
    let mut config_path = None;
    let mut headless = false;
    let mut duration_ms = None;
    let mut script = None;

    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--config" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --config".to_string())?;
                config_path = Some(PathBuf::from(value));
                index += 2;
            }
            "--headless" => {
                headless = true;
                index += 1;
            }
            "--duration-ms" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --duration-ms".to_string())?;
                duration_ms = Some(value.parse::<u64>().map_err(|_| {
                    format!("invalid --duration-ms value '{value}' (expected u64)")
                })?);
                index += 2;
            }
            "--script" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --script".to_string())?;
                script = Some(value.clone());
                index += 2;
            }
            other => return Err(format!("unknown argument '{other}'\n\n{}", usage_text())),
        }
    }

    if !headless && (duration_ms.is_some() || script.is_some()) {
        return Err("--duration-ms and --script require --headless".to_string());
    }

    let mode = if headless {
        RunMode::Headless {
            duration_ms: duration_ms.unwrap_or(DEFAULT_HEADLESS_DURATION_MS),
            script,
        }
    } else {
        RunMode::Windowed
    };

    Ok(CliCommand::Run(CliOptions { config_path, mode }))
}

pub(crate) fn usage_text() -> String {
    [
        "usage: reflex [--config <path>] [--headless [--duration-ms <ms>] [--script <script>]]",
        "",
        "  --config <path>      JSON config file (overrides REFLEX_CONFIG)",
        "  --headless           run without a window and print the final score",
        "  --duration-ms <ms>   headless run length (default 10000)",
        "  --script <script>    scripted presses, e.g. \"500:left,1200:up,4000:exit\"",
        "",
        "env: REFLEX_CONFIG, REFLEX_TPS, REFLEX_FPS, REFLEX_SEED, RUST_LOG",
    ]
    .join("\n")
}
