use log::{error, info};
use openmotics_models::config::Config;
use openmotics_models::env_file;
use openmotics_models::services::inspect;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    env_file: Option<PathBuf>,
    kind: Option<String>,
    input: Option<String>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args_os();
    args.next(); // skip program name

    let mut cli = CliArgs::default();
    while let Some(arg) = args.next() {
        let arg = arg.to_str().ok_or_else(|| "argument contains invalid UTF-8".to_string())?.to_string();
        if arg == "--" {
            break;
        }
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let slot = match flag.as_str() {
            "--env-file" => "env-file",
            "--kind" => "kind",
            "--input" => "input",
            other => return Err(format!("unrecognised argument: {}", other)),
        };
        let value = match inline {
            Some(v) => v,
            None => args
                .next()
                .and_then(|v| v.into_string().ok())
                .ok_or_else(|| format!("`--{}` requires a value", slot))?,
        };
        if value.is_empty() {
            return Err(format!("`--{}` requires a value", slot));
        }
        let target = match slot {
            "env-file" => {
                if cli.env_file.is_some() {
                    return Err("`--env-file` provided more than once".to_string());
                }
                cli.env_file = Some(PathBuf::from(value));
                continue;
            }
            "kind" => &mut cli.kind,
            _ => &mut cli.input,
        };
        if target.replace(value).is_some() {
            return Err(format!("`--{}` provided more than once", slot));
        }
    }
    Ok(cli)
}

/// Load the explicit env file, or `./.env` when present.
fn load_env(cli: &CliArgs) -> Result<Option<(PathBuf, usize)>, String> {
    let path = match &cli.env_file {
        Some(p) if !p.is_file() => return Err(format!("env file not found: {}", p.display())),
        Some(p) => p.clone(),
        None => {
            let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
            let default_path = cwd.join(".env");
            if !default_path.is_file() {
                return Ok(None);
            }
            default_path
        }
    };
    let applied = env_file::load(&path)?;
    Ok(Some((path, applied)))
}

fn run(cli: &CliArgs) -> Result<(), String> {
    let cfg = Config::from_env()?.with_overrides(cli.kind.as_deref(), cli.input.as_deref())?;
    info!(
        "Config loaded (kind={}, input={}, pretty={})",
        cfg.kind,
        cfg.input
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_string()),
        cfg.pretty
    );

    let raw = inspect::read_payload(cfg.input.as_deref()).map_err(|e| format!("reading payload failed: {}", e))?;
    let summary = inspect::inspect_str(cfg.kind, &raw).map_err(|e| e.to_string())?;
    for identity in &summary.identities {
        info!("{} {}", summary.kind, identity);
    }

    let rendered = if cfg.pretty {
        serde_json::to_string_pretty(&summary.canonical)
    } else {
        serde_json::to_string(&summary.canonical)
    }
    .map_err(|e| format!("rendering output failed: {}", e))?;
    println!("{}", rendered);
    Ok(())
}

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };
    let loaded_env = match load_env(&cli) {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some((path, applied)) = loaded_env.as_ref() {
        info!("Environment loaded from {} ({} variable(s) applied)", path.display(), applied);
    }

    info!(
        "openmotics-models {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run(&cli) {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
