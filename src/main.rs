//! snooze — console client entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Build the API client, probe reachability
//!   7. Resume a saved login, fetch the initial feed (both non-fatal)
//!   8. Print status summary
//!   9. Run the console loop until Ctrl-C / EOF / quit

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use snooze::api::ApiClient;
use snooze::config::{self, Config};
use snooze::console;
use snooze::error::AppError;
use snooze::logger;
use snooze::session::Session;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        work_dir = %config.work_dir.display(),
        api = %config.api.base_url,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let api = ApiClient::new(config.api.base_url.clone(), config.api.timeout_seconds)?;

    if let Err(e) = api.ping().await {
        warn!("story service not reachable: {e}");
    }

    let mut session = Session::new(api, &config.work_dir);

    match session.resume().await {
        Ok(true) => {}
        Ok(false) => info!("no saved session, starting logged out"),
        Err(e) => warn!("could not resume saved session: {e}"),
    }

    match session.refresh_stories().await {
        Ok(count) => info!(stories = count, "feed loaded"),
        Err(e) => warn!("could not load the story feed: {e}"),
    }

    print_startup_summary(&config, &session);

    // Shared shutdown token — Ctrl-C cancels it, the console loop watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    console::run(session, config.ui.clone(), shutdown).await?;

    println!("bye.");
    Ok(())
}

fn print_startup_summary(config: &Config, session: &Session) {
    let fit = |text: String| -> String {
        const WIDTH: usize = 56;
        let char_count = text.chars().count();
        if char_count >= WIDTH {
            let mut out = text.chars().take(WIDTH - 1).collect::<String>();
            out.push('…');
            out
        } else {
            format!("{text:<WIDTH$}")
        }
    };

    let user_line = match session.user() {
        Some(u) => format!("logged in as {} ({})", u.username, u.name),
        None => "not logged in".to_string(),
    };

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║ 📰 {}║", fit("snooze — console story client".to_string()));
    println!("║ 🌐 {}║", fit(config.api.base_url.clone()));
    println!("║ 👤 {}║", fit(user_line));
    println!("║ 🗞️  {}║", fit(format!("{} stories loaded", session.visible().len())));
    println!("╚══════════════════════════════════════════════════════════╝");
    println!("💡 Type 'help' for commands");
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: snooze [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier from the config default:
    //   -v      → warn   (suppress info noise, show warnings+errors only)
    //   -vv     → info   (normal operational output)
    //   -vvv    → debug  (flow-level diagnostics: dispatch, API calls)
    //   -vvvv+  → trace  (full payload dumps, very verbose)
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
