use std::env;
use std::path::PathBuf;

use mawaqit::AppConfig;

fn print_usage() {
    eprintln!("Usage: mawaqit [MODE] [OPTIONS]");
    eprintln!();
    eprintln!("Modes:");
    eprintln!("  --tui                    Launch interactive widget (default)");
    eprintln!("  --once                   Print today's prayer times and the next one, then exit");
    eprintln!("  --watch                  Show a console countdown until Ctrl-C");
    eprintln!("  --api                    Serve the widget over HTTP (combinable with --tui or standalone)");
    eprintln!("  --install-cache <DIR>    Copy the widget assets from DIR into the offline cache");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --config <PATH>          Config file (default: {})", AppConfig::default_path().display());
    eprintln!("  --api-host <HOST>        API server bind address (default: from config)");
    eprintln!("  -h, --help               Show this help");
}

fn value_after(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    if let Some(value) = args.get(*i) {
        value.clone()
    } else {
        eprintln!("Error: {flag} requires a value");
        std::process::exit(1);
    }
}

#[derive(PartialEq, Eq)]
enum Mode {
    Tui,
    Once,
    Watch,
    ApiOnly,
    InstallCache(PathBuf),
}

fn init_logging(mode: &Mode) {
    // Log lines on stderr would corrupt the alternate screen
    let level = if *mode == Mode::Tui { "off" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() -> mawaqit::Result<()> {
    let mut tui = false;
    let mut once = false;
    let mut watch = false;
    let mut api = false;
    let mut install_from = None;
    let mut config_path = None;
    let mut api_host = None;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--tui" => tui = true,
            "--once" => once = true,
            "--watch" => watch = true,
            "--api" => api = true,
            "--install-cache" => {
                install_from = Some(PathBuf::from(value_after(&args, &mut i, "--install-cache")));
            }
            "--config" => config_path = Some(PathBuf::from(value_after(&args, &mut i, "--config"))),
            "--api-host" => api_host = Some(value_after(&args, &mut i, "--api-host")),
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Error: unknown argument {other:?}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mode = if let Some(dir) = install_from {
        Mode::InstallCache(dir)
    } else if once {
        Mode::Once
    } else if watch {
        Mode::Watch
    } else if api && !tui {
        Mode::ApiOnly
    } else {
        Mode::Tui
    };
    init_logging(&mode);

    let config_path = config_path.unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load_or_create(&config_path)?;
    log::info!("Loaded config from {}", config_path.display());
    if let Some(host) = api_host.as_ref() {
        config.server.host.clone_from(host);
    }

    match mode {
        Mode::Tui => {
            #[cfg(feature = "tui")]
            {
                let api_host = api.then(|| config.server.host.clone());
                mawaqit::tui::run(&config, api_host).await.map_err(mawaqit::Error::Io)
            }
            #[cfg(not(feature = "tui"))]
            {
                eprintln!("TUI support not compiled in");
                std::process::exit(1);
            }
        }
        Mode::ApiOnly => {
            #[cfg(feature = "tui")]
            {
                mawaqit::tui::run_api_only(&config).await.map_err(mawaqit::Error::Io)
            }
            #[cfg(not(feature = "tui"))]
            {
                eprintln!("API support requires the 'tui' feature");
                std::process::exit(1);
            }
        }
        Mode::Once | Mode::Watch | Mode::InstallCache(_) => {
            #[cfg(feature = "cli")]
            {
                match mode {
                    Mode::Once => mawaqit::cli::print_once(&config).await,
                    Mode::Watch => mawaqit::cli::watch(&config).await,
                    Mode::InstallCache(dir) => mawaqit::cli::install_cache(&config, &dir).await,
                    Mode::Tui | Mode::ApiOnly => unreachable!(),
                }
            }
            #[cfg(not(feature = "cli"))]
            {
                eprintln!("CLI support not compiled in");
                std::process::exit(1);
            }
        }
    }
}
