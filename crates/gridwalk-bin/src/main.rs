//! Gridwalk entrypoint.
use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Result, bail};
use clap::Parser;
use core_config::Config;
use core_display::{FancyDisplay, SimpleDisplay, TurtleDisplay};
use core_world::{Display, World};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

const DISPLAYS: &[(&str, &str)] = &[
    ("simple", "prints log output as it happens, no grid redraw"),
    ("fancy", "redraws the whole grid every tick in the terminal"),
    ("turtle", "renders one PNG frame per tick into a directory"),
];

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "gridwalk", version, about = "A 2D automaton grid interpreter")]
struct Args {
    /// Path to the program file to run. Omitted when `--list-displays` is given.
    pub path: Option<PathBuf>,
    /// Which display to drive the run with.
    #[arg(long = "display", default_value = "simple")]
    pub display: String,
    /// Print the available displays and exit.
    #[arg(long = "list-displays")]
    pub list_displays: bool,
    /// Optional configuration file path (overrides discovery of `gridwalk.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("gridwalk.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "gridwalk.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => self.log_guard = Some(guard),
            Err(_) => {
                // Global subscriber already installed; drop the guard so the
                // writer thread shuts down cleanly.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn list_displays() {
    for (name, description) in DISPLAYS {
        println!("{name} — {description}");
    }
}

fn build_display(name: &str, config: &Config) -> Result<Box<dyn Display>> {
    match name {
        "simple" => Ok(Box::new(SimpleDisplay::new())),
        "fancy" => Ok(Box::new(FancyDisplay::new(config.tick_delay()))),
        "turtle" => Ok(Box::new(TurtleDisplay::new(
            config.turtle_output_dir(),
            config.tick_delay(),
        ))),
        other => bail!("unknown display {other:?}, expected one of simple, fancy, turtle"),
    }
}

fn run() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();

    let args = Args::parse();

    if args.list_displays {
        list_displays();
        return Ok(());
    }

    // Resolved before the program file is even read: an unknown display name
    // must never get as far as constructing a World.
    let config = core_config::load_from(args.config.clone())?;
    let display = build_display(&args.display, &config)?;

    let Some(path) = args.path.as_ref() else {
        bail!("missing program file path");
    };
    let source = std::fs::read_to_string(path)?;

    info!(target: "runtime", display = args.display.as_str(), path = %path.display(), "startup");

    let mut world = World::from_text(&source, display);
    world.run_until_done()?;

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        error!(target: "runtime", error = %err, "fatal");
        eprintln!("{err}");
        std::process::exit(1);
    }
}
