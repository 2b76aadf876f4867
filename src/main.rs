//! Signal Playground CLI
//!
//! Serves synthetic signal datasets and computes display windows over them.

use clap::{Parser, Subcommand};
use signal_playground::{
    activity::{ActivityLog, Interaction},
    config::Config,
    core::{compute_window, WindowError, WindowSize},
    datasets::{DataSource, DatasetStore, JsonFileSource},
    VERSION,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signal-playground")]
#[command(version = VERSION)]
#[command(about = "Synthetic signal datasets with click-driven time windowing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve datasets and window sessions over HTTP
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,

        /// Noise seed for reproducible datasets
        #[arg(long)]
        seed: Option<u64>,

        /// Serve `<name>.json` series from this directory instead of generating them
        #[arg(long)]
        dataset_dir: Option<PathBuf>,
    },

    /// List available datasets
    Datasets {
        /// Noise seed for reproducible datasets
        #[arg(long)]
        seed: Option<u64>,

        /// Read `<name>.json` series from this directory instead of generating them
        #[arg(long)]
        dataset_dir: Option<PathBuf>,
    },

    /// Compute one window over a dataset
    Window {
        /// Dataset name (signal, fft, filtering, psd, bandpass, accelerometer)
        series: String,

        /// Full window width in axis units (defaults to the configured slider value)
        #[arg(long)]
        window_size: Option<f64>,

        /// Axis value to center the window on; omit for the default view
        #[arg(long, allow_negative_numbers = true)]
        center: Option<f64>,

        /// Noise seed for reproducible datasets
        #[arg(long)]
        seed: Option<u64>,

        /// Read `<name>.json` series from this directory instead of generating them
        #[arg(long)]
        dataset_dir: Option<PathBuf>,

        /// Print the window as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show activity statistics from previous runs
    Status,

    /// Show configuration, or update it with the given values
    Config {
        /// New default window size
        #[arg(long)]
        window_size: Option<f64>,

        /// New server port
        #[arg(long)]
        port: Option<u16>,

        /// New noise seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            seed,
            dataset_dir,
        } => {
            cmd_serve(port, seed, dataset_dir);
        }
        Commands::Datasets { seed, dataset_dir } => {
            cmd_datasets(seed, dataset_dir);
        }
        Commands::Window {
            series,
            window_size,
            center,
            seed,
            dataset_dir,
            json,
        } => {
            cmd_window(&series, window_size, center, seed, dataset_dir, json);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config {
            window_size,
            port,
            seed,
        } => {
            cmd_config(window_size, port, seed);
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signal_playground=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the data source once; every series is loaded before use.
fn load_source(
    config: &Config,
    seed: Option<u64>,
    dataset_dir: Option<PathBuf>,
) -> Result<DatasetStore, WindowError> {
    match dataset_dir.or_else(|| config.dataset_dir.clone()) {
        Some(dir) => {
            tracing::info!("Loading datasets from {:?}", dir);
            DatasetStore::snapshot(&JsonFileSource::new(dir))
        }
        None => DatasetStore::generate(seed.or(config.seed)),
    }
}

#[cfg(feature = "server")]
fn cmd_serve(port: Option<u16>, seed: Option<u64>, dataset_dir: Option<PathBuf>) {
    use signal_playground::core::DEFAULT_SERIES;
    use signal_playground::server::{run, ServerConfig};
    use std::sync::Arc;

    println!("Signal Playground v{VERSION}");
    println!();

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    // Every new session and every reset shows the default series.
    let store = match load_source(&config, seed, dataset_dir)
        .and_then(|store| store.fetch(DEFAULT_SERIES).map(|_| store))
    {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    println!("  Datasets: {}", store.names().join(", "));
    println!("  Default window size: {}", config.default_window_size.get());

    let activity = Arc::new(ActivityLog::open(config.activity_path()));
    let server_config = ServerConfig::new(port.unwrap_or(config.port), config.default_window_size)
        .with_session_limits(config.max_sessions, config.session_idle_secs);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting async runtime: {e}");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let source: Arc<dyn DataSource> = Arc::new(store);
        let (addr, shutdown_tx) = run(server_config, source, activity.clone()).await?;

        println!("  Listening on http://{addr}");
        println!();
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        anyhow::Ok(())
    });

    if let Err(e) = result {
        eprintln!("Server error: {e}");
    }

    if let Err(e) = activity.save() {
        eprintln!("Warning: Could not save activity log: {e}");
    }

    println!();
    println!("{}", activity.summary());
}

#[cfg(not(feature = "server"))]
fn cmd_serve(_port: Option<u16>, _seed: Option<u64>, _dataset_dir: Option<PathBuf>) {
    eprintln!("Error: serve requires the `server` feature at compile time");
    std::process::exit(1);
}

fn cmd_datasets(seed: Option<u64>, dataset_dir: Option<PathBuf>) {
    let config = Config::load().unwrap_or_default();
    let store = match load_source(&config, seed, dataset_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("{:<15} {:<5} {:>7}  range", "name", "axis", "points");
    for name in store.names() {
        match store.fetch(&name) {
            Ok(series) => {
                let kind = series.axis_kind();
                println!(
                    "{:<15} {:<5} {:>7}  {:.3}{unit} .. {:.3}{unit}",
                    name,
                    kind.key(),
                    series.len(),
                    series.origin(),
                    series.last(),
                    unit = kind.unit()
                );
            }
            Err(e) => eprintln!("{name}: {e}"),
        }
    }
}

fn cmd_window(
    name: &str,
    window_size: Option<f64>,
    center: Option<f64>,
    seed: Option<u64>,
    dataset_dir: Option<PathBuf>,
    json: bool,
) {
    let config = Config::load().unwrap_or_default();

    let window_size = match window_size {
        Some(value) => match WindowSize::new(value) {
            Ok(size) => size,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => config.default_window_size,
    };
    if let Some(c) = center.filter(|c| !c.is_finite()) {
        eprintln!("Error: center must be a finite number, got {c}");
        std::process::exit(1);
    }

    let series = match load_source(&config, seed, dataset_dir).and_then(|s| s.fetch(name)) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let window = compute_window(&series, window_size, center);

    if json {
        match serde_json::to_string_pretty(&window.to_payload()) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error serializing window: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let unit = series.axis_kind().unit();
    println!("{}", window.describe());
    println!();
    println!("  Bounds: {:.3}{unit} .. {:.3}{unit}", window.lower, window.upper);
    println!(
        "  Indices: [{}, {}) of {}",
        window.start(),
        window.end(),
        series.len()
    );
    println!("  Points: {}", window.len());
    if let (Some(first), Some(last)) = (window.axis().first(), window.axis().last()) {
        println!("  Axis: {first:.3}{unit} .. {last:.3}{unit}");
    } else {
        println!("  Axis: (empty window)");
    }
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Signal Playground Status");
    println!("========================");
    println!();

    println!("Configuration:");
    println!("  Port: {}", config.port);
    println!("  Default window size: {}", config.default_window_size.get());
    match config.seed {
        Some(seed) => println!("  Noise seed: {seed}"),
        None => println!("  Noise seed: random"),
    }
    println!();

    match ActivityLog::read_persisted(&config.activity_path()) {
        Some(persisted) => {
            let totals = &persisted.totals;
            println!("Cumulative Statistics:");
            println!("  Windows computed: {}", totals.windows_computed());
            println!("  Clicks: {}", totals.clicks());
            for interaction in Interaction::ALL {
                println!("  {}: {}", interaction.label(), totals.count(interaction));
            }
            println!(
                "  Last updated: {}",
                persisted.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
            );

            if !totals.series.is_empty() {
                println!();
                println!("{:<15} {:>8} {:>8} {:>8}", "dataset", "served", "windows", "clicks");
                for (name, usage) in &totals.series {
                    println!(
                        "{:<15} {:>8} {:>8} {:>8}",
                        name, usage.served, usage.windows, usage.clicks
                    );
                }
            }
        }
        None => println!("No previous session data found."),
    }
}

fn cmd_config(window_size: Option<f64>, port: Option<u16>, seed: Option<u64>) {
    let mut config = Config::load().unwrap_or_default();
    let changed = window_size.is_some() || port.is_some() || seed.is_some();

    if let Some(value) = window_size {
        if let Err(e) = config.set_default_window_size(value) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
    if let Some(port) = port {
        config.port = port;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    if changed {
        if let Err(e) = config.save() {
            eprintln!("Error saving config: {e}");
            std::process::exit(1);
        }
        println!("Configuration saved.");
        println!();
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
