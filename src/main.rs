use clap::Parser;
use listly::cli::{self, Cli};
use listly::core::config::{self, ResolvedConfig};
use listly::core::error::Result;
use listly::core::store::Store;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::{self, File};
use std::io;

fn main() {
    let args = Cli::parse();
    dotenv::dotenv().ok();

    if let Err(e) = run(args) {
        eprintln!("Abort! {e}");
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    // A malformed config file aborts; the log file location depends on it.
    let config = config::load_config()?;
    let overrides = args.overrides();

    // The stored key binding path lives in the database, which lives in the
    // data dir, so resolve once without it and once with it.
    let resolved = config::resolve(&config, &overrides, None);
    fs::create_dir_all(&resolved.data_dir)?;
    init_logging(&resolved);
    match config::config_path() {
        Some(path) => log::info!("Config from {}", path.display()),
        None => log::warn!("Could not determine config directory, using default config"),
    }
    log::debug!("Config: {:?}", config);

    let mut store = Store::open(&resolved.data_dir)?;
    let stored_keymap = store.keymap_path()?;
    let resolved = config::resolve(&config, &overrides, stored_keymap.as_deref());

    log::info!(
        "listly starting up (data dir {}, key bindings {:?})",
        resolved.data_dir.display(),
        resolved.keymap_file
    );

    cli::run(args.command, &mut store, &resolved, &mut io::stdout())
}

/// Append to `listly.log` in the data dir. Logging is best effort.
fn init_logging(resolved: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let file = File::options()
        .create(true)
        .append(true)
        .open(resolved.log_path());
    if let Ok(log_file) = file {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }
}
