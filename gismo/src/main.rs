//! Gismo daemon
//!
//! Starts in wandering mode. Type commands on stdin (`stop` for command
//! mode, `help` for the list); `exit` or Ctrl-C shuts down.

use gismo::app::{self, App};
use gismo::config::CliArgs;
use gismo::devices::create_device;
use gismo::{Error, Result, Robot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    let args = CliArgs::parse(std::env::args().skip(1));

    // Logging level comes from the config, so read it before the logger exists
    let config = args.load_config();
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::info!("Gismo v{} starting...", env!("CARGO_PKG_VERSION"));
    if std::path::Path::new(&args.config_path).exists() {
        log::info!("Using config: {}", args.config_path);
    } else {
        log::warn!(
            "Config file {} not found, using built-in defaults",
            args.config_path
        );
    }
    let config = config?;

    log::info!(
        "Device: {} ({})",
        config.device.name,
        config.device.device_type
    );

    let mut driver = create_device(&config)?;
    let hardware = driver.initialize()?;
    log::info!("Driver {} initialized", driver.name());

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut robot = Robot::new(config, hardware);
    if let Err(e) = robot.initialize() {
        log::error!("Initialization failed: {}", e);
        robot.cleanup();
        return Err(e);
    }

    let commands = app::spawn_stdin_reader()?;
    let mut app = App::new(robot);
    app.run(&commands, &running)?;

    log::info!("Gismo stopped");
    Ok(())
}
