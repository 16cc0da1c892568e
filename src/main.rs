pub mod compare;
pub mod config;
pub mod deviation;
pub mod error;
pub mod fv_core;
pub mod render;
pub mod report;
pub mod solver;

use config::SodConfig;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

fn init_logger() -> Result<(), error::SodError> {
    let level = if std::env::var_os("SOD_COMPARE_DEBUG").is_some() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    TermLogger::init(level, log_config, TerminalMode::Stdout, ColorChoice::Auto)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger()?;

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading configuration from {}", path);
            SodConfig::from_json_file(&path)?
        }
        None => SodConfig::default(),
    };

    compare::run(&config)?;
    Ok(())
}
