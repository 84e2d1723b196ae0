use log::info;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};

/// Maps a loglevel string to a filter. `None` means the default (info);
/// "off"/"none" disable logging.
pub fn level_filter(loglevel: Option<&str>) -> Result<LevelFilter, String> {
    match loglevel {
        None => Ok(LevelFilter::Info),
        Some(level) => match level {
            "debug" => Ok(LevelFilter::Debug),
            "info" => Ok(LevelFilter::Info),
            "warn" => Ok(LevelFilter::Warn),
            "error" => Ok(LevelFilter::Error),
            "off" | "none" => Ok(LevelFilter::Off),
            other => Err(format!(
                "loglevel must be debug, info, warn, error, off or none, got {}",
                other
            )),
        },
    }
}

/// Installs a terminal logger for the `log` macros used across the crate.
///
/// A logger can only be installed once per process; a second call returns the
/// error from `simplelog` and leaves the first logger in place.
pub fn init_logger(loglevel: Option<&str>) -> Result<(), String> {
    let filter = level_filter(loglevel)?;
    if filter == LevelFilter::Off {
        return Ok(());
    }
    CombinedLogger::init(vec![TermLogger::new(
        filter,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .map_err(|e| e.to_string())?;
    info!("logger started with loglevel: {}", filter);
    Ok(())
}
