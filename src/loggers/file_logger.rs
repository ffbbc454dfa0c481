use log::{info, LevelFilter};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::errors::LoggerError;

/// Logs to `log/{utc date}.log`. `debug_logging_enabled` lowers the root level to debug.
pub fn init_file_logger(debug_logging_enabled: bool) -> Result<(), LoggerError> {
    let current_date = chrono::offset::Utc::now().date_naive().to_string();
    let path = format!("log/{}.log", current_date);

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S)(utc)} {l} - {m}\n",
        )))
        .build(path)?;

    let level = if debug_logging_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(level))?;

    log4rs::init_config(config)?;
    info!("File logger initialized at level {}", level);

    Ok(())
}
