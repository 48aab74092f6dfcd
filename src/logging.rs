use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("cannot open log file: {0}")]
    File(#[from] std::io::Error),
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Initializes the global `tracing` subscriber.
///
/// Logs never go to stdout, which carries the protocol. They go to the
/// configured log file (appended, no colours) or to stderr.
pub fn init_tracing(config: &ServerConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.log_filter).map_err(|source| LoggingError::Filter {
        filter: config.log_filter.clone(),
        source,
    })?;

    let (writer, ansi) = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}
