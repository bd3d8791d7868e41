use std::sync::OnceLock;

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Writes `[time][level][prefix][file:line] message` lines to stderr so the
/// batch report on stdout stays clean.
pub struct Logger {
  prefix: Option<String>,
}

impl Logger {
  fn new(prefix: Option<String>) -> Self {
    Self { prefix }
  }
}

impl Log for Logger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= log::max_level()
  }

  fn log(&self, record: &Record) {
    if !self.enabled(record.metadata()) {
      return;
    }
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let file = record.file().unwrap_or("?");
    let file_name = file.rsplit(['/', '\\']).next().unwrap_or(file);
    let line = record.line().unwrap_or(0);
    match self.prefix {
      Some(ref prefix) => eprintln!(
        "[{}][{}][{}][{}:{}] {}",
        timestamp,
        record.level(),
        prefix,
        file_name,
        line,
        record.args()
      ),
      None => eprintln!("[{}][{}][{}:{}] {}", timestamp, record.level(), file_name, line, record.args()),
    }
  }

  fn flush(&self) {}
}

pub fn init_logger(prefix: Option<String>, level: LevelFilter) -> Result<(), SetLoggerError> {
  let logger = LOGGER.get_or_init(|| Logger::new(prefix));
  log::set_logger(logger)?;
  log::set_max_level(level);
  Ok(())
}

pub fn level_for(verbosity: u8) -> LevelFilter {
  match verbosity {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  }
}
