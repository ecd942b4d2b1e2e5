use std::env;
use std::io::Write;

use log::{self, LevelFilter, Metadata, Record};

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{} {} - {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

/// Level named by the `BATTLESHIP_LOG` environment variable, if valid.
pub fn env_level() -> Option<LevelFilter> {
    env::var("BATTLESHIP_LOG")
        .ok()
        .and_then(|lvl| lvl.parse().ok())
}

/// Install the stderr logger. `level` wins over `BATTLESHIP_LOG`; both absent
/// means `info`. Calling this twice keeps the first logger.
pub fn init_logging(level: Option<LevelFilter>) {
    let level = level.or_else(env_level).unwrap_or(LevelFilter::Info);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}
