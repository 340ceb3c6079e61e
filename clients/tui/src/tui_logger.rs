use log::{Level, Log, Metadata, Record};
use std::sync::{Arc, Mutex};

/// Most records the shared buffer holds before dropping the oldest.
const MAX_BUFFERED: usize = 100;

/// Routes `log` records into a buffer the log pane drains every frame.
pub struct TuiLogger {
    log_buffer: Arc<Mutex<Vec<String>>>,
    level: Level,
}

impl TuiLogger {
    pub fn new(level: Level) -> (Self, Arc<Mutex<Vec<String>>>) {
        let log_buffer = Arc::new(Mutex::new(Vec::new()));
        (
            TuiLogger {
                log_buffer: log_buffer.clone(),
                level,
            },
            log_buffer,
        )
    }
}

impl Log for TuiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let msg = match record.level() {
                Level::Warn | Level::Error => format!("{}: {}", record.level(), record.args()),
                _ => format!("{}", record.args()),
            };
            if let Ok(mut buffer) = self.log_buffer.lock() {
                buffer.push(msg);
                if buffer.len() > MAX_BUFFERED {
                    buffer.remove(0);
                }
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(logger: &TuiLogger, level: Level, msg: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .args(format_args!("{msg}"))
                .build(),
        );
    }

    #[test]
    fn test_records_reach_the_buffer() {
        let (logger, buffer) = TuiLogger::new(Level::Info);
        emit(&logger, Level::Info, "Bet 100 placed");
        emit(&logger, Level::Warn, "Dealer draw skipped");
        emit(&logger, Level::Debug, "Dealer draws 7♠");

        let lines = buffer.lock().unwrap().clone();
        assert_eq!(lines, vec!["Bet 100 placed", "WARN: Dealer draw skipped"]);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let (logger, buffer) = TuiLogger::new(Level::Info);
        for i in 0..MAX_BUFFERED + 5 {
            emit(&logger, Level::Info, &i.to_string());
        }

        let lines = buffer.lock().unwrap();
        assert_eq!(lines.len(), MAX_BUFFERED);
        assert_eq!(lines[0], "5");
    }
}
