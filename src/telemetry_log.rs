//! Append-only CSV log of every message the beacon builds.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

/// Sink for one `date,time,message` line per collection cycle.
pub trait LogSink {
    fn append(&mut self, date_utc: u32, t_utc: f64, message_text: &str);
}

/// File-backed sink. Write failures are logged and swallowed; a full or
/// missing card must not stop the beacon.
pub struct CsvLogSink {
    path: PathBuf,
}

impl CsvLogSink {
    pub fn new(path: impl Into<PathBuf>) -> CsvLogSink {
        CsvLogSink { path: path.into() }
    }
}

impl LogSink for CsvLogSink {
    fn append(&mut self, date_utc: u32, t_utc: f64, message_text: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{},{},{}", date_utc, t_utc, message_text));

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "telemetry log write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_csv_lines() {
        let dir = std::env::temp_dir().join("wsprbeacon-log-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("log.csv");
        let _ = std::fs::remove_file(&path);

        let mut sink = CsvLogSink::new(&path);
        sink.append(250614, 101910.0, "W6NXP DM04 10");
        sink.append(250614, 102110.0, "QF5NUJ JB52 23");

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["250614,101910,W6NXP DM04 10", "250614,102110,QF5NUJ JB52 23"]);
    }
}
