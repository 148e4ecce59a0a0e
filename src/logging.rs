use std::io::Write;
use file_lock::{FileLock, FileOptions};

pub trait Logger : Send + Sync {
    fn log(&self, message: String);
}

pub struct FileLogger {
    file_path: String,
}

impl FileLogger {
    pub fn new(file_name: String) -> Self {
        FileLogger {
            file_path: file_name
        }
    }
}

impl Logger for FileLogger {
    fn log(&self, message: String) {
        let options = FileOptions::new().write(true).append(true).create(true);

        let Ok(mut file_lock) = FileLock::lock(&self.file_path, true, options) else { return };
        let _ = file_lock.file.write_all(format_entry(&message).as_bytes());
    }
}

/// Writes log entries to stderr. Used when no log file is configured.
pub struct ConsoleLogger { }

impl Logger for ConsoleLogger {
    fn log(&self, message: String) {
        eprint!("{}", format_entry(&message));
    }
}

fn format_entry(message: &str) -> String {
    format!("{0}: {1}\n", chrono::Utc::now(), message)
}
