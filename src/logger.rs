// Logger that mirrors records to stderr and persists warn+ lines to
// trawl.log, with a panic hook so crashes end up in the file too.

use lazy_static::lazy_static;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::backtrace::Backtrace;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

const LOG_FILE_NAME: &str = "trawl.log";

lazy_static! {
    // stderr mirror defaults on; TRAWL_LOG_STDERR=0 silences the terminal
    static ref MIRROR_STDERR: bool = std::env::var("TRAWL_LOG_STDERR")
        .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
        .unwrap_or(true);

    // Opened lazily on the first persisted record
    static ref LOG_SINK: Mutex<Option<File>> = Mutex::new(
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(LOG_FILE_NAME)
            .ok()
    );
}

struct FileLogger;

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] {:<5} {}: {}",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if *MIRROR_STDERR {
            eprintln!("{line}");
        }
        // Only warn and error are worth keeping across runs
        if record.level() <= Level::Warn {
            append_to_file(&line);
        }
    }

    fn flush(&self) {
        if let Ok(mut sink) = LOG_SINK.lock() {
            if let Some(f) = sink.as_mut() {
                let _ = f.flush();
            }
        }
    }
}

/// Install the logger, pick the level from `RUST_LOG` (default info) and
/// hook panics so they land in the log file with a backtrace.
pub fn init() {
    let _ = log::set_boxed_logger(Box::new(FileLogger));
    let level = level_from_env().unwrap_or(LevelFilter::Info);
    log::set_max_level(level);
    install_panic_hook();
    log::info!("logging ready: level={level}, warn+ persisted to {LOG_FILE_NAME}");
}

// Bare level names parse directly; module directives like "trawl=debug"
// degrade to a scan for the level word.
fn level_from_env() -> Option<LevelFilter> {
    let spec = std::env::var("RUST_LOG").ok()?.trim().to_ascii_lowercase();
    if let Ok(level) = spec.parse::<LevelFilter>() {
        return Some(level);
    }
    [
        LevelFilter::Trace,
        LevelFilter::Debug,
        LevelFilter::Info,
        LevelFilter::Warn,
        LevelFilter::Error,
        LevelFilter::Off,
    ]
    .into_iter()
    .find(|level| spec.contains(&level.as_str().to_ascii_lowercase()))
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn append_to_file(line: &str) {
    if let Ok(mut sink) = LOG_SINK.lock() {
        if let Some(f) = sink.as_mut() {
            let _ = writeln!(f, "{line}");
            let _ = f.flush();
        }
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let msg = info.payload_as_str().unwrap_or("Box<dyn Any>");
        let loc = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let bt = Backtrace::force_capture();
        append_to_file(&format!("[{}] PANIC at {loc}: {msg}", timestamp()));
        for line in format!("{bt:?}").lines() {
            append_to_file(line);
        }
        log::error!("panic at {loc}: {msg}\n{bt:?}");
    }));
}
