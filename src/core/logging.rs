//! Logging setup on top of flexi_logger
//!
//! Library code logs through the `log` facade only; the binary calls
//! [`init_logging`] once at startup.

use std::io::Write;

// Global static logger handle for runtime reconfiguration
static LOGGER_HANDLE: std::sync::OnceLock<parking_lot::Mutex<flexi_logger::LoggerHandle>> =
    std::sync::OnceLock::new();

/// Output format selected with `--log-format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Timestamp, level, message
    #[default]
    Text,
    /// Text plus the source location of the log call
    Ext,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Unrecognised names fall back to text.
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            Some("json") => LogFormat::Json,
            Some("ext") => LogFormat::Ext,
            _ => LogFormat::Text,
        }
    }
}

pub fn init_logging(
    log_level: Option<&str>,
    log_format: Option<&str>,
    log_file: Option<&str>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let level_str = log_level.unwrap_or("info");
    let mut logger = Logger::try_with_str(level_str)?;

    logger = match (LogFormat::parse(log_format), color_enabled) {
        (LogFormat::Json, _) => logger.format(json_format),
        (LogFormat::Ext, true) => logger.format(extended_color_format),
        (LogFormat::Ext, false) => logger.format(extended_format),
        (LogFormat::Text, true) => logger.format(simple_color_format),
        (LogFormat::Text, false) => logger.format(simple_format),
    };

    if let Some(file_path) = log_file {
        let file_spec = FileSpec::try_from(std::path::Path::new(file_path))?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(parking_lot::Mutex::new(handle));

    Ok(())
}

/// Change the log level of a running logger
///
/// Only the level can change at runtime; format, file and colour are fixed
/// when the logger starts.
pub fn reconfigure_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    match LOGGER_HANDLE.get() {
        Some(handle) => {
            handle.lock().parse_and_push_temp_spec(log_level)?;
            Ok(())
        }
        None => Err("Logger handle not initialised. Call init_logging first.".into()),
    }
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn level_colored(level: log::Level) -> colored::ColoredString {
    use colored::Colorize;

    let abbr = level_abbr(level);
    match level {
        log::Level::Error => abbr.red().bold(),
        log::Level::Warn => abbr.yellow(),
        log::Level::Info => abbr.green(),
        log::Level::Debug => abbr.blue(),
        log::Level::Trace => abbr.magenta(),
    }
}

// Format: "YYYY-MM-DD HH:mm:ss.fff INF message"
fn simple_format(
    w: &mut dyn Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args()
    )
}

fn simple_color_format(
    w: &mut dyn Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored(record.level()),
        record.args()
    )
}

// Format: "YYYY-MM-DD HH:mm:ss.fff INF message (scheduler/manager.rs:42)"
fn extended_format(
    w: &mut dyn Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn extended_color_format(
    w: &mut dyn Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let json_obj = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
    });

    match serde_json::to_string(&json_obj) {
        Ok(json_string) => w.write_all(json_string.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

/// Convert `seda::scheduler::manager` to `scheduler/manager.rs:LINE`
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = match target.strip_prefix("seda::") {
        Some(module) => module.replace("::", "/") + ".rs",
        None => target.replace("::", "/"),
    };

    match line {
        Some(line_num) => format!("{}:{}", path_like, line_num),
        None => path_like,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexi_logger::DeferredNow;
    use serial_test::serial;

    fn render(
        format: fn(&mut dyn Write, &mut DeferredNow, &log::Record) -> Result<(), std::io::Error>,
        target: &str,
    ) -> String {
        let mut buffer = Vec::new();
        let mut now = DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Warn)
            .target(target)
            .line(Some(42))
            .args(format_args!("No worker available"))
            .build();

        format(&mut buffer, &mut now, &record).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_format_target_as_path() {
        assert_eq!(
            format_target_as_path("seda::scheduler::manager", Some(7)),
            "scheduler/manager.rs:7"
        );
        assert_eq!(format_target_as_path("other_crate::io", None), "other_crate/io");
    }

    #[test]
    fn test_extended_format_includes_location() {
        let output = render(extended_format, "seda::pool::resource_limiting");

        assert!(
            output.contains("WRN No worker available (pool/resource_limiting.rs:42)"),
            "unexpected output: {}",
            output
        );
    }

    #[test]
    fn test_simple_format_omits_location() {
        let output = render(simple_format, "seda::pool::resource_limiting");

        assert!(output.ends_with("WRN No worker available"), "got: {}", output);
    }

    #[test]
    fn test_json_format_is_single_object() {
        let output = render(json_format, "seda::queue::event_queue");
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["level"], "WRN");
        assert_eq!(value["message"], "No worker available");
        assert_eq!(value["target"], "queue/event_queue.rs:42");
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_log_format_parse_falls_back_to_text() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("ext")), LogFormat::Ext);
        assert_eq!(LogFormat::parse(Some("xml")), LogFormat::Text);
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
    }

    #[test]
    #[serial]
    fn test_init_then_reconfigure() {
        // A second init in the same process fails; either outcome leaves a logger installed
        let first = init_logging(Some("info"), Some("ext"), None, false);
        if first.is_ok() {
            reconfigure_logging("debug").unwrap();
        }
        log::debug!("logging initialised for tests");
    }
}
