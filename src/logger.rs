use serde_json::{Map, Value};
use std::fmt::Display;
use std::rc::Rc;
use time::OffsetDateTime;

const SERVICE_NAME: &str = "site-behaviors";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Logger {
    env: Rc<str>,
    host: Rc<str>,
    min_level: LogLevel,
}

impl Logger {
    pub fn new(env: &str, host: &str, min_level: LogLevel) -> Self {
        Self {
            env: Rc::from(env),
            host: Rc::from(host),
            min_level,
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn info(&self, event: &str, context: impl Into<Value>) {
        self.emit(LogLevel::Info, event, context);
    }

    pub fn warn(&self, event: &str, context: impl Into<Value>) {
        self.emit(LogLevel::Warn, event, context);
    }

    pub fn error(&self, event: &str, context: impl Into<Value>) {
        self.emit(LogLevel::Error, event, context);
    }

    pub fn debug(&self, event: &str, context: impl Into<Value>) {
        self.emit(LogLevel::Debug, event, context);
    }

    /// Builds the JSON record for `event`, or `None` when `level` is filtered out.
    pub fn record(&self, level: LogLevel, event: &str, context: impl Into<Value>) -> Option<Value> {
        if level > self.min_level {
            return None;
        }
        let mut payload = Map::new();
        payload.insert("timestamp".to_string(), Value::String(timestamp()));
        payload.insert("service".to_string(), Value::String(SERVICE_NAME.to_string()));
        payload.insert("env".to_string(), Value::String(self.env.to_string()));
        payload.insert("host".to_string(), Value::String(self.host.to_string()));
        payload.insert("level".to_string(), Value::String(level.as_str().to_string()));
        payload.insert("event".to_string(), Value::String(event.to_string()));

        match context.into() {
            Value::Object(map) => {
                for (key, value) in map {
                    payload.insert(key, value);
                }
            }
            Value::Null => {}
            other => {
                payload.insert("context".to_string(), other);
            }
        }
        Some(Value::Object(payload))
    }

    fn emit(&self, level: LogLevel, event: &str, context: impl Into<Value>) {
        let Some(record) = self.record(level, event, context) else {
            return;
        };
        write_line(level, &record.to_string());
    }
}

pub fn log_error<E: Display>(logger: &Logger, event: &str, error: E) {
    logger.error(
        event,
        Value::Object(Map::from_iter([(
            "error".to_string(),
            Value::String(error.to_string()),
        )])),
    );
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn write_line(level: LogLevel, message: &str) {
    let message = wasm_bindgen::JsValue::from_str(message);
    match level {
        LogLevel::Error => web_sys::console::error_1(&message),
        LogLevel::Warn => web_sys::console::warn_1(&message),
        LogLevel::Info => web_sys::console::info_1(&message),
        LogLevel::Debug => web_sys::console::debug_1(&message),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_line(level: LogLevel, message: &str) {
    match level {
        LogLevel::Error | LogLevel::Warn => eprintln!("{message}"),
        _ => println!("{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_levels_leniently() {
        assert_eq!(LogLevel::parse("WARNING"), LogLevel::Warn);
        assert_eq!(LogLevel::parse(" debug "), LogLevel::Debug);
        assert_eq!(LogLevel::parse("verbose"), LogLevel::Info);
    }

    #[test]
    fn filters_below_minimum_level() {
        let logger = Logger::new("test", "localhost", LogLevel::Warn);
        assert!(logger.record(LogLevel::Info, "toc.build", json!({})).is_none());
        assert!(logger.record(LogLevel::Error, "toc.build", json!({})).is_some());
    }

    #[test]
    fn merges_object_context_into_record() {
        let logger = Logger::new("test", "localhost", LogLevel::Debug);
        let record = logger
            .record(LogLevel::Info, "theme.apply", json!({ "theme": "night" }))
            .unwrap();
        assert_eq!(record["service"], "site-behaviors");
        assert_eq!(record["level"], "info");
        assert_eq!(record["event"], "theme.apply");
        assert_eq!(record["theme"], "night");
        assert_eq!(record["host"], "localhost");
    }

    #[test]
    fn wraps_scalar_context() {
        let logger = Logger::new("test", "localhost", LogLevel::Debug);
        let record = logger
            .record(LogLevel::Debug, "mascot.speak", json!("hello"))
            .unwrap();
        assert_eq!(record["context"], "hello");
    }
}
