use std::fmt::Debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    pub target: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn format_compact(&self) -> String {
        let message = self
            .fields
            .iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value.as_str())
            .unwrap_or("");
        let mut extras: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, _)| name != "message")
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        extras.sort();
        if extras.is_empty() {
            format!(
                "{} {:<5} {} {}",
                self.timestamp, self.level, self.target, message
            )
        } else {
            format!(
                "{} {:<5} {} {} | {}",
                self.timestamp,
                self.level,
                self.target,
                message,
                extras.join(" ")
            )
        }
    }
}

#[derive(Clone)]
pub struct FileLogLayer {
    file: Arc<Mutex<File>>,
}

impl FileLogLayer {
    pub fn new(file: File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<S> Layer<S> for FileLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LogVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        let entry = LogEntry {
            timestamp: format_timestamp(OffsetDateTime::now_utc()),
            level: *metadata.level(),
            target: metadata.target().to_string(),
            fields: visitor.fields,
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", entry.format_compact());
        }
    }
}

#[derive(Default)]
struct LogVisitor {
    fields: Vec<(String, String)>,
}

impl LogVisitor {
    fn push(&mut self, field: &tracing::field::Field, value: String) {
        self.fields.push((field.name().to_string(), value));
    }
}

impl tracing::field::Visit for LogVisitor {
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.push(field, value.to_string());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.push(field, value.to_string());
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn Debug) {
        self.push(field, format!("{value:?}"));
    }
}

pub fn init(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (file_layer, file_error) = match log_file.map(|path| (path, FileLogLayer::open(path))) {
        Some((_, Ok(layer))) => (Some(layer), None),
        Some((path, Err(err))) => (None, Some((path, err))),
        None => (None, None),
    };
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return;
    }
    if let Some((path, err)) = file_error {
        warn!(path = %path.display(), error = %err, "log file unavailable, logging to console only");
    }
}

pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    let format = time::format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")
        .unwrap_or_else(|_| time::format_description::parse("[second]").unwrap());
    timestamp
        .format(&format)
        .unwrap_or_else(|_| timestamp.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing::info;

    #[test]
    fn format_compact_includes_fields() {
        let entry = LogEntry {
            timestamp: "2021-03-08 12:34:56".to_string(),
            level: Level::INFO,
            target: "ado_cli::cli".to_string(),
            fields: vec![
                ("message".to_string(), "hello".to_string()),
                ("project".to_string(), "MyADOProject".to_string()),
            ],
        };

        let formatted = entry.format_compact();
        assert!(formatted.starts_with("2021-03-08 12:34:56 INFO "));
        assert!(formatted.contains("ado_cli::cli"));
        assert!(formatted.contains("hello"));
        assert!(formatted.ends_with("| project=MyADOProject"));
    }

    #[test]
    fn format_timestamp_uses_date_and_time() {
        let timestamp = OffsetDateTime::from_unix_timestamp(1_615_206_896).unwrap();
        assert_eq!(format_timestamp(timestamp), "2021-03-08 12:34:56");
    }

    #[test]
    fn file_layer_appends_across_runs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("logs").join("ado-repos.log");

        for run in 0..2 {
            let layer = FileLogLayer::open(&path).unwrap();
            let subscriber = tracing_subscriber::registry().with(layer);
            tracing::subscriber::with_default(subscriber, || {
                info!(run, "starting ado-repos");
            });
        }

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("starting ado-repos | run=0"));
        assert!(lines[1].contains("run=1"));
    }
}
