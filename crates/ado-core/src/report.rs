use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

pub const HEADER: [&str; 2] = ["RepoUrl", "ProjectName"];

const NAME_FIELD: &str = "name";
const URL_FIELD: &str = "webUrl";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("open report file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("repository response is not a JSON object")]
    NotAnObject,
    #[error("write report row")]
    Write(#[from] csv::Error),
    #[error("flush report file")]
    Flush(#[source] io::Error),
}

/// Traversal stops at the first top-level field that is not a list or the
/// first element that is not an object; every variant is a successful report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraversalEnd {
    Complete,
    TrailingField { field: String },
    NonRecordElement { field: String, index: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOutcome {
    pub rows: usize,
    pub end: TraversalEnd,
}

#[derive(Default)]
struct PendingRow {
    name: String,
    web_url: String,
}

impl PendingRow {
    fn take(&mut self) -> [String; 2] {
        [
            std::mem::take(&mut self.name),
            std::mem::take(&mut self.web_url),
        ]
    }
}

pub fn write_report(data: &Value, path: &Path) -> Result<ReportOutcome, ReportError> {
    ensure_parent_dir(path);
    info!(path = %path.display(), "opening report file");
    let file = File::create(path).map_err(|source| ReportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(data, file)
}

pub fn write_rows<W: Write>(data: &Value, out: W) -> Result<ReportOutcome, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);
    let result = writer
        .write_record(HEADER)
        .map_err(ReportError::from)
        .and_then(|()| traverse(data, &mut writer));
    let flushed = writer.flush();
    let outcome = result?;
    flushed.map_err(ReportError::Flush)?;
    Ok(outcome)
}

fn traverse<W: Write>(
    data: &Value,
    writer: &mut csv::Writer<W>,
) -> Result<ReportOutcome, ReportError> {
    let entries = data.as_object().ok_or(ReportError::NotAnObject)?;
    let mut pending = PendingRow::default();
    let mut rows = 0;

    for (field, value) in entries {
        let Some(items) = value.as_array() else {
            warn!(field = %field, rows, "reached end of repository data at non-list field");
            return Ok(ReportOutcome {
                rows,
                end: TraversalEnd::TrailingField {
                    field: field.clone(),
                },
            });
        };
        for (index, item) in items.iter().enumerate() {
            let Some(record) = item.as_object() else {
                warn!(field = %field, index, rows, "reached end of repository data at non-object element");
                return Ok(ReportOutcome {
                    rows,
                    end: TraversalEnd::NonRecordElement {
                        field: field.clone(),
                        index,
                    },
                });
            };
            for (key, value) in record {
                match key.as_str() {
                    NAME_FIELD => {
                        pending.name = coerce(value);
                        info!(key = %key, value = %pending.name, "stashed repository field");
                    }
                    URL_FIELD => {
                        pending.web_url = coerce(value);
                        info!(key = %key, value = %pending.web_url, "stashed repository field");
                        writer.write_record(pending.take())?;
                        rows += 1;
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(ReportOutcome {
        rows,
        end: TraversalEnd::Complete,
    })
}

fn coerce(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn ensure_parent_dir(path: &Path) {
    let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) else {
        return;
    };
    if parent.is_dir() {
        return;
    }
    match fs::create_dir_all(parent) {
        Ok(()) => info!(dir = %parent.display(), "created output directory"),
        Err(err) => error!(dir = %parent.display(), error = %err, "creating output directory failed"),
    }
}
