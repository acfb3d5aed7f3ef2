use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::response::ApiResponse;

pub const DEFAULT_RESPONSES_DIR: &str = "responses";

const RESPONSE_LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

pub fn response_log_path(dir: &Path, timestamp: NaiveDateTime) -> PathBuf {
    dir.join(format!(
        "response_{}.json",
        timestamp.format(RESPONSE_LOG_TIMESTAMP_FORMAT)
    ))
}

// Same-second calls share a file name; the later write wins.
pub fn write_response_log(dir: &Path, response: &ApiResponse) -> anyhow::Result<PathBuf> {
    let path = response_log_path(dir, Local::now().naive_local());
    write_response_log_at(&path, response)?;
    Ok(path)
}

pub fn write_response_log_at(path: &Path, response: &ApiResponse) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    response
        .serialize(&mut serializer)
        .with_context(|| format!("failed to encode {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
