// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tasklist_app::{Persistence, Record};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::codec::{self, HeaderPolicy, TASK_HEADER};

pub const APP_NAME: &str = "tasklist";
pub const DEFAULT_CSV_FILE: &str = "todos.csv";

/// Task list storage backed by one CSV file per path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvStorage {
    header: [String; 2],
    policy: HeaderPolicy,
}

impl Default for CsvStorage {
    fn default() -> Self {
        Self::new(TASK_HEADER)
    }
}

impl CsvStorage {
    pub fn new(header: [&str; 2]) -> Self {
        Self {
            header: header.map(str::to_owned),
            policy: HeaderPolicy::Skip,
        }
    }

    pub fn with_strict_header(mut self, strict: bool) -> Self {
        self.policy = if strict {
            HeaderPolicy::Require(self.header.clone())
        } else {
            HeaderPolicy::Skip
        };
        self
    }

    pub fn policy(&self) -> &HeaderPolicy {
        &self.policy
    }

    fn header(&self) -> [&str; 2] {
        [self.header[0].as_str(), self.header[1].as_str()]
    }
}

impl Persistence for CsvStorage {
    fn load(&self, path: &Path) -> Result<Vec<Record>> {
        load_file(path, &self.policy)
    }

    fn save(&self, path: &Path, records: &[Record]) -> Result<()> {
        let text = codec::encode(self.header(), records)?;
        write_atomic(path, &text)
    }
}

pub fn load_file(path: &Path, policy: &HeaderPolicy) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path).with_context(|| {
        format!(
            "read CSV file {}; create it with `tasklist --init` or point [storage].csv_path at an existing file",
            path.display()
        )
    })?;
    let records = codec::decode(&text, policy)
        .with_context(|| format!("decode CSV file {}", path.display()))?;
    debug!(path = %path.display(), rows = records.len(), "csv decoded");
    Ok(records)
}

/// Replaces `path` with `contents` by writing a sibling temp file and renaming
/// it over the target. The previous file is untouched if any step fails, and a
/// replaced file keeps its permissions.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(&dir).with_context(|| format!("create directory {}", dir.display()))?;

    let mut temp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    temp.write_all(contents.as_bytes())
        .with_context(|| format!("write temp file for {}", path.display()))?;
    if let Ok(existing) = fs::metadata(path)
        && existing.is_file()
    {
        temp.as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("copy permissions of {}", path.display()))?;
    }
    temp.as_file()
        .sync_all()
        .with_context(|| format!("sync temp file for {}", path.display()))?;
    temp.persist(path)
        .map_err(|error| error.error)
        .with_context(|| format!("replace {}", path.display()))?;

    debug!(path = %path.display(), bytes = contents.len(), "csv written");
    Ok(())
}

/// Writes a header-only file when nothing exists at `path`. Returns whether a
/// file was created.
pub fn init_file(path: &Path, header: [&str; 2]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    write_atomic(path, &codec::encode(header, &[])?)?;
    Ok(true)
}

pub fn default_csv_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("TASKLIST_CSV_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set TASKLIST_CSV_PATH to a writable CSV path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join(DEFAULT_CSV_FILE))
}

pub fn validate_csv_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        bail!("CSV path must not be empty");
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "CSV path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.ends_with('/') || path.ends_with(std::path::MAIN_SEPARATOR) {
        bail!("CSV path {path:?} names a directory; add a file name such as {DEFAULT_CSV_FILE}");
    }

    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::{parent_dir, validate_csv_path};
    use std::path::{Path, PathBuf};

    #[test]
    fn bare_file_name_uses_current_dir() {
        assert_eq!(parent_dir(Path::new("todos.csv")), PathBuf::from("."));
        assert_eq!(
            parent_dir(Path::new("output/todos.csv")),
            PathBuf::from("output")
        );
    }

    #[test]
    fn validate_csv_path_rejects_uris_and_directories() {
        assert!(validate_csv_path("").is_err());
        assert!(validate_csv_path("https://example.com/todos.csv").is_err());
        assert!(validate_csv_path("output/").is_err());
        assert!(validate_csv_path("output/todos.csv").is_ok());
        assert!(validate_csv_path("C:\\todos.csv").is_ok());
    }
}
