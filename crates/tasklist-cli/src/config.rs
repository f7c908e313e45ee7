// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tasklist_app::ListVariant;
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub csv_path: Option<String>,
    pub strict_header: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub variant: Option<ListVariant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub dir: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TASKLIST_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TASKLIST_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(tasklist_csv::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [storage], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(csv_path) = &self.storage.csv_path {
            tasklist_csv::validate_csv_path(csv_path)
                .with_context(|| format!("storage.csv_path in {}", path.display()))?;
        }

        if let Some(level) = &self.log.level
            && EnvFilter::try_new(level).is_err()
        {
            bail!(
                "log.level in {} is not a valid filter, got {:?}; use one of error, warn, info, debug, trace",
                path.display(),
                level
            );
        }

        if let Some(dir) = &self.log.dir
            && dir.trim().is_empty()
        {
            bail!("log.dir in {} must not be empty", path.display());
        }

        Ok(())
    }

    /// `[storage].csv_path` wins over `TASKLIST_CSV_PATH`, which wins over the
    /// platform data directory.
    pub fn csv_path(&self) -> Result<PathBuf> {
        match &self.storage.csv_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => tasklist_csv::default_csv_path(),
        }
    }

    pub fn strict_header(&self) -> bool {
        self.storage.strict_header.unwrap_or(false)
    }

    pub fn variant(&self) -> ListVariant {
        self.ui.variant.unwrap_or(ListVariant::Tasks)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.log.dir {
            return Ok(PathBuf::from(dir));
        }
        let state_root = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .ok_or_else(|| anyhow!("cannot resolve log directory; set [log].dir in the config"))?;
        Ok(state_root.join(tasklist_csv::APP_NAME).join("logs"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tasklist config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is the platform data dir (for example ~/.local/share/tasklist/{})\n# csv_path = \"/absolute/path/to/todos.csv\"\n# Reject files whose first line is not `Task,Status`\nstrict_header = false\n\n[ui]\n# tasks or contacts\nvariant = \"tasks\"\n\n[log]\n# tracing filter; TASKLIST_LOG overrides it\nlevel = \"{}\"\n# dir = \"/absolute/path/to/logs\"\n",
            path.display(),
            tasklist_csv::DEFAULT_CSV_FILE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use tasklist_app::ListVariant;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.variant(), ListVariant::Tasks);
        assert!(!config.strict_header());
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\nvariant = \"tasks\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[storage], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[storage]\ncsv_path = \"/data/todos.csv\"\nstrict_header = true\n[ui]\nvariant = \"contacts\"\n[log]\nlevel = \"tasklist_app=debug,warn\"\ndir = \"/var/log/tasklist\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.csv_path()?, PathBuf::from("/data/todos.csv"));
        assert!(config.strict_header());
        assert_eq!(config.variant(), ListVariant::Contacts);
        assert_eq!(config.log_level(), "tasklist_app=debug,warn");
        assert_eq!(config.log_dir()?, PathBuf::from("/var/log/tasklist"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 3\n")?;
        let error = Config::load(&path).expect_err("v3 config should fail");
        assert!(error.to_string().contains("unsupported config version 3"));
        Ok(())
    }

    #[test]
    fn unknown_variant_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nvariant = \"notes\"\n")?;
        let error = Config::load(&path).expect_err("notes is not a list variant");
        let message = format!("{error:#}");
        assert!(message.contains("decode config"), "{message}");
        assert!(message.contains("notes"), "{message}");
        Ok(())
    }

    #[test]
    fn bad_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"tasklist=loud\"\n")?;
        let error = Config::load(&path).expect_err("filter should not parse");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn csv_path_rejects_uri_and_directory_values() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ncsv_path = \"https://example.com/todos.csv\"\n")?;
        let error = Config::load(&path).expect_err("URI csv_path should fail validation");
        assert!(format!("{error:#}").contains("looks like a URI"));

        let (_temp, path) = write_config("version = 1\n[storage]\ncsv_path = \"/data/\"\n")?;
        let error = Config::load(&path).expect_err("directory csv_path should fail validation");
        assert!(format!("{error:#}").contains("names a directory"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TASKLIST_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TASKLIST_CONFIG_PATH");
        }
        assert_eq!(resolved?, override_path);
        Ok(())
    }

    #[test]
    fn csv_path_prefers_storage_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[storage]\ncsv_path = \"/explicit/from-config.csv\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TASKLIST_CSV_PATH", "/from/env.csv");
        }
        let resolved = Config::load(&path).and_then(|config| config.csv_path());
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TASKLIST_CSV_PATH");
        }
        assert_eq!(resolved?, PathBuf::from("/explicit/from-config.csv"));
        Ok(())
    }

    #[test]
    fn csv_path_uses_env_override_when_storage_csv_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TASKLIST_CSV_PATH", "/from/env-only.csv");
        }
        let resolved = Config::load(&path).and_then(|config| config.csv_path());
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TASKLIST_CSV_PATH");
        }
        assert_eq!(resolved?, PathBuf::from("/from/env-only.csv"));
        Ok(())
    }

    #[test]
    fn example_config_loads_cleanly() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[storage]"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("[log]"));

        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.variant(), ListVariant::Tasks);
        Ok(())
    }
}
