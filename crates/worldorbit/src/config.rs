use crate::events::AppEvent;
use async_channel::Sender;
use dialkit::{City, ConflictPolicy, LabelMetrics};
use directories::ProjectDirs;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_REFRESH: Duration = Duration::from_secs(60);

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cities: Vec<City>,
    #[serde(default)]
    pub label: LabelMetrics,
    #[serde(default)]
    pub conflict: ConflictPolicy,
    /// Interval between refreshes while watching.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_refresh")]
    pub refresh: Duration,
}

fn default_refresh() -> Duration {
    DEFAULT_REFRESH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cities: Vec::new(),
            label: LabelMetrics::default(),
            conflict: ConflictPolicy::default(),
            refresh: DEFAULT_REFRESH,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "worldorbit", "worldorbit")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("WORLDORBIT").separator("__"))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// The selection shipped in `default_config.toml`.
pub fn builtin() -> Config {
    parse_toml(DEFAULT_CONFIG).unwrap_or_else(|e| {
        log::error!("Bundled config is invalid: {}", e);
        Config::default()
    })
}

fn parse_toml(source: &str) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(source, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// User config when present and valid, the bundled selection otherwise.
pub fn load_or_default() -> Config {
    match get_config_path() {
        Ok(path) => load_or_default_from(&path),
        Err(e) => {
            log::error!("Failed to locate config, using bundled cities: {}", e);
            builtin()
        }
    }
}

/// Same fallback rules as [`load_or_default`] for an explicit path. Also used on
/// reload, so a deleted file brings back the bundled cities.
pub fn load_or_default_from(path: &Path) -> Config {
    if !path.exists() {
        log::info!("No config at {}, using bundled cities", path.display());
        return builtin();
    }

    match load_config_from(path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using bundled cities: {}", e);
            builtin()
        }
    }
}

pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = get_config_path()?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

fn touches_config(event: &Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Sends [`AppEvent::ConfigReload`] whenever `config.toml` changes on disk.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    if let Err(e) = watch_config(tx).await {
        log::error!("Config watcher stopped: {}", e);
    }
}

async fn watch_config(tx: Sender<AppEvent>) -> Result<(), ConfigError> {
    let config_path = get_config_path()?;
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        return Ok(());
    };
    fs_err::create_dir_all(&config_dir)?;

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&config_dir, RecursiveMode::NonRecursive)?;

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                if touches_config(&event, &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    #[test]
    fn test_bundled_config_parses() {
        let config = parse_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.cities.len(), 4);
        assert_eq!(config.refresh, Duration::from_secs(60));
        assert_eq!(config.conflict.max_cluster_size, 2);
        assert!(config.cities.iter().all(|c| c.time_zone().is_some()));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_toml(
            r#"
            [[cities]]
            id = "tokyo"
            code = "TYO"
            "#,
        )
        .unwrap();
        assert_eq!(config.cities[0].zone, None);
        assert_eq!(config.label, LabelMetrics::default());
        assert_eq!(config.conflict, ConflictPolicy::default());
        assert_eq!(config.refresh, DEFAULT_REFRESH);
    }

    #[test]
    fn test_missing_file_falls_back_to_bundled_cities() {
        let config = load_or_default_from(Path::new("/nonexistent/worldorbit/config.toml"));
        assert_eq!(config, builtin());
        assert_eq!(config.cities.len(), 4);
    }

    #[test]
    fn test_refresh_deserializes_from_seconds() {
        let config: Config = serde_json::from_str(r#"{"refresh": 5}"#).unwrap();
        assert_eq!(config.refresh, Duration::from_secs(5));
        assert!(config.cities.is_empty());
    }

    #[test]
    fn test_touches_config_filters_paths_and_kinds() {
        let path = PathBuf::from("/tmp/worldorbit/config.toml");

        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.clone());
        assert!(touches_config(&modify, &path));

        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        assert!(touches_config(&create, &path));

        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/worldorbit/other.toml"));
        assert!(!touches_config(&other, &path));

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(path.clone());
        assert!(!touches_config(&access, &path));
    }
}
