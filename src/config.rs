use std::{env, path::PathBuf};

use color_eyre::Result;
use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::Deserialize;

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// Settings of the per-column filter row
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FilterSettings {
    /// Show the filter row when the table has rows
    #[serde(default)]
    pub show_filters: bool,
    /// Clear filters of invisible columns before submitting a query
    #[serde(default = "default_true")]
    pub clear_hidden_on_submit: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            show_filters: false,
            clear_hidden_on_submit: true,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub filters: FilterSettings,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// The embedded defaults alone
    pub fn embedded() -> Result<Self> {
        let mut cfg: Self = json5::from_str(CONFIG)?;
        cfg.config.data_dir = get_data_dir();
        cfg.config.config_dir = get_config_dir();
        Ok(cfg)
    }

    /// Load the embedded defaults overlaid with a config file.
    ///
    /// Without an explicit path, `config.json5` in the config dir is used when it exists.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        builder = match config_path {
            Some(p) => builder.add_source(
                config::File::from(expand_tilde(p))
                    .format(config::FileFormat::Json5)
                    .required(true),
            ),
            None => builder.add_source(
                config::File::from(config_dir.join("config.json5"))
                    .format(config::FileFormat::Json5)
                    .required(false),
            ),
        };

        builder.build()?.try_deserialize()
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with("~") {
            if let Some(base) = BaseDirs::new() { return PathBuf::from(s.replacen("~", base.home_dir().to_str().unwrap_or(""), 1)); }
        }
    }
    path.clone()
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".config")
    }
}
