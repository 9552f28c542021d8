use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CURRENT_VERSION: u32 = 1;
const CONFIG_FILENAME: &str = "config.yaml";
pub const APP_NAME: &str = "komaread";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Extension of page and cover images.
    #[serde(default = "default_page_extension")]
    pub page_extension: String,

    /// Narrowest surface, in device-independent px, that shows two pages.
    #[serde(default = "default_spread_min_width_px")]
    pub spread_min_width_px: u32,

    #[serde(default = "default_cell_width_px")]
    pub cell_width_px: u32,

    #[serde(default = "default_cell_height_px")]
    pub cell_height_px: u32,

    #[serde(default = "default_autoplay_delay_ms")]
    pub autoplay_delay_ms: u64,

    #[serde(default = "default_zoom_indicator_ms")]
    pub zoom_indicator_ms: u64,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_page_extension() -> String {
    "png".to_string()
}

fn default_spread_min_width_px() -> u32 {
    768
}

fn default_cell_width_px() -> u32 {
    8
}

fn default_cell_height_px() -> u32 {
    16
}

fn default_autoplay_delay_ms() -> u64 {
    3000
}

fn default_zoom_indicator_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            page_extension: default_page_extension(),
            spread_min_width_px: default_spread_min_width_px(),
            cell_width_px: default_cell_width_px(),
            cell_height_px: default_cell_height_px(),
            autoplay_delay_ms: default_autoplay_delay_ms(),
            zoom_indicator_ms: default_zoom_indicator_ms(),
        }
    }
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(CONFIG_FILENAME))
}

/// Load the config from its default location, writing a default file on
/// first run.
pub fn load_config() -> Config {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default config");
        return Config::default();
    };
    if path.exists() {
        load_config_from_path(&path)
    } else {
        info!("Config file not found, creating with defaults at {path:?}");
        let config = Config::default();
        save_config_to_file(&config, &path);
        config
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to read config file {path:?}: {e}");
            return Config::default();
        }
    };
    match serde_yaml::from_str::<Config>(&content) {
        Ok(mut config) => {
            debug!("Loaded config from {path:?}");
            if config.version < CURRENT_VERSION {
                migrate_config(&mut config);
                save_config_to_file(&config, path);
            }
            sanitize(config)
        }
        Err(e) => {
            error!("Failed to parse config file {path:?}: {e}");
            Config::default()
        }
    }
}

fn migrate_config(config: &mut Config) {
    info!(
        "Migrating config from v{} to v{}",
        config.version, CURRENT_VERSION
    );
    config.version = CURRENT_VERSION;
}

/// Replace values that would make the reader unusable.
fn sanitize(mut config: Config) -> Config {
    let defaults = Config::default();
    if config.page_extension.trim().is_empty() {
        warn!("Empty page_extension in config, using {}", defaults.page_extension);
        config.page_extension = defaults.page_extension;
    }
    config.page_extension = config
        .page_extension
        .trim()
        .trim_start_matches('.')
        .to_string();
    if config.cell_width_px == 0 {
        config.cell_width_px = defaults.cell_width_px;
    }
    if config.cell_height_px == 0 {
        config.cell_height_px = defaults.cell_height_px;
    }
    if config.autoplay_delay_ms == 0 {
        config.autoplay_delay_ms = defaults.autoplay_delay_ms;
    }
    config
}

pub fn save_config_to_file(config: &Config, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let mut content = String::from(CONFIG_HEADER);
    match serde_yaml::to_string(config) {
        Ok(yaml) => content.push_str(&yaml),
        Err(e) => {
            error!("Failed to serialize config: {e}");
            return;
        }
    }

    match fs::write(path, content) {
        Ok(()) => debug!("Saved config to {path:?}"),
        Err(e) => error!("Failed to save config to {path:?}: {e}"),
    }
}

const CONFIG_HEADER: &str = r#"# komaread configuration
#
# page_extension:       image extension of pages and covers (png, jpg, webp, ...)
# spread_min_width_px:  narrowest reader surface that shows two pages side by side
# cell_width_px/height: size of one terminal cell, used to turn mouse drags into px
# autoplay_delay_ms:    initial autoplay period
# zoom_indicator_ms:    how long the zoom percentage stays on screen
"#;
