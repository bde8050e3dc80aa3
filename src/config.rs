//! Session configuration parsed from environment variables and an optional
//! YAML catalog file.
//!
//! Recognized variables:
//! - `SKETCHROOM_DATABASE_URL`: chat store URL (default `sqlite://chat.db`)
//! - `SKETCHROOM_DB_MAX_CONNECTIONS`: pool size (default 5)
//! - `SKETCHROOM_CANVAS_WIDTH` / `SKETCHROOM_CANVAS_HEIGHT`: initial size (1400 / 800)
//! - `SKETCHROOM_CANVAS_MIN` / `SKETCHROOM_CANVAS_MAX`: resize bounds (100 / 5000)
//! - `SKETCHROOM_CATALOG_PATH`: YAML file overriding challenges, palettes, music
//!
//! Unparsable numbers fall back to their defaults. A catalog file that cannot
//! be read or parsed is an error.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::canvas::ResizeBounds;
use crate::consts::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_DATABASE_URL, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_MAX_DIMENSION, DEFAULT_MIN_DIMENSION,
};
use crate::palette::{Palette, PaletteBook};
use crate::services::challenge::{Challenge, default_catalog};
use crate::services::music::{Mood, MusicLibrary};

pub const ENV_DATABASE_URL: &str = "SKETCHROOM_DATABASE_URL";
pub const ENV_DB_MAX_CONNECTIONS: &str = "SKETCHROOM_DB_MAX_CONNECTIONS";
pub const ENV_CANVAS_WIDTH: &str = "SKETCHROOM_CANVAS_WIDTH";
pub const ENV_CANVAS_HEIGHT: &str = "SKETCHROOM_CANVAS_HEIGHT";
pub const ENV_CANVAS_MIN: &str = "SKETCHROOM_CANVAS_MIN";
pub const ENV_CANVAS_MAX: &str = "SKETCHROOM_CANVAS_MAX";
pub const ENV_CATALOG_PATH: &str = "SKETCHROOM_CATALOG_PATH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read catalog {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse catalog {path}: {source}")]
    Yaml { path: PathBuf, source: serde_yaml::Error },
    #[error("invalid resize bounds: min {min} > max {max}")]
    InvalidBounds { min: u32, max: u32 },
    #[error("challenge catalog is empty")]
    EmptyCatalog,
    #[error("challenge '{0}' has a zero duration")]
    ZeroDuration(String),
    #[error("no palette has a valid color")]
    EmptyPalettes,
}

/// Overrides loaded from a catalog file. Absent sections keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub challenges: Option<Vec<Challenge>>,
    #[serde(default)]
    pub palettes: Option<Vec<Palette>>,
    #[serde(default)]
    pub music: Option<Vec<Mood>>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub initial_width: u32,
    pub initial_height: u32,
    pub bounds: ResizeBounds,
    pub catalog: Vec<Challenge>,
    pub palettes: PaletteBook,
    pub music: MusicLibrary,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            initial_width: DEFAULT_CANVAS_WIDTH,
            initial_height: DEFAULT_CANVAS_HEIGHT,
            bounds: ResizeBounds { min: DEFAULT_MIN_DIMENSION, max: DEFAULT_MAX_DIMENSION },
            catalog: default_catalog(),
            palettes: PaletteBook::default(),
            music: MusicLibrary::default(),
        }
    }
}

impl SessionConfig {
    /// Build config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file is unreadable or the resulting
    /// config is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SessionConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut config = Self {
            database_url: lookup(ENV_DATABASE_URL).unwrap_or(defaults.database_url),
            db_max_connections: parse_or(&lookup, ENV_DB_MAX_CONNECTIONS, defaults.db_max_connections),
            initial_width: parse_or(&lookup, ENV_CANVAS_WIDTH, defaults.initial_width),
            initial_height: parse_or(&lookup, ENV_CANVAS_HEIGHT, defaults.initial_height),
            bounds: ResizeBounds {
                min: parse_or(&lookup, ENV_CANVAS_MIN, defaults.bounds.min),
                max: parse_or(&lookup, ENV_CANVAS_MAX, defaults.bounds.max),
            },
            ..defaults
        };

        if let Some(path) = lookup(ENV_CATALOG_PATH) {
            config.apply_catalog(load_catalog_file(Path::new(&path))?);
        }

        config.validate()
    }

    /// Replace the sections present in `file`.
    pub fn apply_catalog(&mut self, file: CatalogFile) {
        if let Some(challenges) = file.challenges {
            self.catalog = challenges;
        }
        if let Some(palettes) = file.palettes {
            self.palettes = PaletteBook::new(palettes);
        }
        if let Some(moods) = file.music {
            self.music = MusicLibrary::new(moods);
        }
    }

    /// Check invariants and clamp the initial canvas into the bounds.
    ///
    /// # Errors
    ///
    /// Returns an error for inverted or zero bounds, an empty catalog, a
    /// zero-length challenge, or no usable palette.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let ResizeBounds { min, max } = self.bounds;
        if min == 0 || min > max {
            return Err(ConfigError::InvalidBounds { min, max });
        }
        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if let Some(bad) = self.catalog.iter().find(|c| c.duration_secs == 0) {
            return Err(ConfigError::ZeroDuration(bad.prompt.clone()));
        }
        if self.palettes.is_empty() {
            return Err(ConfigError::EmptyPalettes);
        }
        self.initial_width = self.bounds.clamp(self.initial_width);
        self.initial_height = self.bounds.clamp(self.initial_height);
        Ok(self)
    }
}

/// Read and parse a YAML catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid catalog.
pub fn load_catalog_file(path: &Path) -> Result<CatalogFile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}
