//! Application configuration
//!
//! Read from an optional TOML file (`--config`, or `coverfix.toml` in the
//! working directory) and overridden by `COVERFIX_*` environment variables,
//! e.g. `COVERFIX_IMAGE__QUALITY=90`.

use crate::error::{CliError, Result};
use coverfix_image::NormalizeProfile;
use coverfix_library::{ExistingCoverPolicy, FixerConfig, StagingArea, COVER_FILE_NAME, ROCKBOX_DIR, STAGING_DIR_NAME};
use coverfix_sync::MirrorOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "coverfix.toml";

pub const ENV_PREFIX: &str = "COVERFIX";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub image: NormalizeProfile,

    #[serde(default)]
    pub staging: StagingSettings,

    #[serde(default)]
    pub sync: MirrorOptions,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    #[serde(default = "default_cover_file_name")]
    pub cover_file_name: String,

    #[serde(default = "default_reserved_dirs")]
    pub reserved_dirs: Vec<String>,

    #[serde(default)]
    pub existing_cover_policy: ExistingCoverPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StagingSettings {
    #[serde(default = "default_staging_dir_name")]
    pub dir_name: String,

    /// Parent of the staging directory; the platform temp dir when unset
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("library.reserved_dirs")
                .with_list_parse_key("sync.extra_filters")
                .try_parsing(true),
        );

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.image
            .validate()
            .map_err(|e| CliError::Invalid(e.to_string()))?;

        if self.library.cover_file_name.is_empty() {
            return Err(CliError::Invalid("library.cover_file_name is empty".to_string()));
        }
        if self.library.cover_file_name.contains(['/', '\\']) {
            return Err(CliError::Invalid(format!(
                "library.cover_file_name must be a bare file name, got {:?}",
                self.library.cover_file_name
            )));
        }
        if self.staging.dir_name.is_empty() {
            return Err(CliError::Invalid("staging.dir_name is empty".to_string()));
        }

        Ok(())
    }

    pub fn fixer_config(&self) -> FixerConfig {
        FixerConfig {
            cover_file_name: self.library.cover_file_name.clone(),
            reserved_dirs: self.library.reserved_dirs.clone(),
            existing_cover_policy: self.library.existing_cover_policy,
            profile: self.image,
        }
    }

    /// Mirror options with the configured cover file protected on the target
    pub fn mirror_options(&self) -> MirrorOptions {
        let mut options = self.sync.clone();
        options.protect(&self.library.cover_file_name);
        options
    }

    pub fn staging_area(&self) -> StagingArea {
        let root = self.staging.root.clone().unwrap_or_else(std::env::temp_dir);
        StagingArea::with_name(root, &self.staging.dir_name)
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            cover_file_name: default_cover_file_name(),
            reserved_dirs: default_reserved_dirs(),
            existing_cover_policy: ExistingCoverPolicy::default(),
        }
    }
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            dir_name: default_staging_dir_name(),
            root: None,
        }
    }
}

// Default values
fn default_cover_file_name() -> String {
    COVER_FILE_NAME.to_string()
}

fn default_reserved_dirs() -> Vec<String> {
    vec![ROCKBOX_DIR.to_string()]
}

fn default_staging_dir_name() -> String {
    STAGING_DIR_NAME.to_string()
}
