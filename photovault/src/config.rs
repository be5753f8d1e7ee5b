//! Configuration loading.
//!
//! Values come from a YAML file merged with `PHOTOVAULT_`-prefixed
//! environment variables, the environment winning. The backend address is
//! deliberately not part of the configuration; it is fixed at build time
//! as [`crate::api::DEFAULT_BASE_URL`].

use crate::error::Error;
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;
use std::path::PathBuf;

/// Terminal client for the photovault backup service.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(
        short = 'f',
        long,
        env = "PHOTOVAULT_CONFIG",
        default_value = "config.yaml"
    )]
    pub config: String,

    /// Check the configuration and exit without starting the client
    #[arg(long)]
    pub validate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for photos to back up.
    pub media_dir: PathBuf,

    /// Directory downloaded files are written into.
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from("./photos"),
            download_dir: PathBuf::from("./downloads"),
        }
    }
}

impl Config {
    /// Load configuration from the file named by `args`, then let
    /// environment variables override it.
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Config = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("PHOTOVAULT_").split("__"))
            .extract()?;
        config
            .validate()
            .map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.media_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "media_dir must not be empty".to_string(),
            });
        }
        if self.download_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "download_dir must not be empty".to_string(),
            });
        }
        // Downloads landing in the photo library would be picked up by the
        // next scan and offered for re-upload
        if self.media_dir == self.download_dir {
            return Err(Error::Config {
                message: "media_dir and download_dir must be different directories".to_string(),
            });
        }
        Ok(())
    }
}
