// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Configuration options

#[cfg(feature = "serde")]
use super::Format;
use super::{Config, Error};
use std::env::var;
use std::path::PathBuf;

/// Config mode
///
/// See [`Options::from_env`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConfigMode {
    /// Read-only
    #[default]
    Read,
    /// Read on start, write changes with [`Options::write_config`]
    ReadWrite,
    /// Write the default config, overwriting any existing file
    WriteDefault,
}

impl ConfigMode {
    /// Parse a mode name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "READ" => Some(ConfigMode::Read),
            "READWRITE" => Some(ConfigMode::ReadWrite),
            "WRITEDEFAULT" => Some(ConfigMode::WriteDefault),
            _ => None,
        }
    }
}

/// Where configuration comes from
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Options {
    /// Config file path; empty for none
    pub config_path: PathBuf,
    /// Read/write mode
    pub config_mode: ConfigMode,
}

impl Options {
    /// Construct, reading environment variables
    ///
    /// `GADGETRY_CONFIG`, if set, gives the path of a config file whose
    /// format is guessed from its extension. Without it the default
    /// configuration is used and nothing is read or written.
    ///
    /// `GADGETRY_CONFIG_MODE` selects the mode (case-insensitive):
    ///
    /// -   `Read` (default): read-only
    /// -   `ReadWrite`: read on start, write on [`Options::write_config`]
    /// -   `WriteDefault`: write the default configuration to the path
    pub fn from_env() -> Self {
        let mut options = Options::default();

        if let Ok(v) = var("GADGETRY_CONFIG") {
            options.config_path = v.into();
        }

        if let Ok(v) = var("GADGETRY_CONFIG_MODE") {
            match ConfigMode::parse(&v) {
                Some(mode) => options.config_mode = mode,
                None => {
                    log::error!("from_env: bad var GADGETRY_CONFIG_MODE={v}");
                    log::error!("from_env: supported modes: READ, READWRITE, WRITEDEFAULT");
                }
            }
        }

        options
    }

    /// Load the configuration according to the mode
    ///
    /// Requires feature "serde" to use a config file.
    pub fn read_config(&self) -> Result<Config, Error> {
        #[cfg(feature = "serde")]
        if !self.config_path.as_os_str().is_empty() {
            return match self.config_mode {
                ConfigMode::Read | ConfigMode::ReadWrite => {
                    Format::None.read_path(&self.config_path)
                }
                ConfigMode::WriteDefault => {
                    let config = Config::default();
                    if let Err(error) = Format::None.write_path(&self.config_path, &config) {
                        log::warn!("read_config: failed to write default config: {error}");
                    }
                    Ok(config)
                }
            };
        }

        Ok(Config::default())
    }

    /// Save the configuration if changed and the mode allows it
    ///
    /// Requires feature "serde" to use a config file.
    pub fn write_config(&self, config: &Config) -> Result<(), Error> {
        #[cfg(feature = "serde")]
        if self.config_mode == ConfigMode::ReadWrite
            && !self.config_path.as_os_str().is_empty()
            && config.is_dirty()
        {
            Format::None.write_path(&self.config_path, config)?;
        }

        #[cfg(not(feature = "serde"))]
        let _ = config;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mode_names() {
        assert_eq!(ConfigMode::parse("readwrite"), Some(ConfigMode::ReadWrite));
        assert_eq!(ConfigMode::parse("WriteDefault"), Some(ConfigMode::WriteDefault));
        assert_eq!(ConfigMode::parse("write"), None);
    }

    #[test]
    fn no_path_gives_default() {
        let options = Options::default();
        assert_eq!(options.read_config().unwrap(), Config::default());
        options.write_config(&Config::default()).unwrap();
    }
}
