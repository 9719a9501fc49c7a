// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Configuration file formats

#[cfg(feature = "serde")]
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use thiserror::Error;

/// Configuration read/write errors
#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "yaml")]
    #[error("config deserialisation from YAML failed")]
    YamlDe(#[from] serde::de::value::Error),

    #[cfg(feature = "yaml")]
    #[error("config serialisation to YAML failed")]
    YamlSer(#[from] serde_yaml2::ser::Errors),

    #[cfg(feature = "json")]
    #[error("config (de)serialisation with JSON failed")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "ron")]
    #[error("config serialisation to RON failed")]
    RonSer(#[from] ron::Error),

    #[cfg(feature = "ron")]
    #[error("config deserialisation from RON failed")]
    RonDe(#[from] ron::error::SpannedError),

    #[cfg(feature = "toml")]
    #[error("config deserialisation from TOML failed")]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "toml")]
    #[error("config serialisation to TOML failed")]
    TomlSer(#[from] toml::ser::Error),

    #[error("config file I/O failed")]
    Io(#[from] std::io::Error),

    #[error("config format not supported: {0}")]
    UnsupportedFormat(Format),
}

/// Configuration serialisation formats
///
/// Each format requires the feature of the same (lower-case) name.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Error)]
pub enum Format {
    /// Not specified: guess from the path
    #[default]
    #[error("no format")]
    None,
    #[error("JSON")]
    Json,
    #[error("TOML")]
    Toml,
    #[error("YAML")]
    Yaml,
    #[error("RON")]
    Ron,
    /// Unrecognised file extension
    #[error("(unknown format)")]
    Unknown,
}

impl Format {
    /// Guess the format from a file extension
    ///
    /// Returns [`Format::Unknown`] on an unrecognised or missing extension.
    /// This does not check whether support for the format is enabled.
    pub fn from_path(path: &Path) -> Format {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return Format::Unknown;
        };
        match ext.to_ascii_lowercase().as_str() {
            "json" => Format::Json,
            "toml" => Format::Toml,
            "yaml" | "yml" => Format::Yaml,
            "ron" => Format::Ron,
            _ => Format::Unknown,
        }
    }

    /// Resolve [`Format::None`] by guessing from `path`
    pub fn or_guess(self, path: &Path) -> Format {
        match self {
            Format::None => Format::from_path(path),
            other => other,
        }
    }

    /// Deserialise from text
    #[cfg(feature = "serde")]
    pub fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, Error> {
        match self {
            #[cfg(feature = "json")]
            Format::Json => Ok(serde_json::from_str(text)?),
            #[cfg(feature = "yaml")]
            Format::Yaml => Ok(serde_yaml2::from_str(text)?),
            #[cfg(feature = "ron")]
            Format::Ron => Ok(ron::from_str(text)?),
            #[cfg(feature = "toml")]
            Format::Toml => Ok(toml::from_str(text)?),
            _ => {
                let _ = text;
                Err(Error::UnsupportedFormat(self))
            }
        }
    }

    /// Serialise to text
    #[cfg(feature = "serde")]
    pub fn to_text<T: Serialize>(self, value: &T) -> Result<String, Error> {
        match self {
            #[cfg(feature = "json")]
            Format::Json => Ok(serde_json::to_string_pretty(value)?),
            #[cfg(feature = "yaml")]
            Format::Yaml => Ok(serde_yaml2::to_string(value)?),
            #[cfg(feature = "ron")]
            Format::Ron => Ok(ron::ser::to_string_pretty(
                value,
                ron::ser::PrettyConfig::default(),
            )?),
            #[cfg(feature = "toml")]
            Format::Toml => Ok(toml::to_string(value)?),
            _ => {
                let _ = value;
                Err(Error::UnsupportedFormat(self))
            }
        }
    }

    /// Read from a path
    ///
    /// With [`Format::None`] the format is guessed from the path.
    #[cfg(feature = "serde")]
    pub fn read_path<T: DeserializeOwned>(self, path: &Path) -> Result<T, Error> {
        let format = self.or_guess(path);
        log::info!("read_path: path={}, format={format:?}", path.display());
        let text = std::fs::read_to_string(path)?;
        format.parse(&text)
    }

    /// Write to a path
    ///
    /// The whole document is serialised before the file is touched, thus a
    /// serialisation failure never leaves a partial file.
    #[cfg(feature = "serde")]
    pub fn write_path<T: Serialize>(self, path: &Path, value: &T) -> Result<(), Error> {
        let format = self.or_guess(path);
        log::info!("write_path: path={}, format={format:?}", path.display());
        let text = format.to_text(value)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn guess() {
        assert_eq!(Format::from_path(Path::new("a/b.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("c.YML")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("config.toml")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("config")), Format::Unknown);
        assert_eq!(Format::Ron.or_guess(Path::new("x.json")), Format::Ron);
    }

    #[cfg(feature = "json")]
    #[test]
    fn write_then_read_json() {
        use crate::config::Config;

        let path = std::env::temp_dir().join(format!("gadgetry-{}.json", std::process::id()));
        let mut config = Config::default();
        config.queue_capacity = 7;
        Format::None.write_path(&path, &config).unwrap();
        let read: Config = Format::None.read_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(read.queue_capacity, 7);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn unknown_is_unsupported() {
        let r: Result<u32, _> = Format::Unknown.parse("1");
        assert!(matches!(r, Err(Error::UnsupportedFormat(Format::Unknown))));
    }
}
