use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use derivative::Derivative;
use fs_err::{self as fs};
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use tracing::{info, level_filters::LevelFilter, warn};

use crate::{
    display::{Encoding, MAX_BYTES_PER_ROW, Radix},
    view::ViewConfig,
    viewport::{DEFAULT_VIEWPORT_CAPACITY, VIEWPORT_CAPACITY_MAX},
};

pub mod ser;

pub const CONFIG_FILE_NAME: &str = "bytelens.toml";

#[serde_inline_default]
#[derive(Debug, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
pub struct Settings {
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub misc: Misc,
}

#[serde_inline_default]
#[derive(Debug, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
pub struct Display {
    /// Radix of the byte column (2, 8, 10 or 16).
    #[serde_inline_default(Radix::Hexadecimal)]
    #[serde(
        serialize_with = "ser::serialize_as_u8",
        deserialize_with = "ser::deserialize_from_u8"
    )]
    #[derivative(Default(value = "Radix::Hexadecimal"))]
    pub radix: Radix,
    /// Radix of the address column and of seek input.
    #[serde_inline_default(Radix::Hexadecimal)]
    #[serde(
        serialize_with = "ser::serialize_as_u8",
        deserialize_with = "ser::deserialize_from_u8"
    )]
    #[derivative(Default(value = "Radix::Hexadecimal"))]
    pub address_radix: Radix,
    #[serde_inline_default(20)]
    #[derivative(Default(value = "20"))]
    pub lines_displayed: usize,
}

#[serde_inline_default]
#[derive(Debug, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
pub struct Viewport {
    /// Bytes fetched from the file at once.
    #[serde_inline_default(DEFAULT_VIEWPORT_CAPACITY)]
    #[derivative(Default(value = "DEFAULT_VIEWPORT_CAPACITY"))]
    pub capacity: usize,
}

#[serde_inline_default]
#[derive(Debug, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
pub struct Search {
    #[serde_inline_default(1000)]
    #[derivative(Default(value = "1000"))]
    pub limit: usize,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde_inline_default(Encoding::Latin1)]
    #[serde(
        serialize_with = "ser::serialize_as_string",
        deserialize_with = "ser::deserialize_from_str"
    )]
    #[derivative(Default(value = "Encoding::Latin1"))]
    pub encoding: Encoding,
}

#[serde_inline_default]
#[derive(Debug, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
pub struct Misc {
    #[serde_inline_default(String::from("debug"))]
    #[derivative(Default(value = "String::from(\"debug\")"))]
    pub log_level: String,
}

impl Settings {
    pub fn load(path: &Path, required: bool) -> color_eyre::Result<Self> {
        if !path.exists() && !required {
            let mut default = Settings::default();
            default.path = path.into();
            default.save()?;
            return Ok(default);
        } else if !path.exists() && required {
            color_eyre::eyre::bail!("Required config file missing: {}", path.display());
        }
        let mut file = fs::File::open(path)?;
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        drop(file);
        let mut config: Settings = toml::from_str(&buffer)?;
        config.path = path.into();
        config.clamp();
        config.save()?;
        Ok(config)
    }
    pub fn save(&self) -> color_eyre::Result<()> {
        if self.path.as_os_str().is_empty() {
            color_eyre::eyre::bail!("Settings have no path to save to");
        }
        self.save_at(&self.path)
    }
    fn save_at(&self, config_path: &Path) -> color_eyre::Result<()> {
        let toml_config = toml::to_string(self)?;
        info!("Serialized config length: {}", toml_config.len());
        let mut file = fs::File::create(config_path)?;
        file.write_all(toml_config.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
    fn clamp(&mut self) {
        let max_lines = VIEWPORT_CAPACITY_MAX / MAX_BYTES_PER_ROW;
        self.display.lines_displayed = self.display.lines_displayed.clamp(1, max_lines);

        if !self.display.address_radix.is_address_radix() {
            warn!(
                "{:?} can't be used for addresses, using hexadecimal",
                self.display.address_radix
            );
            self.display.address_radix = Radix::Hexadecimal;
        }

        // A viewport has to hold at least one full screen in any radix.
        let min_capacity = self.display.lines_displayed * MAX_BYTES_PER_ROW;
        let capacity = self
            .viewport
            .capacity
            .clamp(min_capacity, VIEWPORT_CAPACITY_MAX);
        if capacity != self.viewport.capacity {
            warn!(
                "Viewport capacity {} out of range, using {capacity}",
                self.viewport.capacity
            );
            self.viewport.capacity = capacity;
        }
    }
    pub fn get_log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.misc.log_level).unwrap_or(LevelFilter::DEBUG)
    }
    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            radix: self.display.radix,
            address_radix: self.display.address_radix,
            lines_displayed: self.display.lines_displayed,
            capacity: self.viewport.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.display.radix, Radix::Hexadecimal);
        assert_eq!(settings.display.lines_displayed, 20);
        assert_eq!(settings.viewport.capacity, 1024);
        assert_eq!(settings.search.limit, 1000);
        assert_eq!(settings.search.encoding, Encoding::Latin1);
        assert_eq!(settings.get_log_level(), LevelFilter::DEBUG);

        let default = Settings::default();
        assert_eq!(default.display.address_radix, Radix::Hexadecimal);
        assert_eq!(default.search.limit, 1000);
    }

    #[test]
    fn test_radix_as_integer() {
        let settings: Settings =
            toml::from_str("[display]\nradix = 2\n[search]\nencoding = \"UTF-8\"").unwrap();
        assert_eq!(settings.display.radix, Radix::Binary);
        assert_eq!(settings.search.encoding, Encoding::Utf8);

        let text = toml::to_string(&settings).unwrap();
        assert!(text.contains("radix = 2"));
        assert!(text.contains("encoding = \"utf-8\""));

        assert!(toml::from_str::<Settings>("[display]\nradix = 3").is_err());
    }

    #[test]
    fn test_clamp() {
        let mut settings: Settings =
            toml::from_str("[viewport]\ncapacity = 99999999\n[display]\nlines_displayed = 0")
                .unwrap();
        settings.clamp();
        assert_eq!(settings.viewport.capacity, VIEWPORT_CAPACITY_MAX);
        assert_eq!(settings.display.lines_displayed, 1);
        assert_eq!(settings.view_config().capacity, VIEWPORT_CAPACITY_MAX);
    }

    #[test]
    fn test_capacity_holds_a_screen() {
        let mut settings: Settings =
            toml::from_str("[viewport]\ncapacity = 64\n[display]\nlines_displayed = 20").unwrap();
        settings.clamp();
        assert_eq!(settings.viewport.capacity, 20 * 16);

        let mut settings: Settings = toml::from_str("[display]\nlines_displayed = 1000000").unwrap();
        settings.clamp();
        assert_eq!(settings.display.lines_displayed, VIEWPORT_CAPACITY_MAX / 16);
        assert_eq!(settings.viewport.capacity, VIEWPORT_CAPACITY_MAX);
    }

    #[test]
    fn test_binary_address_radix_replaced() {
        let mut settings: Settings = toml::from_str("[display]\naddress_radix = 2").unwrap();
        assert_eq!(settings.display.address_radix, Radix::Binary);
        settings.clamp();
        assert_eq!(settings.display.address_radix, Radix::Hexadecimal);

        let mut settings: Settings = toml::from_str("[display]\naddress_radix = 8").unwrap();
        settings.clamp();
        assert_eq!(settings.display.address_radix, Radix::Octal);
    }
}
