// SPDX-License-Identifier: MIT
//
// Kiosk configuration.
//
// One TOML file, every section optional. Missing keys take the defaults
// below, which reproduce the stock kiosk: mastodon.social, a ten second
// poll, white on dark grey, a 58 mm receipt printer on /dev/usb/lp0.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use kiosk_feed::render::{DisplayLayout, PrinterLayout};
use kiosk_term::color::CellColor;
use serde::{Deserialize, Serialize};

/// Read when `--config` is not given and the file exists.
pub const DEFAULT_PATH: &str = "toot-kiosk.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub poll: PollConfig,
    pub display: DisplayConfig,
    pub printer: PrinterConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// Name the application registers under.
    pub app_name: String,
    /// Written by `register`, read by `login`.
    pub client_credentials: PathBuf,
    /// Written by `login`, read by `run`.
    pub user_credentials: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mastodon.social".into(),
            app_name: "toot-kiosk".into(),
            client_credentials: "toot-kiosk_clientcred.secret".into(),
            user_credentials: "toot-kiosk_usercred.secret".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between fetches of each channel.
    pub interval_secs: u64,
    /// Event loop tick. Also how long a lone Escape takes to register.
    pub tick_millis: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            tick_millis: 50,
        }
    }
}

impl PollConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/// Terminal screen geometry, in cells. Avatar bounds are in pixels; the
/// terminal stacks two pixel rows per cell row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub origin_x: u32,
    pub origin_y: u32,
    pub text_width: u32,
    pub large_avatar: u32,
    pub small_avatar: u32,
    pub background: [u8; 3],
    pub foreground: [u8; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            origin_x: 2,
            origin_y: 1,
            text_width: 76,
            large_avatar: 24,
            small_avatar: 8,
            background: [32, 32, 32],
            foreground: [255, 255, 255],
        }
    }
}

impl DisplayConfig {
    #[must_use]
    pub const fn layout(&self) -> DisplayLayout {
        DisplayLayout {
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            text_width: self.text_width,
            large_avatar: self.large_avatar,
            small_avatar: self.small_avatar,
            pixel_rows_per_unit: 2,
        }
    }

    #[must_use]
    pub const fn background(&self) -> CellColor {
        let [r, g, b] = self.background;
        CellColor::Rgb(r, g, b)
    }

    #[must_use]
    pub const fn foreground(&self) -> CellColor {
        let [r, g, b] = self.foreground;
        CellColor::Rgb(r, g, b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    pub device: PathBuf,
    pub avatar: u32,
    pub columns_a: u32,
    pub columns_b: u32,
    pub rule_width: u32,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        let paper = PrinterLayout::NARROW;
        Self {
            device: kiosk_print::DEFAULT_DEVICE.into(),
            avatar: paper.avatar,
            columns_a: paper.columns_a,
            columns_b: paper.columns_b,
            rule_width: paper.rule_width,
        }
    }
}

impl PrinterConfig {
    #[must_use]
    pub const fn layout(&self) -> PrinterLayout {
        PrinterLayout {
            avatar: self.avatar,
            columns_a: self.columns_a,
            columns_b: self.columns_b,
            rule_width: self.rule_width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// The terminal belongs to the display, so logs go here.
    pub file: PathBuf,
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: "toot-kiosk.log".into(),
            filter: "info".into(),
        }
    }
}

impl Config {
    /// `path` must exist when given. Without it, [`DEFAULT_PATH`] is read
    /// if present and the built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None if Path::new(DEFAULT_PATH).exists() => Self::load_from(Path::new(DEFAULT_PATH)),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::parse(&s).with_context(|| format!("parse {}", path.display()))
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
