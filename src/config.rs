//! Contains everything related to configuration.
//!
//! All default values for configurable aspects of highlighting are defined in this
//! module, including *settings*, *colors*, per-appearance *theme* overrides, and
//! additional *rules* per mode.
//!
//! At a minimum, [`Configuration::default()`] is sufficient for highlighting.
//! However, the normal process is to apply multiple tiers of configuration, all
//! optional, resulting in a final blended configuration.
//!
//! External configuration files are expected to be formatted according to the
//! [TOML specification](https://toml.io).
//!
//! The default method of loading an external configuration file via
//! [`Configuration::load()`] will try to locate files in the following locations in
//! order of precedence:
//!
//! * `$HOME/.tintrc`
//! * `$HOME/.tint/tintrc`
//! * `$HOME/.config/tint/tintrc`

use crate::class::Class;
use crate::color::Colors;
use crate::error::{Error, Result};
use crate::opt::Options;
use crate::syntax::{Library, Mode, Rules, Variant};
use crate::sys::{self, AsString};
use crate::theme::{Appearance, Theme};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A configuration representing all aspects of highlighting.
#[derive(Default)]
pub struct Configuration {
    /// A collection of configurable settings that control the behavior of the
    /// highlighter and trackers.
    pub settings: Settings,

    /// A map of color names to color values.
    pub colors: Colors,

    /// Themes with overrides applied, keyed by appearance.
    pub themes: HashMap<Appearance, Theme>,

    /// Additional rules appended to the built-in rules of each mode.
    pub rules: Rules,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub theme: Appearance,
    pub variant: Variant,
    pub tag_completion: bool,
    pub safe_mode: bool,

    /// Milliseconds between highlight cycles.
    pub interval: u64,

    /// Milliseconds a single cycle may spend classifying, where `0` means unbounded.
    pub budget: u64,

    pub background: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalConfiguration {
    settings: Option<ExternalSettings>,
    colors: Option<HashMap<String, String>>,
    theme: Option<HashMap<String, HashMap<String, String>>>,
    rules: Option<HashMap<String, IndexMap<String, String>>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalSettings {
    theme: Option<String>,
    variant: Option<String>,

    #[serde(rename = "tag-completion")]
    tag_completion: Option<bool>,

    #[serde(rename = "safe-mode")]
    safe_mode: Option<bool>,

    interval: Option<u64>,
    budget: Option<u64>,
    background: Option<bool>,
}

impl Settings {
    const INTERVAL: u64 = 100;
    const BUDGET: u64 = 80;

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval.max(1))
    }

    pub fn budget(&self) -> Option<Duration> {
        if self.budget == 0 {
            None
        } else {
            Some(Duration::from_millis(self.budget))
        }
    }

    /// Applies the external settings `ext` on top of `self`.
    fn apply(&mut self, ext: Option<ExternalSettings>) -> Result<()> {
        if let Some(ext) = ext {
            if let Some(theme) = ext.theme {
                self.theme = theme.parse()?;
            }
            if let Some(variant) = ext.variant {
                self.variant = variant.parse()?;
            }
            self.tag_completion = ext.tag_completion.unwrap_or(self.tag_completion);
            self.safe_mode = ext.safe_mode.unwrap_or(self.safe_mode);
            self.interval = ext.interval.unwrap_or(self.interval);
            self.budget = ext.budget.unwrap_or(self.budget);
            self.background = ext.background.unwrap_or(self.background);
        }
        Ok(())
    }

    /// Applies the relevant settings from `opts` on top of `self`.
    pub fn apply_opts(&mut self, opts: &Options) {
        self.theme = opts.theme.unwrap_or(self.theme);
        self.variant = opts.variant.unwrap_or(self.variant);
        self.tag_completion = opts.tag_completion.unwrap_or(self.tag_completion);
        self.interval = opts.interval.unwrap_or(self.interval);
        self.budget = opts.budget.unwrap_or(self.budget);
        self.background = opts.background.unwrap_or(self.background);
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            theme: Appearance::default(),
            variant: Variant::default(),
            tag_completion: true,
            safe_mode: false,
            interval: Self::INTERVAL,
            budget: Self::BUDGET,
            background: false,
        }
    }
}

impl Configuration {
    /// A collection of resource files to try loading in order of precedence.
    const TRY_FILES: [&str; 3] = [".tintrc", ".tint/tintrc", ".config/tint/tintrc"];

    /// Returns a configuration that is formed by attempting to load a resource file
    /// from well-known locations.
    pub fn load() -> Result<Configuration> {
        let mut config = Configuration::default();
        let root_path = sys::home_dir();
        for try_path in Self::TRY_FILES {
            let path = root_path.join(try_path);
            if path.exists() {
                tracing::debug!(path = %path.as_string(), "loading configuration");
                let ext = Self::read_file(&path)?;
                config.apply(ext)?;
                break;
            }
        }
        Ok(config)
    }

    /// Returns a configuration loaded from the resource file at `path`.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let mut config = Configuration::default();
        let ext = Self::read_file(path.as_ref())?;
        config.apply(ext)?;
        Ok(config)
    }

    /// Applies the relevant settings from `opts` on top of `self`.
    pub fn apply_opts(&mut self, opts: &Options) {
        self.settings.apply_opts(opts);
    }

    /// Returns the theme for `appearance`, including any configured overrides.
    pub fn theme(&self, appearance: Appearance) -> Theme {
        self.themes
            .get(&appearance)
            .cloned()
            .unwrap_or_else(|| Theme::new(appearance))
    }

    /// Returns the compiled rule sets of all modes, including additional rules.
    pub fn library(&self) -> Result<Library> {
        Library::load(&self.rules)
    }

    /// Applies the external configuration `ext` on top of `self`.
    fn apply(&mut self, ext: ExternalConfiguration) -> Result<()> {
        self.settings.apply(ext.settings)?;
        if let Some(colors) = ext.colors {
            self.colors
                .apply(&colors)
                .map_err(|value| Error::invalid_color(&value))?;
        }
        if let Some(themes) = ext.theme {
            for (name, overrides) in themes {
                let appearance = name.parse::<Appearance>()?;
                let mut theme = self.theme(appearance);
                for (class, color) in overrides {
                    let class = class.parse::<Class>()?;
                    let color = self
                        .colors
                        .lookup_value(&color)
                        .ok_or_else(|| Error::invalid_color(&color))?;
                    theme.set(class, color);
                }
                self.themes.insert(appearance, theme);
            }
        }
        if let Some(rules) = ext.rules {
            for (mode, table) in rules {
                let mode = mode.parse::<Mode>()?;
                let extras = self.rules.entry(mode).or_default();
                for (pattern, class) in table {
                    extras.push((pattern, class.parse::<Class>()?));
                }
            }
        }
        Ok(())
    }

    fn read_file(path: &Path) -> Result<ExternalConfiguration> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(&path.as_string(), e))?;
        toml::from_str::<ExternalConfiguration>(&content)
            .map_err(|e| Error::configuration(&path.as_string(), &e))
    }
}
