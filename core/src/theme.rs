//! Light/dark preference, persisted under `themeMode`.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::storage::Storage;

pub const THEME_KEY: &str = "themeMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme mode {other:?}")),
        }
    }
}

/// Current mode plus the storage it is written back to.
pub struct ThemePreference<S> {
    storage: S,
    mode: ThemeMode,
}

impl<S: Storage> ThemePreference<S> {
    /// Read the stored mode; anything missing or unrecognized means light.
    pub fn load(storage: S) -> Self {
        let mode = match storage.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|error: String| {
                warn!(error = %error, "ignoring stored theme");
                ThemeMode::default()
            }),
            Ok(None) => ThemeMode::default(),
            Err(error) => {
                warn!(error = %error, "theme storage unavailable");
                ThemeMode::default()
            }
        };
        Self { storage, mode }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn set(&mut self, mode: ThemeMode) {
        self.mode = mode;
        if let Err(error) = self.storage.set(THEME_KEY, mode.as_str()) {
            warn!(error = %error, "failed to persist theme");
        }
    }

    pub fn toggle(&mut self) -> ThemeMode {
        self.set(self.mode.toggled());
        self.mode
    }
}
