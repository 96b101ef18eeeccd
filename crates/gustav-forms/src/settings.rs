//! Persisted UI preferences: colour theme and sidebar state.
//!
//! Nothing is written until the user changes a preference. The system colour
//! scheme is only followed while no theme has been saved.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SIDEBAR_COLLAPSED: &str = "collapsed";
const SIDEBAR_EXPANDED: &str = "expanded";

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Preference file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preference file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Preference store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    RosePineDawn,
    EverforestDarkHard,
}

impl Theme {
    pub const LIGHT: Theme = Theme::RosePineDawn;
    pub const DARK: Theme = Theme::EverforestDarkHard;

    /// Parse a stored theme name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "rose-pine-dawn" => Some(Theme::RosePineDawn),
            "everforest-dark-hard" => Some(Theme::EverforestDarkHard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::RosePineDawn => "rose-pine-dawn",
            Theme::EverforestDarkHard => "everforest-dark-hard",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::EverforestDarkHard)
    }

    pub fn toggled(&self) -> Self {
        if self.is_dark() {
            Theme::LIGHT
        } else {
            Theme::DARK
        }
    }

    pub fn for_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            Theme::DARK
        } else {
            Theme::LIGHT
        }
    }
}

/// Raw stored values, keyed the same way the browser store keys them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "gustav-theme", default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(rename = "gustav-sidebar", default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
}

pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<Preferences, PreferenceError>;
    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError>;
}

/// JSON file on disk. A missing file reads as empty preferences.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Preferences, PreferenceError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(preferences)?)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    inner: Mutex<Preferences>,
}

impl MemoryPreferenceStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            inner: Mutex::new(preferences),
        }
    }

    pub fn snapshot(&self) -> Result<Preferences, PreferenceError> {
        self.load()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Preferences, PreferenceError> {
        self.inner
            .lock()
            .map(|p| p.clone())
            .map_err(|_| PreferenceError::Poisoned)
    }

    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        let mut guard = self.inner.lock().map_err(|_| PreferenceError::Poisoned)?;
        *guard = preferences.clone();
        Ok(())
    }
}

/// Active preferences over a backing store.
pub struct Settings<S: PreferenceStore> {
    store: S,
    saved: Preferences,
    theme: Theme,
}

impl<S: PreferenceStore> Settings<S> {
    /// Load saved preferences and resolve the active theme: a valid saved theme,
    /// otherwise the system preference.
    pub fn init(store: S, system_prefers_dark: bool) -> Result<Self, PreferenceError> {
        let saved = store.load()?;
        let theme = saved
            .theme
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or_else(|| Theme::for_system(system_prefers_dark));

        tracing::debug!(theme = theme.as_str(), "Preferences loaded");
        Ok(Self {
            store,
            saved,
            theme,
        })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn has_saved_theme(&self) -> bool {
        self.saved.theme.as_deref().and_then(Theme::parse).is_some()
    }

    /// Apply and persist a theme by name. Unknown names are ignored and return `false`.
    pub fn set_theme(&mut self, name: &str) -> Result<bool, PreferenceError> {
        let Some(theme) = Theme::parse(name) else {
            tracing::debug!(name, "Ignoring unknown theme");
            return Ok(false);
        };
        self.apply_theme(theme)?;
        Ok(true)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, PreferenceError> {
        let theme = self.theme.toggled();
        self.apply_theme(theme)?;
        Ok(theme)
    }

    /// React to a system colour-scheme change. Returns the new theme when it was applied.
    pub fn on_system_theme_change(&mut self, prefers_dark: bool) -> Option<Theme> {
        if self.has_saved_theme() {
            return None;
        }
        self.theme = Theme::for_system(prefers_dark);
        Some(self.theme)
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.saved.sidebar.as_deref() == Some(SIDEBAR_COLLAPSED)
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) -> Result<(), PreferenceError> {
        let value = if collapsed {
            SIDEBAR_COLLAPSED
        } else {
            SIDEBAR_EXPANDED
        };
        let mut next = self.saved.clone();
        next.sidebar = Some(value.to_string());
        self.persist(next)
    }

    /// Flip the sidebar state. Returns `true` when it is now collapsed.
    pub fn toggle_sidebar(&mut self) -> Result<bool, PreferenceError> {
        let collapsed = !self.sidebar_collapsed();
        self.set_sidebar_collapsed(collapsed)?;
        Ok(collapsed)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn apply_theme(&mut self, theme: Theme) -> Result<(), PreferenceError> {
        let mut next = self.saved.clone();
        next.theme = Some(theme.as_str().to_string());
        self.persist(next)?;
        self.theme = theme;
        Ok(())
    }

    fn persist(&mut self, next: Preferences) -> Result<(), PreferenceError> {
        self.store.save(&next)?;
        self.saved = next;
        Ok(())
    }
}
