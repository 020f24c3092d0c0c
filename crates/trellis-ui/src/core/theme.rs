//! Light/dark preference resolution for the theme toggle.

/// Local storage key holding an explicit theme choice.
pub const THEME_STORAGE_KEY: &str = "theme";
/// Class applied to the root element while the dark theme is active.
pub const DARK_CLASS: &str = "dark";

/// Light or dark theme preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    /// Light theme mode.
    Light,
    /// Dark theme mode.
    Dark,
}

impl ThemeMode {
    /// String identifier persisted in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a persisted value; anything unknown yields `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Mode matching the system preference.
    #[must_use]
    pub const fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }

    /// Whether the dark class should be present.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Outcome of combining the stored choice with the system preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeResolution {
    /// Mode to apply.
    pub mode: ThemeMode,
    /// The stored value only repeats the system preference and should be removed.
    pub clear_stored: bool,
}

/// Decide which mode to apply.
///
/// An explicit choice wins. When it equals the system preference it carries
/// no information and is flagged for removal, so later system changes apply.
#[must_use]
pub const fn resolve_theme(stored: Option<ThemeMode>, system_prefers_dark: bool) -> ThemeResolution {
    let system = ThemeMode::from_system(system_prefers_dark);
    match stored {
        Some(mode) => ThemeResolution {
            mode,
            clear_stored: mode.is_dark() == system.is_dark(),
        },
        None => ThemeResolution {
            mode: system,
            clear_stored: false,
        },
    }
}

/// Mode a toggle click switches to.
#[must_use]
pub const fn toggle_target(stored: Option<ThemeMode>, system_prefers_dark: bool) -> ThemeMode {
    match stored {
        Some(mode) => mode.opposite(),
        None => ThemeMode::from_system(system_prefers_dark).opposite(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_mode_round_trips_storage_strings() {
        assert_eq!(ThemeMode::Light.as_str(), "light");
        assert_eq!(ThemeMode::parse("dark"), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::parse(" light "), Some(ThemeMode::Light));
        assert_eq!(ThemeMode::parse("sepia"), None);
    }

    #[test]
    fn system_preference_applies_without_stored_choice() {
        let resolved = resolve_theme(None, true);
        assert_eq!(resolved.mode, ThemeMode::Dark);
        assert!(!resolved.clear_stored);
        assert_eq!(resolve_theme(None, false).mode, ThemeMode::Light);
    }

    #[test]
    fn stored_choice_matching_system_is_cleared() {
        let resolved = resolve_theme(Some(ThemeMode::Dark), true);
        assert_eq!(resolved.mode, ThemeMode::Dark);
        assert!(resolved.clear_stored);

        let overridden = resolve_theme(Some(ThemeMode::Light), true);
        assert_eq!(overridden.mode, ThemeMode::Light);
        assert!(!overridden.clear_stored);
    }

    #[test]
    fn toggle_flips_the_effective_mode() {
        assert_eq!(toggle_target(None, false), ThemeMode::Dark);
        assert_eq!(toggle_target(None, true), ThemeMode::Light);
        assert_eq!(toggle_target(Some(ThemeMode::Dark), false), ThemeMode::Light);
    }
}
