// crates/folio-core/src/viewport.rs
//
// Layout mode and colour theme. Neither affects controller behaviour beyond
// which selection inputs are accepted; the UI owns both values and the state
// machines only read them.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputMode {
    /// Pointer hover opens a project, leaving it closes after a debounce.
    #[default]
    Desktop,
    /// Tap opens a project, an explicit close affordance closes it.
    Mobile,
}

impl InputMode {
    /// Widths strictly below `breakpoint` are treated as touch layouts.
    ///
    /// ```
    /// use folio_core::viewport::InputMode;
    /// assert_eq!(InputMode::from_width(767.0, 768.0), InputMode::Mobile);
    /// assert_eq!(InputMode::from_width(768.0, 768.0), InputMode::Desktop);
    /// ```
    pub fn from_width(width: f32, breakpoint: f32) -> Self {
        if width < breakpoint { Self::Mobile } else { Self::Desktop }
    }

    pub fn is_mobile(self) -> bool {
        self == Self::Mobile
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark  => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark  => "dark",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_toggles_back_and_forth() {
        let t = Theme::default();
        assert!(t.is_dark());
        assert_eq!(t.toggle(), Theme::Light);
        assert_eq!(t.toggle().toggle(), t);
    }

    #[test]
    fn theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), "\"light\"");
    }
}
