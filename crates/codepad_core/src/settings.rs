//! Editor preferences persisted alongside the project.

use serde::{Deserialize, Serialize};

pub const MIN_FONT_SIZE: u8 = 10;
pub const MAX_FONT_SIZE: u8 = 24;
pub const TAB_SIZES: [u8; 3] = [2, 4, 8];
pub const DEFAULT_AUTO_SAVE_DELAY_MS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTheme {
    #[default]
    Light,
    Dark,
}

impl EditorTheme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub font_size: u8,
    pub tab_size: u8,
    pub word_wrap: bool,
    pub line_numbers: bool,
    pub auto_save: bool,
    pub auto_save_delay_ms: u32,
    pub auto_complete: bool,
    pub theme: EditorTheme,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            font_size: 14,
            tab_size: 2,
            word_wrap: true,
            line_numbers: true,
            auto_save: true,
            auto_save_delay_ms: DEFAULT_AUTO_SAVE_DELAY_MS,
            auto_complete: true,
            theme: EditorTheme::Light,
        }
    }
}

impl EditorSettings {
    /// Clamps font size into range and snaps tab size to the nearest supported width.
    pub fn normalized(mut self) -> Self {
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.tab_size = TAB_SIZES
            .iter()
            .copied()
            .min_by_key(|size| (i16::from(*size) - i16::from(self.tab_size)).abs())
            .unwrap_or(2);
        self
    }

    /// One indentation level as spaces.
    pub fn indent_unit(&self) -> String {
        " ".repeat(usize::from(self.tab_size))
    }
}
