//! Theme registry.
//!
//! Themes describe how text renders on the live output: a background plus
//! main and footer font settings. The registry is always seeded with a
//! `Default` theme that cannot be deleted.

use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    service::DEFAULT_THEME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientDirection {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    Solid {
        color: String,
    },
    Gradient {
        start_color: String,
        end_color: String,
        direction: GradientDirection,
    },
    Image {
        path: PathBuf,
    },
}

impl Default for Background {
    fn default() -> Self {
        Self::Solid {
            color: "#000000".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,
    pub background: Background,
    pub font_main_name: String,
    pub font_main_size: u32,
    pub font_main_color: String,
    pub font_main_bold: bool,
    pub font_main_italics: bool,
    pub font_main_outline: bool,
    pub font_main_outline_color: String,
    pub font_main_outline_size: u32,
    pub font_main_shadow: bool,
    pub font_main_shadow_color: String,
    pub font_main_shadow_size: u32,
    pub font_footer_name: String,
    pub font_footer_size: u32,
    pub font_footer_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: DEFAULT_THEME.to_owned(),
            background: Background::default(),
            font_main_name: "Arial".into(),
            font_main_size: 40,
            font_main_color: "#FFFFFF".into(),
            font_main_bold: false,
            font_main_italics: false,
            font_main_outline: false,
            font_main_outline_color: "#000000".into(),
            font_main_outline_size: 2,
            font_main_shadow: true,
            font_main_shadow_color: "#000000".into(),
            font_main_shadow_size: 5,
            font_footer_name: "Arial".into(),
            font_footer_size: 12,
            font_footer_color: "#FFFFFF".into(),
        }
    }
}

impl Theme {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Named theme collection, sorted for stable listing.
#[derive(Debug, Clone)]
pub struct ThemeSet {
    themes: BTreeMap<String, Theme>,
}

impl Default for ThemeSet {
    fn default() -> Self {
        let mut themes = BTreeMap::new();
        themes.insert(DEFAULT_THEME.to_owned(), Theme::default());
        Self { themes }
    }
}

impl ThemeSet {
    pub fn names(&self) -> Vec<String> {
        self.themes.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Result<&Theme> {
        self.themes
            .get(name)
            .ok_or_else(|| Error::ThemeNotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    pub fn create(&mut self, theme: Theme) -> Result<()> {
        if self.themes.contains_key(&theme.name) {
            return Err(Error::ThemeExists(theme.name));
        }
        self.themes.insert(theme.name.clone(), theme);
        Ok(())
    }

    /// Replace an existing theme's definition, keyed by `theme.name`.
    pub fn update(&mut self, theme: Theme) -> Result<()> {
        if !self.themes.contains_key(&theme.name) {
            return Err(Error::ThemeNotFound(theme.name));
        }
        self.themes.insert(theme.name.clone(), theme);
        Ok(())
    }

    /// Delete a theme. `Default` and the active service theme are refused.
    pub fn delete(&mut self, name: &str, service_theme: &str) -> Result<()> {
        if !self.themes.contains_key(name) {
            return Err(Error::ThemeNotFound(name.to_owned()));
        }
        if name == DEFAULT_THEME {
            return Err(Error::ThemeInUse(
                name.to_owned(),
                "the default theme cannot be deleted".into(),
            ));
        }
        if name == service_theme {
            return Err(Error::ThemeInUse(
                name.to_owned(),
                "it is the active service theme; set a different theme first".into(),
            ));
        }
        self.themes.remove(name);
        Ok(())
    }

    pub fn duplicate(&mut self, existing: &str, new_name: &str) -> Result<()> {
        if self.themes.contains_key(new_name) {
            return Err(Error::ThemeExists(new_name.to_owned()));
        }
        let mut copy = self.get(existing)?.clone();
        copy.name = new_name.to_owned();
        self.themes.insert(copy.name.clone(), copy);
        Ok(())
    }
}
