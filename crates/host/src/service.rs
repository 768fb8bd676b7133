//! Service model: an ordered list of items, each carrying its own slides.
//!
//! Services persist as JSON. Loading parses the entire file before touching
//! the in-memory service, so a malformed file never leaves a half-replaced
//! state behind.

use std::path::{Path, PathBuf};

use {
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

use crate::error::{Context as _, Error, Result};

/// What a service item holds. Determines which tool created it and how the
/// live output would render it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Song,
    Custom,
    Image,
    Video,
    Audio,
    Presentation,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Song => "song",
            Self::Custom => "custom",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Presentation => "presentation",
        };
        f.write_str(s)
    }
}

/// One slide within a service item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub label: String,
    /// Verse or slide body for text items; `None` for media slides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Slide {
    pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: Some(text.into()),
        }
    }

    pub fn media(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: Uuid,
    pub title: String,
    pub kind: ItemKind,
    pub slides: Vec<Slide>,
    /// Credited author, for song items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Backing file for media and presentation items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    /// Per-item theme override; `None` falls back to the service theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl ServiceItem {
    pub fn new(title: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            slides: Vec::new(),
            author: None,
            source_path: None,
            theme: None,
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Song item built from optional lyrics. Verses are blank-line separated;
    /// without lyrics a single placeholder slide is produced.
    pub fn song_placeholder(title: &str, lyrics: Option<&str>) -> Self {
        let mut item = Self::new(title, ItemKind::Song);
        match lyrics {
            Some(lyrics) if !lyrics.trim().is_empty() => {
                for (i, verse) in lyrics
                    .split("\n\n")
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .enumerate()
                {
                    item.slides.push(Slide::text(format!("Verse {}", i + 1), verse));
                }
            },
            _ => {
                item.slides.push(Slide::text(
                    "Placeholder",
                    format!("Song: {title}\n\n(Lyrics not available)"),
                ));
            },
        }
        item
    }

    /// Media item (image, video, audio) with a single slide.
    pub fn media(title: impl Into<String>, kind: ItemKind, path: impl Into<PathBuf>) -> Self {
        let title = title.into();
        let mut item = Self::new(title.clone(), kind).with_source(path);
        item.slides.push(Slide::media(title));
        item
    }

    /// Presentation item with one slide per page.
    pub fn presentation(title: impl Into<String>, path: impl Into<PathBuf>, pages: usize) -> Self {
        let mut item = Self::new(title, ItemKind::Presentation).with_source(path);
        for i in 1..=pages.max(1) {
            item.slides.push(Slide::media(format!("Slide {i}")));
        }
        item
    }
}

pub const DEFAULT_THEME: &str = "Default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub items: Vec<ServiceItem>,
    /// Where this service was last loaded from or saved to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<PathBuf>,
    /// Service-wide theme name.
    pub theme: String,
    /// Unsaved changes flag.
    #[serde(default, skip_serializing)]
    pub modified: bool,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            file_name: None,
            theme: DEFAULT_THEME.to_owned(),
            modified: false,
        }
    }
}

impl Service {
    pub fn add_item(&mut self, item: ServiceItem) -> usize {
        self.items.push(item);
        self.modified = true;
        self.items.len() - 1
    }

    pub fn item(&self, index: usize) -> Result<&ServiceItem> {
        self.items.get(index).ok_or(Error::ItemIndex(index))
    }

    pub fn item_mut(&mut self, index: usize) -> Result<&mut ServiceItem> {
        self.items.get_mut(index).ok_or(Error::ItemIndex(index))
    }

    /// Parse a service file. The current service is untouched on any error.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service file {}", path.display()))?;
        let mut service: Self = serde_json::from_str(&raw)?;
        service.file_name = Some(path.to_path_buf());
        service.modified = false;
        Ok(service)
    }

    /// Write the service as pretty-printed JSON and clear the modified flag.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => self
                .file_name
                .clone()
                .ok_or_else(|| Error::message("service has no file name; pass a path"))?,
        };
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(&target, raw)?;
        self.file_name = Some(target.clone());
        self.modified = false;
        Ok(target)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_placeholder_splits_verses_on_blank_lines() {
        let item = ServiceItem::song_placeholder(
            "Amazing Grace",
            Some("Amazing grace\nhow sweet the sound\n\nThat saved\na wretch like me"),
        );
        assert_eq!(item.kind, ItemKind::Song);
        assert_eq!(item.slides.len(), 2);
        assert_eq!(item.slides[0].label, "Verse 1");
        assert!(item.slides[1].text.as_deref().unwrap().starts_with("That saved"));
    }

    #[test]
    fn song_placeholder_without_lyrics() {
        let item = ServiceItem::song_placeholder("Untitled", None);
        assert_eq!(item.slides.len(), 1);
        assert!(item.slides[0].text.as_deref().unwrap().contains("Lyrics not available"));
    }

    #[test]
    fn presentation_gets_a_slide_per_page() {
        let item = ServiceItem::presentation("Deck", "/tmp/deck.pdf", 5);
        assert_eq!(item.slides.len(), 5);
        assert_eq!(item.slides[4].label, "Slide 5");
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sunday.json");

        let mut service = Service::default();
        service.add_item(ServiceItem::song_placeholder("Hymn", Some("la la")));
        assert!(service.modified);
        service.save(Some(&path)).unwrap();
        assert!(!service.modified);

        let loaded = Service::load(&path).unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].title, "Hymn");
        assert_eq!(loaded.theme, DEFAULT_THEME);
        assert_eq!(loaded.file_name.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn load_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = Service::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Service::load(&path), Err(Error::Parse(_))));
    }

    #[test]
    fn save_without_file_name_needs_a_path() {
        let mut service = Service::default();
        assert!(service.save(None).is_err());
    }
}
