//! The single-threaded application state the command loop owns.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    service::{ItemKind, Service, ServiceItem},
    theme::{Theme, ThemeSet},
};

/// Which slide is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LivePosition {
    pub item: usize,
    pub slide: usize,
}

/// One row of `get_service_items` output.
#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub index: usize,
    pub title: String,
    pub kind: ItemKind,
    pub slide_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// `get_current_slide` output.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSlide {
    pub item_index: usize,
    pub item_title: String,
    pub slide_index: usize,
    pub slide_label: String,
    pub slide_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Default)]
pub struct HostState {
    pub service: Service,
    pub themes: ThemeSet,
    live: Option<LivePosition>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Service ──────────────────────────────────────────────────────────────

    /// Replace the current service with an empty one.
    pub fn create_service(&mut self) {
        self.service = Service::default();
        self.live = None;
    }

    /// Load a service file. The current service survives any parse error.
    pub fn load_service(&mut self, path: &Path) -> Result<usize> {
        let loaded = Service::load(path)?;
        let count = loaded.items.len();
        self.service = loaded;
        self.live = None;
        Ok(count)
    }

    pub fn save_service(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        self.service.save(path)
    }

    pub fn service_items(&self) -> Vec<ItemSummary> {
        self.service
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemSummary {
                index,
                title: item.title.clone(),
                kind: item.kind,
                slide_count: item.slides.len(),
                theme: item.theme.clone(),
            })
            .collect()
    }

    pub fn add_item(&mut self, item: ServiceItem) -> usize {
        self.service.add_item(item)
    }

    // ── Live control ─────────────────────────────────────────────────────────

    pub fn go_live(&mut self, item_index: usize) -> Result<LivePosition> {
        let item = self.service.item(item_index)?;
        if item.slides.is_empty() {
            return Err(Error::message(format!(
                "item {item_index} ('{}') has no slides",
                item.title
            )));
        }
        let pos = LivePosition {
            item: item_index,
            slide: 0,
        };
        self.live = Some(pos);
        Ok(pos)
    }

    pub fn go_to_slide(&mut self, slide_index: usize) -> Result<LivePosition> {
        let pos = self.live.ok_or(Error::NotLive)?;
        let item = self.service.item(pos.item)?;
        if slide_index >= item.slides.len() {
            return Err(Error::SlideIndex(slide_index));
        }
        let pos = LivePosition {
            item: pos.item,
            slide: slide_index,
        };
        self.live = Some(pos);
        Ok(pos)
    }

    /// Advance one slide, moving into the next item with slides when the
    /// current item is exhausted. At the very end the position is unchanged.
    pub fn next_slide(&mut self) -> Result<LivePosition> {
        let pos = self.live.ok_or(Error::NotLive)?;
        let item = self.service.item(pos.item)?;
        let next = if pos.slide + 1 < item.slides.len() {
            LivePosition {
                item: pos.item,
                slide: pos.slide + 1,
            }
        } else {
            match self.next_item_with_slides(pos.item) {
                Some(item) => LivePosition { item, slide: 0 },
                None => pos,
            }
        };
        self.live = Some(next);
        Ok(next)
    }

    /// Step back one slide, moving to the previous item's last slide at an
    /// item boundary. At the very start the position is unchanged.
    pub fn previous_slide(&mut self) -> Result<LivePosition> {
        let pos = self.live.ok_or(Error::NotLive)?;
        let prev = if pos.slide > 0 {
            LivePosition {
                item: pos.item,
                slide: pos.slide - 1,
            }
        } else {
            match self.previous_item_with_slides(pos.item) {
                Some(item) => LivePosition {
                    item,
                    slide: self.service.items[item].slides.len() - 1,
                },
                None => pos,
            }
        };
        self.live = Some(prev);
        Ok(prev)
    }

    pub fn current_slide(&self) -> Result<CurrentSlide> {
        let pos = self.live.ok_or(Error::NotLive)?;
        let item = self.service.item(pos.item)?;
        let slide = item.slides.get(pos.slide).ok_or(Error::SlideIndex(pos.slide))?;
        Ok(CurrentSlide {
            item_index: pos.item,
            item_title: item.title.clone(),
            slide_index: pos.slide,
            slide_label: slide.label.clone(),
            slide_count: item.slides.len(),
            text: slide.text.clone(),
        })
    }

    fn next_item_with_slides(&self, from: usize) -> Option<usize> {
        self.service
            .items
            .iter()
            .enumerate()
            .skip(from + 1)
            .find(|(_, item)| !item.slides.is_empty())
            .map(|(i, _)| i)
    }

    fn previous_item_with_slides(&self, from: usize) -> Option<usize> {
        self.service
            .items
            .iter()
            .enumerate()
            .take(from)
            .rev()
            .find(|(_, item)| !item.slides.is_empty())
            .map(|(i, _)| i)
    }

    // ── Themes ───────────────────────────────────────────────────────────────

    pub fn list_themes(&self) -> Vec<String> {
        self.themes.names()
    }

    pub fn set_service_theme(&mut self, name: &str) -> Result<()> {
        if !self.themes.contains(name) {
            return Err(Error::ThemeNotFound(name.to_owned()));
        }
        self.service.theme = name.to_owned();
        self.service.modified = true;
        Ok(())
    }

    pub fn create_theme(&mut self, theme: Theme) -> Result<()> {
        self.themes.create(theme)
    }

    pub fn theme_details(&self, name: &str) -> Result<&Theme> {
        self.themes.get(name)
    }

    pub fn update_theme(&mut self, theme: Theme) -> Result<()> {
        self.themes.update(theme)
    }

    pub fn delete_theme(&mut self, name: &str) -> Result<()> {
        self.themes.delete(name, &self.service.theme)
    }

    pub fn duplicate_theme(&mut self, existing: &str, new_name: &str) -> Result<()> {
        self.themes.duplicate(existing, new_name)
    }

    pub fn set_item_theme(&mut self, item_index: usize, theme_name: &str) -> Result<()> {
        if !self.themes.contains(theme_name) {
            return Err(Error::ThemeNotFound(theme_name.to_owned()));
        }
        let item = self.service.item_mut(item_index)?;
        item.theme = Some(theme_name.to_owned());
        self.service.modified = true;
        Ok(())
    }

    /// The theme an item renders with: its own override or the service theme.
    pub fn item_theme(&self, item_index: usize) -> Result<(String, bool)> {
        let item = self.service.item(item_index)?;
        match &item.theme {
            Some(name) => Ok((name.clone(), true)),
            None => Ok((self.service.theme.clone(), false)),
        }
    }

    pub fn clear_item_theme(&mut self, item_index: usize) -> Result<()> {
        let item = self.service.item_mut(item_index)?;
        item.theme = None;
        self.service.modified = true;
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::service::{ItemKind, ServiceItem},
    };

    fn two_item_state() -> HostState {
        let mut state = HostState::new();
        state.add_item(ServiceItem::song_placeholder("Song", Some("v1\n\nv2")));
        state.add_item(ServiceItem::presentation("Deck", "/tmp/deck.pdf", 3));
        state
    }

    #[test]
    fn next_slide_crosses_item_boundary() {
        let mut state = two_item_state();
        state.go_live(0).unwrap();
        state.next_slide().unwrap();
        let pos = state.next_slide().unwrap();
        assert_eq!(pos, LivePosition { item: 1, slide: 0 });
    }

    #[test]
    fn previous_slide_crosses_back_to_last_slide() {
        let mut state = two_item_state();
        state.go_live(1).unwrap();
        let pos = state.previous_slide().unwrap();
        assert_eq!(pos, LivePosition { item: 0, slide: 1 });
    }

    #[test]
    fn navigation_clamps_at_service_ends() {
        let mut state = two_item_state();
        state.go_live(0).unwrap();
        let pos = state.previous_slide().unwrap();
        assert_eq!(pos, LivePosition { item: 0, slide: 0 });

        state.go_live(1).unwrap();
        state.go_to_slide(2).unwrap();
        let pos = state.next_slide().unwrap();
        assert_eq!(pos, LivePosition { item: 1, slide: 2 });
    }

    #[test]
    fn navigation_skips_empty_items() {
        let mut state = two_item_state();
        let empty = ServiceItem::new("Empty", ItemKind::Custom);
        state.service.items.insert(1, empty);

        state.go_live(0).unwrap();
        state.go_to_slide(1).unwrap();
        let pos = state.next_slide().unwrap();
        assert_eq!(pos, LivePosition { item: 2, slide: 0 });
    }

    #[test]
    fn navigation_requires_live() {
        let mut state = two_item_state();
        assert!(matches!(state.next_slide(), Err(Error::NotLive)));
        assert!(matches!(state.current_slide(), Err(Error::NotLive)));
    }

    #[test]
    fn go_live_rejects_bad_index_and_empty_item() {
        let mut state = two_item_state();
        assert!(matches!(state.go_live(9), Err(Error::ItemIndex(9))));
        let idx = state.add_item(ServiceItem::new("Empty", ItemKind::Custom));
        assert!(state.go_live(idx).is_err());
    }

    #[test]
    fn current_slide_reports_text() {
        let mut state = two_item_state();
        state.go_live(0).unwrap();
        let current = state.current_slide().unwrap();
        assert_eq!(current.item_title, "Song");
        assert_eq!(current.slide_count, 2);
        assert_eq!(current.text.as_deref(), Some("v1"));
    }

    #[test]
    fn item_theme_falls_back_to_service_theme() {
        let mut state = two_item_state();
        state.create_theme(Theme::named("Dark")).unwrap();

        assert_eq!(state.item_theme(0).unwrap(), ("Default".to_owned(), false));
        state.set_item_theme(0, "Dark").unwrap();
        assert_eq!(state.item_theme(0).unwrap(), ("Dark".to_owned(), true));
        state.clear_item_theme(0).unwrap();
        assert_eq!(state.item_theme(0).unwrap(), ("Default".to_owned(), false));
    }

    #[test]
    fn set_item_theme_requires_known_theme() {
        let mut state = two_item_state();
        assert!(matches!(
            state.set_item_theme(0, "Missing"),
            Err(Error::ThemeNotFound(_))
        ));
    }

    #[test]
    fn set_service_theme_marks_modified() {
        let mut state = two_item_state();
        state.create_theme(Theme::named("Dark")).unwrap();
        state.service.modified = false;
        state.set_service_theme("Dark").unwrap();
        assert!(state.service.modified);
        assert_eq!(state.service.theme, "Dark");
    }

    #[test]
    fn load_service_resets_live_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svc.json");
        let mut state = two_item_state();
        state.go_live(0).unwrap();
        state.save_service(Some(&path)).unwrap();

        state.load_service(&path).unwrap();
        assert!(matches!(state.current_slide(), Err(Error::NotLive)));
    }
}
