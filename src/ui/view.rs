use anyhow::{anyhow, Result};
use crossterm::event::KeyEvent;
use ratatui::{prelude::Rect, Frame};
use std::time::Instant;

use crate::clipboard::Clipboard;
use crate::export::ExportSettings;

/// Shared services a view may use while handling a key
pub struct ViewContext<'a> {
    pub clipboard: &'a mut dyn Clipboard,
    pub export: &'a ExportSettings,
    pub now: Instant,
}

/// View contract for all TUI views (non-async for trait object compatibility)
pub trait View {
    /// Render the view
    fn render(&self, f: &mut Frame, area: Rect, now: Instant);

    /// Get the view title
    fn get_title(&self) -> String;

    /// Key hints for the status bar
    fn get_status(&self) -> String;

    /// Called when the view becomes the current tab
    fn mount(&mut self) {}

    /// Called when the view stops being the current tab
    fn unmount(&mut self) {}

    /// `true` while the view consumes plain characters (search box, form inputs)
    fn captures_text(&self) -> bool {
        false
    }

    /// Handle view-specific key events; returns `true` if the key was consumed
    fn handle_key(&mut self, _key: KeyEvent, _ctx: &mut ViewContext<'_>) -> Result<bool> {
        Ok(false)
    }

    /// Apply finished requests and lapse timed indicators (called every tick)
    fn update(&mut self, _now: Instant) -> Result<()> {
        Ok(())
    }
}

/// The tab strip: owns every view and tracks which one is on screen
///
/// Only the selected view is mounted. Switching unmounts the old tab before mounting the new one.
#[derive(Default)]
pub struct ViewManager {
    tabs: Vec<Box<dyn View>>,
    selected: usize,
}

impl ViewManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, view: Box<dyn View>) {
        self.tabs.push(view);
    }

    /// Mount the selected tab; called once at start-up
    pub fn mount_current(&mut self) {
        if let Some(view) = self.current_mut() {
            view.mount();
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    fn current(&self) -> Option<&dyn View> {
        self.tabs.get(self.selected).map(|tab| tab.as_ref())
    }

    fn current_mut(&mut self) -> Option<&mut (dyn View + 'static)> {
        self.tabs.get_mut(self.selected).map(|tab| tab.as_mut())
    }

    /// Move one tab right (`forward`) or left, wrapping at either end
    pub fn cycle(&mut self, forward: bool) {
        let count = self.tabs.len();
        if count == 0 {
            return;
        }
        let target = if forward {
            (self.selected + 1) % count
        } else {
            (self.selected + count - 1) % count
        };
        self.activate(target);
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.tabs.len() {
            return Err(anyhow!("No tab at position {}", index + 1));
        }
        self.activate(index);
        Ok(())
    }

    fn activate(&mut self, index: usize) {
        if index == self.selected {
            return;
        }
        if let Some(view) = self.current_mut() {
            view.unmount();
        }
        self.selected = index;
        if let Some(view) = self.current_mut() {
            view.mount();
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.tabs.iter().map(|tab| tab.get_title()).collect()
    }

    pub fn render(&self, f: &mut Frame, area: Rect, now: Instant) {
        if let Some(view) = self.current() {
            view.render(f, area, now);
        }
    }

    /// Key hints of the selected tab
    pub fn status(&self) -> String {
        self.current().map(|view| view.get_status()).unwrap_or_default()
    }

    pub fn captures_text(&self) -> bool {
        self.current().is_some_and(|view| view.captures_text())
    }

    /// Offer a key to the selected tab
    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext<'_>) -> Result<bool> {
        match self.current_mut() {
            Some(view) => view.handle_key(key, ctx),
            None => Ok(false),
        }
    }

    /// Update every tab; forms on hidden tabs still need their results applied
    pub fn update_all(&mut self, now: Instant) -> Result<()> {
        self.tabs.iter_mut().try_for_each(|tab| tab.update(now))
    }
}
