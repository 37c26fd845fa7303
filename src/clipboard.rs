use anyhow::{anyhow, Result};
use tracing::debug;

/// Destination for "Copy" actions
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| anyhow!("System clipboard unavailable: {}", e))?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_owned())
            .map_err(|e| anyhow!("Copy failed: {}", e))?;
        debug!("Copied {} chars to the system clipboard", text.len());
        Ok(())
    }
}

/// In-process clipboard, used when no desktop clipboard is reachable (SSH, CI)
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// The system clipboard if there is one, otherwise an in-memory fallback
pub fn default_clipboard() -> Box<dyn Clipboard> {
    match SystemClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(e) => {
            tracing::warn!("{}; copies will stay inside the app", e);
            Box::new(MemoryClipboard::default())
        }
    }
}
