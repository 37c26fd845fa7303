use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};

/// Unified TUI events
#[derive(Debug, Clone)]
pub enum TuiEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// Polls the terminal, yielding a `Tick` when nothing arrives within the tick rate
pub struct EventSource {
    tick_rate: Duration,
    last_tick: Instant,
}

impl EventSource {
    pub fn new(tick_rate: Duration) -> Self {
        Self {
            tick_rate,
            last_tick: Instant::now(),
        }
    }

    /// Wait for the next event, at most until the next tick is due
    pub fn next(&mut self) -> Result<TuiEvent> {
        let timeout = self.tick_rate.saturating_sub(self.last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                // Ignore release/repeat events reported by some terminals
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(TuiEvent::Key(key))
                }
                Event::Resize(width, height) => return Ok(TuiEvent::Resize(width, height)),
                _ => {}
            }
        }
        if self.last_tick.elapsed() >= self.tick_rate {
            self.last_tick = Instant::now();
        }
        Ok(TuiEvent::Tick)
    }
}
