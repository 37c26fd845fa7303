use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::ListItem,
    Frame,
};
use std::time::{Duration, Instant};
use tracing::warn;

use super::layout::ViewLayout;
use super::lists::{
    export_notice, handle_search_key, refusal, render_list_header, render_placeholder,
    render_rows, ListCursor, NOTICE_TTL,
};
use super::view::{View, ViewContext};
use crate::controller::{ControllerError, HistoryController, StatusMessage};
use crate::models::EmailStatus;
use crate::timed::TimedState;
use crate::utils::{format_sent_at, truncate};

pub const COPIED_TTL: Duration = Duration::from_millis(2000);

/// Read-only list of sent emails
pub struct HistoryView {
    controller: HistoryController,
    cursor: ListCursor,
    copied: TimedState<i64>,
    notice: TimedState<StatusMessage>,
}

impl HistoryView {
    pub fn new(controller: HistoryController) -> Self {
        Self {
            controller,
            cursor: ListCursor::default(),
            copied: TimedState::new(),
            notice: TimedState::new(),
        }
    }

    pub fn controller(&self) -> &HistoryController {
        &self.controller
    }

    /// Copy the selected recipient; the row shows "Copied" for two seconds
    fn copy_selected(&mut self, ctx: &mut ViewContext<'_>) {
        let selected = self
            .controller
            .visible()
            .get(self.cursor.selected)
            .map(|record| (record.id, record.email.clone()));
        let (id, email) = match selected {
            Some(row) => row,
            None => return,
        };
        match ctx.clipboard.set_text(&email) {
            Ok(()) => self.copied.set(id, COPIED_TTL, ctx.now),
            Err(e) => {
                warn!("Failed to copy {}: {:#}", email, e);
                self.notice
                    .set(StatusMessage::error(e.to_string()), NOTICE_TTL, ctx.now);
            }
        }
    }
}

impl View for HistoryView {
    fn render(&self, f: &mut Frame, area: Rect, now: Instant) {
        let layout = ViewLayout::new(area);
        render_list_header(
            f,
            layout.title,
            "📨 Email History",
            &self.controller,
            &self.cursor,
            self.notice.get(now),
        );
        if render_placeholder(f, layout.main_content, &self.controller, "No emails sent yet") {
            return;
        }

        let copied = self.copied.get(now).copied();
        let rows: Vec<ListItem> = self
            .controller
            .visible()
            .into_iter()
            .map(|record| {
                let status_color = match record.status {
                    EmailStatus::Success => Color::Green,
                    EmailStatus::Failure => Color::Red,
                };
                let mut spans = vec![
                    Span::styled(
                        format!("{:<36}", truncate(&record.email, 36)),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:<26}", format_sent_at(&record.sent_at)),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(record.status.label(), Style::default().fg(status_color)),
                ];
                if copied == Some(record.id) {
                    spans.push(Span::styled("  Copied", Style::default().fg(Color::Cyan)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        render_rows(f, layout.main_content, "Sent", rows, self.cursor.selected);
    }

    fn get_title(&self) -> String {
        "History".to_string()
    }

    fn get_status(&self) -> String {
        if self.cursor.searching {
            "Type to filter • Enter: done • Esc: clear".to_string()
        } else {
            "↑/↓: select • y: copy address • /: search • x: export • r: refresh".to_string()
        }
    }

    fn mount(&mut self) {
        self.controller.mount();
    }

    fn unmount(&mut self) {
        self.controller.unmount();
        self.cursor.reset();
        self.copied.take();
        self.notice.take();
    }

    fn captures_text(&self) -> bool {
        self.cursor.searching
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext<'_>) -> Result<bool> {
        if self.cursor.searching {
            handle_search_key(&mut self.controller, &mut self.cursor, key);
            return Ok(true);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor.up(),
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor.down(self.controller.visible().len())
            }
            KeyCode::Char('y') => self.copy_selected(ctx),
            KeyCode::Char('/') => self.cursor.searching = true,
            KeyCode::Char('r') | KeyCode::Char('R') => self.controller.retry(),
            KeyCode::Char('x') => {
                let notice = if self.controller.is_loading() {
                    refusal(&ControllerError::NotReady)
                } else {
                    export_notice(self.controller.items(), ctx.export)
                };
                self.notice.set(notice, NOTICE_TTL, ctx.now);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn update(&mut self, now: Instant) -> Result<()> {
        self.controller.poll();
        self.cursor.clamp(self.controller.visible().len());
        self.copied.expire(now);
        self.notice.expire(now);
        Ok(())
    }
}
