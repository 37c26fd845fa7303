use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::Instant;
use tracing::debug;

use super::components::{edit_text, input_line, status_span};
use super::layout::{centered_rect, render_dialog_frame};
use crate::controller::{AddEntryForm, EntryKind};
use crate::models::DraftField;

/// Overlay around the shared add form, reachable from every tab
pub struct AddEntryModal {
    form: AddEntryForm,
}

impl AddEntryModal {
    pub fn new(form: AddEntryForm) -> Self {
        Self { form }
    }

    pub fn form(&self) -> &AddEntryForm {
        &self.form
    }

    pub fn is_open(&self) -> bool {
        self.form.is_open()
    }

    pub fn open(&mut self, kind: EntryKind) {
        self.form.open(kind);
    }

    /// All keys go to the modal while it is open
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.form.close(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.form.focus_next(),
            KeyCode::Enter => {
                if let Err(e) = self.form.submit() {
                    debug!("Save not started: {}", e);
                }
            }
            _ => {
                if let Some(field) = self.form.focused_mut() {
                    edit_text(field, key);
                }
            }
        }
    }

    pub fn update(&mut self, now: Instant) {
        self.form.update(now);
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let kind = self.form.kind();
        let dialog = centered_rect(60, 9, area);
        let inner = render_dialog_frame(f, dialog, kind.title(), Color::Green);

        let busy = self.form.is_submitting();
        let focus = self.form.focus();
        let mut lines = vec![
            input_line(
                "Company Name",
                self.form.field(DraftField::CompanyName),
                focus == DraftField::CompanyName,
                busy,
            ),
            input_line(
                kind.link_label(),
                self.form.field(DraftField::Link),
                focus == DraftField::Link,
                busy,
            ),
            Line::from(""),
        ];
        lines.push(match (busy, self.form.status()) {
            (true, _) => Line::from(Span::styled("Saving...", Style::default().fg(Color::Yellow))),
            (false, Some(status)) => Line::from(status_span(status)),
            (false, None) => Line::from(""),
        });
        lines.push(Line::from(Span::styled(
            "Tab: next field • Enter: save • Esc: cancel",
            Style::default().fg(Color::Gray),
        )));

        f.render_widget(Paragraph::new(lines), inner);
    }
}
