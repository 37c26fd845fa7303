use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use tracing::debug;

use super::components::{edit_text, input_line, status_span};
use super::view::{View, ViewContext};
use crate::controller::ComposeForm;

/// "Send Resume" tab
pub struct ComposeView {
    form: ComposeForm,
}

impl ComposeView {
    pub fn new(form: ComposeForm) -> Self {
        Self { form }
    }

    pub fn form(&self) -> &ComposeForm {
        &self.form
    }
}

impl View for ComposeView {
    fn render(&self, f: &mut Frame, area: Rect, _now: Instant) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Intro
                Constraint::Length(3), // Address input
                Constraint::Length(3), // Status
                Constraint::Min(0),
            ])
            .split(area);

        let intro = Paragraph::new(vec![
            Line::from("Send your resume with the saved template to one recipient."),
            Line::from(Span::styled(
                "The address is validated by the server.",
                Style::default().fg(Color::Gray),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("📧 Send Resume"));
        f.render_widget(intro, chunks[0]);

        let sending = self.form.is_sending();
        let input = Paragraph::new(input_line(
            "Recipient Email",
            self.form.email(),
            true,
            sending,
        ))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(input, chunks[1]);

        let status = if sending {
            Line::from(Span::styled("Sending...", Style::default().fg(Color::Yellow)))
        } else {
            match self.form.status() {
                Some(status) => Line::from(status_span(status)),
                None => Line::from(""),
            }
        };
        f.render_widget(
            Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status")),
            chunks[2],
        );
    }

    fn get_title(&self) -> String {
        "Compose".to_string()
    }

    fn get_status(&self) -> String {
        "Type an address • Enter: send • Esc: clear message".to_string()
    }

    fn captures_text(&self) -> bool {
        true
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut ViewContext<'_>) -> Result<bool> {
        match key.code {
            KeyCode::Enter => {
                if let Err(e) = self.form.submit() {
                    debug!("Send not started: {}", e);
                }
                Ok(true)
            }
            KeyCode::Esc => {
                self.form.clear_status();
                Ok(true)
            }
            _ => match self.form.email_mut() {
                Some(email) => Ok(edit_text(email, key)),
                // Swallow typing while the request is in flight
                None => Ok(matches!(key.code, KeyCode::Char(_) | KeyCode::Backspace)),
            },
        }
    }

    fn update(&mut self, _now: Instant) -> Result<()> {
        self.form.poll();
        Ok(())
    }
}
