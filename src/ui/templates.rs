use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use tracing::warn;

use super::components::{render_error, render_loading_indicator, status_span};
use super::history::COPIED_TTL;
use super::lists::NOTICE_TTL;
use super::view::{View, ViewContext};
use crate::controller::{LoadPhase, StatusMessage, TemplateController};
use crate::timed::TimedState;

/// Shows the outreach template and copies its body
pub struct TemplatesView {
    controller: TemplateController,
    copied: TimedState<()>,
    notice: TimedState<StatusMessage>,
}

impl TemplatesView {
    pub fn new(controller: TemplateController) -> Self {
        Self {
            controller,
            copied: TimedState::new(),
            notice: TimedState::new(),
        }
    }

    fn copy_body(&mut self, ctx: &mut ViewContext<'_>) {
        let body = match self.controller.content() {
            Some(content) => content.body.clone(),
            None => return,
        };
        match ctx.clipboard.set_text(&body) {
            Ok(()) => self.copied.set((), COPIED_TTL, ctx.now),
            Err(e) => {
                warn!("Failed to copy template: {:#}", e);
                self.notice
                    .set(StatusMessage::error(e.to_string()), NOTICE_TTL, ctx.now);
            }
        }
    }
}

impl View for TemplatesView {
    fn render(&self, f: &mut Frame, area: Rect, now: Instant) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let mut header = vec![Span::styled(
            "[y] Copy Template",
            Style::default().fg(Color::Green),
        )];
        if self.copied.get(now).is_some() {
            header = vec![Span::styled(
                "Copied!",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )];
        }
        if let Some(notice) = self.notice.get(now) {
            header.push(Span::raw("  "));
            header.push(status_span(notice));
        }
        f.render_widget(
            Paragraph::new(Line::from(header))
                .block(Block::default().borders(Borders::ALL).title("📄 Email Template")),
            chunks[0],
        );

        match (self.controller.phase(), self.controller.content()) {
            (LoadPhase::Failed(message), _) => render_error(f, chunks[1], message),
            (_, Some(content)) => {
                let mut lines = vec![
                    Line::from(vec![
                        Span::styled("Subject: ", Style::default().fg(Color::Gray)),
                        Span::styled(
                            content.subject.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(""),
                ];
                lines.extend(content.body.lines().map(|line| Line::from(line.to_string())));
                f.render_widget(
                    Paragraph::new(lines)
                        .wrap(Wrap { trim: false })
                        .block(Block::default().borders(Borders::ALL)),
                    chunks[1],
                );
            }
            _ => render_loading_indicator(f, chunks[1], "Loading template..."),
        }
    }

    fn get_title(&self) -> String {
        "Templates".to_string()
    }

    fn get_status(&self) -> String {
        "y: copy template body • r: reload".to_string()
    }

    fn mount(&mut self) {
        self.controller.mount();
    }

    fn unmount(&mut self) {
        self.controller.unmount();
        self.copied.take();
        self.notice.take();
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext<'_>) -> Result<bool> {
        match key.code {
            KeyCode::Char('y') => self.copy_body(ctx),
            KeyCode::Char('r') | KeyCode::Char('R') => self.controller.load(),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn update(&mut self, now: Instant) -> Result<()> {
        self.controller.poll();
        self.copied.expire(now);
        self.notice.expire(now);
        Ok(())
    }
}
