/// UI components and utilities shared by the views
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::controller::{StatusKind, StatusMessage};

/// Render a status message as a coloured pill
pub fn status_span(status: &StatusMessage) -> Span<'static> {
    let color = match status.kind {
        StatusKind::Success => Color::Green,
        StatusKind::Error => Color::Red,
        StatusKind::Info => Color::Cyan,
    };
    Span::styled(
        format!(" {} ", status.text),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Render a loading indicator
pub fn render_loading_indicator(f: &mut Frame, area: Rect, message: &str) {
    let loading = Paragraph::new(message)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Loading"))
        .style(Style::default().fg(Color::Yellow));

    f.render_widget(loading, area);
}

/// Render error message with a retry hint
pub fn render_error(f: &mut Frame, area: Rect, error: &str) {
    let error_paragraph = Paragraph::new(vec![
        Line::from(format!("Error: {}", error)),
        Line::from(""),
        Line::from(Span::styled(
            "Press R to retry",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title("Error"))
    .style(Style::default().fg(Color::Red));

    f.render_widget(error_paragraph, area);
}

/// Render the placeholder for an empty list
pub fn render_empty(f: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(message)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));

    f.render_widget(paragraph, area);
}

/// One labelled text input, with a cursor block when focused
pub fn input_line(label: &str, value: &str, focused: bool, disabled: bool) -> Line<'static> {
    let value_style = if disabled {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let mut spans = vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(value.to_string(), value_style),
    ];
    if focused && !disabled {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

/// Apply a key press to a text buffer; returns `true` if the buffer changed
pub fn edit_text(buffer: &mut String, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.push(c);
            true
        }
        KeyCode::Backspace => buffer.pop().is_some(),
        _ => false,
    }
}
