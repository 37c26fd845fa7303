use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

/// Centralized layout management to prevent conflicts between views
pub struct TuiLayout {
    pub tab_bar: Rect,
    pub content: Rect,
    pub status_bar: Rect,
}

impl TuiLayout {
    /// Create a new layout from the given area
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tab bar
                Constraint::Min(0),    // Content
                Constraint::Length(4), // Status bar
            ])
            .split(area);

        Self {
            tab_bar: chunks[0],
            content: chunks[1],
            status_bar: chunks[2],
        }
    }

    /// Render the tab bar
    pub fn render_tab_bar(&self, f: &mut Frame, titles: Vec<String>, selected_tab: usize) {
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("EmailResumeSender"))
            .style(Style::default().fg(Color::White))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .select(selected_tab);

        f.render_widget(tabs, self.tab_bar);
    }

    /// Render the status bar: global keys, the view's own keys, and server status
    pub fn render_status_bar(&self, f: &mut Frame, view_hints: &str, server: Span<'static>) {
        let status_content = vec![
            Line::from(vec![
                Span::styled("Tab", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(" switch views • ", Style::default().fg(Color::Gray)),
                Span::styled("c", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled(" +Career • ", Style::default().fg(Color::Gray)),
                Span::styled("l", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled(" +Referral • ", Style::default().fg(Color::Gray)),
                Span::styled("q", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::styled(" quit • ", Style::default().fg(Color::Gray)),
                server,
            ]),
            Line::from(vec![Span::styled(
                view_hints.to_string(),
                Style::default().fg(Color::Cyan),
            )]),
        ];

        let paragraph = Paragraph::new(status_content)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::White));

        f.render_widget(paragraph, self.status_bar);
    }
}

/// Helper struct for view-specific layouts
pub struct ViewLayout {
    pub title: Rect,
    pub main_content: Rect,
}

impl ViewLayout {
    /// Create a view layout within the given content area
    pub fn new(content_area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Title, search and notices
                Constraint::Min(0),    // Main content
            ])
            .split(content_area);

        Self {
            title: chunks[0],
            main_content: chunks[1],
        }
    }
}

/// A box of `width_percent` x `height` rows centred in `area`
pub fn centered_rect(width_percent: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent.min(100)) / 2),
            Constraint::Percentage(width_percent.min(100)),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}

/// Clear `area` and draw a titled dialog frame; returns the inner area
pub fn render_dialog_frame(f: &mut Frame, area: Rect, title: &str, color: Color) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    inner
}
