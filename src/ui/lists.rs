//! Career and referral tabs, plus the list plumbing the history tab shares

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use tracing::{debug, error};

use super::components::{
    edit_text, input_line, render_empty, render_error, render_loading_indicator, status_span,
};
use super::layout::{centered_rect, render_dialog_frame, ViewLayout};
use super::view::{View, ViewContext};
use crate::api::{EditableApi, ResourceApi};
use crate::controller::{ControllerError, LoadPhase, ResourceController, StatusMessage};
use crate::export::{export_records, ExportSettings, Exportable};
use crate::models::{DraftField, Editable, EntryDraft, Resource};
use crate::timed::TimedState;
use crate::utils::{initial, truncate};

pub(super) const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Row selection and search-box state
#[derive(Debug, Default)]
pub(super) struct ListCursor {
    pub selected: usize,
    pub searching: bool,
}

impl ListCursor {
    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.selected = 0;
        self.searching = false;
    }
}

/// Keys while the search box has focus. Esc clears the query, Enter keeps it.
pub(super) fn handle_search_key<R, A>(
    controller: &mut ResourceController<R, A>,
    cursor: &mut ListCursor,
    key: KeyEvent,
) where
    R: Resource,
    A: ResourceApi<R> + ?Sized + 'static,
{
    match key.code {
        KeyCode::Esc => {
            controller.set_query("");
            cursor.searching = false;
        }
        KeyCode::Enter => cursor.searching = false,
        _ => {
            let mut query = controller.query().to_string();
            if edit_text(&mut query, key) {
                controller.set_query(query);
                cursor.selected = 0;
            }
        }
    }
}

/// Write the full collection (not just the filtered rows) and describe the outcome
pub(super) fn export_notice<R: Exportable>(records: &[R], settings: &ExportSettings) -> StatusMessage {
    match export_records(records, settings) {
        Ok(Some(path)) => StatusMessage::success(format!("Exported to {}", path.display())),
        Ok(None) => StatusMessage::info("Nothing to export"),
        Err(e) => {
            error!("Export failed: {:#}", e);
            StatusMessage::error(format!("Export failed: {}", e))
        }
    }
}

/// Inline text for an action the controller refused
pub(super) fn refusal(e: &ControllerError) -> StatusMessage {
    match e {
        ControllerError::NotReady => StatusMessage::info("Still loading..."),
        ControllerError::Busy => StatusMessage::info("A request for this entry is in progress"),
        other => StatusMessage::error(other.to_string()),
    }
}

/// Title block: entry count, search box and the latest notice
pub(super) fn render_list_header<R, A>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    controller: &ResourceController<R, A>,
    cursor: &ListCursor,
    notice: Option<&StatusMessage>,
) where
    R: Resource,
    A: ResourceApi<R> + ?Sized + 'static,
{
    let count = if controller.is_loading() {
        "loading...".to_string()
    } else {
        format!("{} total", controller.items().len())
    };
    let mut search = vec![Span::styled("Search: ", Style::default().fg(Color::Gray))];
    search.push(Span::styled(
        controller.query().to_string(),
        Style::default().fg(if cursor.searching { Color::Cyan } else { Color::White }),
    ));
    if cursor.searching {
        search.push(Span::styled("█", Style::default().fg(Color::Cyan)));
    }
    let mut status = vec![Span::styled(count, Style::default().fg(Color::Gray))];
    if let Some(notice) = notice {
        status.push(Span::raw("  "));
        status.push(status_span(notice));
    }

    let header = Paragraph::new(vec![Line::from(search), Line::from(status)])
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(header, area);
}

/// Loading, error and empty placeholders; `false` when there are rows to draw
pub(super) fn render_placeholder<R, A>(
    f: &mut Frame,
    area: Rect,
    controller: &ResourceController<R, A>,
    empty_hint: &str,
) -> bool
where
    R: Resource,
    A: ResourceApi<R> + ?Sized + 'static,
{
    if let LoadPhase::Failed(message) = controller.phase() {
        render_error(f, area, message);
        return true;
    }
    if controller.items().is_empty() {
        if controller.is_loading() {
            render_loading_indicator(f, area, &format!("Loading {}...", R::COLLECTION));
        } else {
            render_empty(f, area, empty_hint);
        }
        return true;
    }
    if controller.visible().is_empty() {
        render_empty(
            f,
            area,
            &format!("No results found for \"{}\"", controller.query()),
        );
        return true;
    }
    false
}

pub(super) fn render_rows(f: &mut Frame, area: Rect, title: &str, rows: Vec<ListItem>, selected: usize) {
    let list = List::new(rows)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(Style::default().bg(Color::LightBlue).fg(Color::Black))
        .highlight_symbol("→ ");

    f.render_stateful_widget(list, area, &mut ListState::default().with_selected(Some(selected)));
}

/// Careers or referrals tab with per-row edit and delete
pub struct EntryListView<R: Editable> {
    title: &'static str,
    empty_hint: &'static str,
    controller: ResourceController<R, dyn EditableApi<R>>,
    cursor: ListCursor,
    notice: TimedState<StatusMessage>,
}

impl<R: Editable + Exportable> EntryListView<R> {
    pub fn new(
        title: &'static str,
        empty_hint: &'static str,
        controller: ResourceController<R, dyn EditableApi<R>>,
    ) -> Self {
        Self {
            title,
            empty_hint,
            controller,
            cursor: ListCursor::default(),
            notice: TimedState::new(),
        }
    }

    pub fn controller(&self) -> &ResourceController<R, dyn EditableApi<R>> {
        &self.controller
    }

    fn selected_id(&self) -> Option<i64> {
        self.controller
            .visible()
            .get(self.cursor.selected)
            .map(|entry| entry.id())
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.controller.cancel_edit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                if let Some(form) = self.controller.edit_form_mut() {
                    form.focus = form.focus.next();
                }
            }
            KeyCode::Enter => {
                // Validation errors are stored on the form itself
                if let Err(e) = self.controller.submit_edit() {
                    debug!("Update not sent: {}", e);
                }
            }
            _ => {
                if let Some(form) = self.controller.edit_form_mut() {
                    if !form.submitting {
                        edit_text(form.focused_mut(), key);
                    }
                }
            }
        }
    }

    fn handle_delete_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Err(e) = self.controller.confirm_delete() {
                    debug!("Delete not sent: {}", e);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.controller.cancel_delete(),
            _ => {}
        }
    }

    fn render_entries(&self, f: &mut Frame, area: Rect) {
        let rows: Vec<ListItem> = self
            .controller
            .visible()
            .into_iter()
            .map(|entry| {
                let mut spans = vec![
                    Span::styled(
                        format!("[{}] ", initial(entry.search_key())),
                        Style::default().fg(Color::Magenta),
                    ),
                    Span::styled(
                        format!("{:<28}", truncate(entry.search_key(), 28)),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(truncate(entry.link(), 60), Style::default().fg(Color::Cyan)),
                ];
                if self.controller.is_in_flight(entry.id()) {
                    spans.push(Span::styled("  ⏳", Style::default().fg(Color::Yellow)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        render_rows(f, area, self.title, rows, self.cursor.selected);
    }

    fn render_edit_form(&self, f: &mut Frame, area: Rect) {
        let form = match self.controller.edit_form() {
            Some(form) => form,
            None => return,
        };
        let dialog = centered_rect(60, 9, area);
        let inner = render_dialog_frame(f, dialog, &format!("Edit {}", R::LABEL), Color::Yellow);

        let mut lines = vec![
            input_line(
                "Company Name",
                form.draft.field(DraftField::CompanyName),
                form.focus == DraftField::CompanyName,
                form.submitting,
            ),
            input_line(
                <R::Draft as EntryDraft>::LINK_LABEL,
                form.draft.field(DraftField::Link),
                form.focus == DraftField::Link,
                form.submitting,
            ),
            Line::from(""),
        ];
        lines.push(if form.submitting {
            Line::from(Span::styled("Saving...", Style::default().fg(Color::Yellow)))
        } else if let Some(error) = &form.error {
            Line::from(status_span(&StatusMessage::error(error.clone())))
        } else {
            Line::from("")
        });
        lines.push(Line::from(Span::styled(
            "Tab: next field • Enter: save • Esc: cancel",
            Style::default().fg(Color::Gray),
        )));
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn render_delete_confirmation(&self, f: &mut Frame, area: Rect) {
        let confirm = match self.controller.delete_confirmation() {
            Some(confirm) => confirm,
            None => return,
        };
        let name = self
            .controller
            .items()
            .iter()
            .find(|entry| entry.id() == confirm.id)
            .map(|entry| entry.search_key().to_string())
            .unwrap_or_default();
        let dialog = centered_rect(50, 7, area);
        let inner = render_dialog_frame(f, dialog, &format!("Delete {}", R::LABEL), Color::Red);

        let mut lines = vec![
            Line::from(format!("Delete \"{}\"? This cannot be undone.", name)),
            Line::from(""),
        ];
        lines.push(if confirm.deleting {
            Line::from(Span::styled("Deleting...", Style::default().fg(Color::Yellow)))
        } else if let Some(error) = &confirm.error {
            Line::from(status_span(&StatusMessage::error(error.clone())))
        } else {
            Line::from(Span::styled(
                "y: delete • n: keep",
                Style::default().fg(Color::Gray),
            ))
        });
        f.render_widget(Paragraph::new(lines), inner);
    }
}

impl<R: Editable + Exportable> View for EntryListView<R> {
    fn render(&self, f: &mut Frame, area: Rect, now: Instant) {
        let layout = ViewLayout::new(area);
        render_list_header(
            f,
            layout.title,
            self.title,
            &self.controller,
            &self.cursor,
            self.notice.get(now),
        );

        if !render_placeholder(f, layout.main_content, &self.controller, self.empty_hint) {
            self.render_entries(f, layout.main_content);
        }
        self.render_edit_form(f, area);
        self.render_delete_confirmation(f, area);
    }

    fn get_title(&self) -> String {
        self.title.to_string()
    }

    fn get_status(&self) -> String {
        if self.controller.delete_confirmation().is_some() {
            "y/Enter: confirm delete • n/Esc: keep".to_string()
        } else if self.controller.edit_form().is_some() {
            "Tab: next field • Enter: save • Esc: cancel".to_string()
        } else if self.cursor.searching {
            "Type to filter • Enter: done • Esc: clear".to_string()
        } else {
            "↑/↓: select • e: edit • d: delete • /: search • x: export • r: refresh".to_string()
        }
    }

    fn mount(&mut self) {
        self.controller.mount();
    }

    fn unmount(&mut self) {
        self.controller.unmount();
        self.cursor.reset();
        self.notice.take();
    }

    fn captures_text(&self) -> bool {
        self.cursor.searching
            || self.controller.edit_form().is_some()
            || self.controller.delete_confirmation().is_some()
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut ViewContext<'_>) -> Result<bool> {
        if self.controller.delete_confirmation().is_some() {
            self.handle_delete_key(key);
            return Ok(true);
        }
        if self.controller.edit_form().is_some() {
            self.handle_edit_key(key);
            return Ok(true);
        }
        if self.cursor.searching {
            handle_search_key(&mut self.controller, &mut self.cursor, key);
            return Ok(true);
        }

        let outcome = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor.up();
                Ok(())
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor.down(self.controller.visible().len());
                Ok(())
            }
            KeyCode::Char('e') | KeyCode::Enter => match self.selected_id() {
                Some(id) => self.controller.begin_edit(id),
                None => Ok(()),
            },
            KeyCode::Char('d') | KeyCode::Delete => match self.selected_id() {
                Some(id) => self.controller.request_delete(id),
                None => Ok(()),
            },
            KeyCode::Char('/') => {
                self.cursor.searching = true;
                Ok(())
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.controller.retry();
                Ok(())
            }
            KeyCode::Char('x') => {
                let notice = if self.controller.is_loading() {
                    refusal(&ControllerError::NotReady)
                } else {
                    export_notice(self.controller.items(), ctx.export)
                };
                self.notice.set(notice, NOTICE_TTL, ctx.now);
                Ok(())
            }
            _ => return Ok(false),
        };

        if let Err(e) = outcome {
            self.notice.set(refusal(&e), NOTICE_TTL, ctx.now);
        }
        Ok(true)
    }

    fn update(&mut self, now: Instant) -> Result<()> {
        self.controller.poll();
        self.cursor.clamp(self.controller.visible().len());
        self.notice.expire(now);
        Ok(())
    }
}
