use color_eyre::Result;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedReceiver;

use super::{
    event::{AppEvent, EventHandler},
    widgets::SearchBar,
};
use crate::application::{
    EntityForm, EntityState, Route, Services, Store, StoreAction, StoreEntity, Submission, View,
    ViewEffect,
};
use crate::domain::datetime::{display_date, display_date_time};
use crate::domain::{
    Comment, DomainError, Entity, EntityId, EntityKind, FieldKind, FieldSpec, FieldValue, Message, Project,
    Task, UserInfo,
};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Main,
    Help,
}

struct ListRow {
    id: Option<EntityId>,
    cells: Vec<String>,
}

/// Type-erased snapshot of one container, enough to draw any screen.
struct ViewModel {
    header: Vec<&'static str>,
    rows: Vec<ListRow>,
    entity_id: Option<EntityId>,
    entity_title: String,
    details: Vec<(&'static str, String)>,
}

impl ViewModel {
    fn from_state<E: StoreEntity>(state: &EntityState<E>) -> Self {
        let columns = summary_fields(E::fields());

        let mut header = vec!["ID", "Title"];
        header.extend(columns.iter().map(|f| f.label));

        let rows = state
            .entities
            .iter()
            .map(|entity| {
                let mut cells = vec![
                    entity.id().map(|id| id.to_string()).unwrap_or_default(),
                    match entity.badge() {
                        Some(badge) => format!("{} [{}]", entity.title(), badge),
                        None => entity.title(),
                    },
                ];
                cells.extend(
                    columns
                        .iter()
                        .map(|f| entity.get_field(f.name).map(cell_text).unwrap_or_default()),
                );
                ListRow { id: entity.id(), cells }
            })
            .collect();

        let entity = &state.entity;
        let details = E::fields()
            .iter()
            .map(|f| (f.label, entity.get_field(f.name).map(cell_text).unwrap_or_default()))
            .collect();

        Self {
            header,
            rows,
            entity_id: entity.id(),
            entity_title: entity.title(),
            details,
        }
    }
}

/// Non-text columns shown next to the title in list tables.
fn summary_fields(fields: &'static [FieldSpec]) -> Vec<&'static FieldSpec> {
    fields
        .iter()
        .filter(|f| !matches!(f.kind, FieldKind::Text))
        .take(3)
        .collect()
}

fn cell_text(value: FieldValue) -> String {
    match value {
        FieldValue::Text(v) | FieldValue::Choice(v) => v.unwrap_or_default(),
        FieldValue::Number(v) => v.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::DateTime(v) => v.as_ref().map(display_date_time).unwrap_or_default(),
        FieldValue::Date(v) => v.as_ref().map(display_date).unwrap_or_default(),
        FieldValue::Relation(v) => v.map(|id| format!("#{id}")).unwrap_or_default(),
    }
}

pub struct App {
    services: Arc<Services>,
    store: Store,
    actions: UnboundedReceiver<StoreAction>,

    route: Route,
    mode: AppMode,

    // List
    search_bar: SearchBar,
    list_state: TableState,

    // Form
    form: Option<EntityForm>,
    form_cursor: usize,
    form_errors: Vec<DomainError>,

    // Completion count of the routed kind when last checked
    seen_completions: u64,
}

impl App {
    pub fn new(services: Arc<Services>, actions: UnboundedReceiver<StoreAction>, route: Route) -> Self {
        Self {
            services,
            store: Store::new(),
            actions,
            route,
            mode: AppMode::Main,
            search_bar: SearchBar::new(),
            list_state: TableState::default(),
            form: None,
            form_cursor: 0,
            form_errors: Vec::new(),
            seen_completions: 0,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn initialize(&mut self) {
        let route = self.route.clone();
        self.navigate(route);
    }

    pub fn navigate(&mut self, route: Route) {
        tracing::debug!("Navigating to {}", route);

        self.route = route;
        self.form = None;
        self.form_cursor = 0;
        self.form_errors.clear();
        self.list_state.select(Some(0));
        self.search_bar.set_focused(false);
        self.search_bar.set_query(self.route.query.as_deref().unwrap_or(""));
        self.seen_completions = self.store.status(self.route.kind).completions;

        if self.route.view == View::New {
            self.form = Some(self.new_form(self.route.kind));
        }

        let effects = self.route.activation_effects();
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<ViewEffect>) {
        for effect in effects {
            match effect {
                ViewEffect::Navigate(route) => self.navigate(route),
                effect => {
                    let services = self.services.clone();
                    tokio::spawn(async move {
                        if let Err(e) = services.execute(effect).await {
                            tracing::warn!("View effect failed: {}", e);
                        }
                    });
                }
            }
        }
    }

    /// Applies queued store actions and reacts to what changed.
    pub fn tick(&mut self) {
        self.store.drain(&mut self.actions);

        let status = self.store.status(self.route.kind);
        let completed = status.completions > self.seen_completions;
        self.seen_completions = status.completions;

        if completed {
            if let Some(effect) = self.route.completion_effect() {
                self.run_effects(vec![effect]);
                return;
            }
        }

        if let View::Edit(id) = self.route.view {
            if self.form.is_none() && !status.loading {
                self.form = self.loaded_form(id);
            }
        }

        let len = status.count;
        match self.list_state.selected() {
            Some(i) if len > 0 && i >= len => self.list_state.select(Some(len - 1)),
            None if len > 0 => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    fn new_form(&self, kind: EntityKind) -> EntityForm {
        match kind {
            EntityKind::Project => EntityForm::for_new::<Project>(),
            EntityKind::Task => EntityForm::for_new::<Task>(),
            EntityKind::Comment => EntityForm::for_new::<Comment>(),
            EntityKind::UserInfo => EntityForm::for_new::<UserInfo>(),
            EntityKind::Message => EntityForm::for_new::<Message>(),
        }
    }

    fn loaded_form(&self, id: EntityId) -> Option<EntityForm> {
        fn build<E: StoreEntity>(store: &Store, id: EntityId) -> Option<EntityForm> {
            let entity = &store.state::<E>().entity;
            (entity.id() == Some(id)).then(|| EntityForm::for_edit(entity))
        }

        match self.route.kind {
            EntityKind::Project => build::<Project>(&self.store, id),
            EntityKind::Task => build::<Task>(&self.store, id),
            EntityKind::Comment => build::<Comment>(&self.store, id),
            EntityKind::UserInfo => build::<UserInfo>(&self.store, id),
            EntityKind::Message => build::<Message>(&self.store, id),
        }
    }

    fn view_model(&self) -> ViewModel {
        match self.route.kind {
            EntityKind::Project => ViewModel::from_state(self.store.state::<Project>()),
            EntityKind::Task => ViewModel::from_state(self.store.state::<Task>()),
            EntityKind::Comment => ViewModel::from_state(self.store.state::<Comment>()),
            EntityKind::UserInfo => ViewModel::from_state(self.store.state::<UserInfo>()),
            EntityKind::Message => ViewModel::from_state(self.store.state::<Message>()),
        }
    }

    fn selected_id(&self) -> Option<EntityId> {
        let selected = self.list_state.selected()?;
        self.view_model().rows.get(selected).and_then(|row| row.id)
    }

    fn submit(&mut self) {
        match self.route.kind {
            EntityKind::Project => self.submit_form::<Project>(),
            EntityKind::Task => self.submit_form::<Task>(),
            EntityKind::Comment => self.submit_form::<Comment>(),
            EntityKind::UserInfo => self.submit_form::<UserInfo>(),
            EntityKind::Message => self.submit_form::<Message>(),
        }
    }

    fn submit_form<E: StoreEntity>(&mut self) {
        let Some(form) = &self.form else {
            return;
        };

        let submission = form.submit(&self.store.state::<E>().entity, &self.store.related());
        match submission {
            Ok(submission) => {
                self.form_errors.clear();
                let services = self.services.clone();
                tokio::spawn(async move {
                    let service = services.service::<E>();
                    let result = match submission {
                        Submission::Create(entity) => service.create_entity(&entity).await.map(drop),
                        Submission::Update(entity) => service.update_entity(&entity).await.map(drop),
                    };
                    if let Err(e) = result {
                        tracing::warn!("Saving {} failed: {}", E::KIND, e);
                    }
                });
            }
            Err(errors) => {
                tracing::debug!("{} form has {} invalid fields", E::KIND, errors.len());
                self.form_errors = errors;
            }
        }
    }

    fn confirm_delete(&mut self, id: EntityId) {
        let services = self.services.clone();
        let kind = self.route.kind;
        tokio::spawn(async move {
            if let Err(e) = services.delete(kind, id).await {
                tracing::warn!("Deleting {} {} failed: {}", kind, id, e);
            }
        });
    }

    fn switch_kind(&mut self, kind: EntityKind) {
        if kind != self.route.kind {
            self.navigate(Route::list(kind));
        }
    }

    fn step_kind(&mut self, forward: bool) {
        let kinds: Vec<EntityKind> = EntityKind::iter().collect();
        let current = kinds.iter().position(|k| *k == self.route.kind).unwrap_or(0);
        let next = if forward {
            (current + 1) % kinds.len()
        } else {
            (current + kinds.len() - 1) % kinds.len()
        };
        self.switch_kind(kinds[next]);
    }

    fn next_row(&mut self) {
        let len = self.store.status(self.route.kind).count;
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map(|i| (i + 1).min(len - 1)).unwrap_or(0);
        self.list_state.select(Some(i));
    }

    fn previous_row(&mut self) {
        let i = self.list_state.selected().map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.list_state.select(Some(i));
    }

    pub async fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        if event == AppEvent::Quit {
            return Ok(true);
        }

        if self.mode == AppMode::Help {
            if event != AppEvent::Tick {
                self.mode = AppMode::Main;
            }
            return Ok(false);
        }

        if self.search_bar.is_focused() {
            self.handle_search_event(event);
            return Ok(false);
        }

        match self.route.view {
            View::List => return Ok(self.handle_list_event(event)),
            View::Detail(id) => return Ok(self.handle_detail_event(event, id)),
            View::New | View::Edit(_) => self.handle_form_event(event),
            View::Delete(id) => self.handle_delete_event(event, id),
        }
        Ok(false)
    }

    fn handle_search_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Character(c) => self.search_bar.insert_char(c),
            AppEvent::Backspace => self.search_bar.delete_char(),
            AppEvent::Enter => {
                let query = self.search_bar.query().trim().to_string();
                let route = Route::list(self.route.kind).with_query(Some(query));
                self.navigate(route);
            }
            AppEvent::CloseModal => {
                self.search_bar.set_focused(false);
                self.search_bar.set_query(self.route.query.as_deref().unwrap_or(""));
            }
            _ => {}
        }
    }

    fn handle_list_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Character('q') => return true,
            AppEvent::Character('?') => self.mode = AppMode::Help,
            AppEvent::Character('/') => self.search_bar.set_focused(true),
            AppEvent::Character('r') => self.navigate(self.route.clone()),
            AppEvent::Character('n') => self.navigate(self.route.to(View::New)),
            AppEvent::Character('j') | AppEvent::Next => self.next_row(),
            AppEvent::Character('k') | AppEvent::Previous => self.previous_row(),
            AppEvent::Character('g') => self.list_state.select(Some(0)),
            AppEvent::Character('G') => {
                let len = self.store.status(self.route.kind).count;
                self.list_state.select(Some(len.saturating_sub(1)));
            }
            AppEvent::PageDown => (0..10).for_each(|_| self.next_row()),
            AppEvent::PageUp => (0..10).for_each(|_| self.previous_row()),
            AppEvent::Character(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                if let Some(kind) = EntityKind::iter().nth(index) {
                    self.switch_kind(kind);
                }
            }
            AppEvent::Tab => self.step_kind(true),
            AppEvent::BackTab => self.step_kind(false),
            AppEvent::Enter | AppEvent::Character('e') | AppEvent::Character('d') => {
                if let Some(id) = self.selected_id() {
                    let view = match event {
                        AppEvent::Character('e') => View::Edit(id),
                        AppEvent::Character('d') => View::Delete(id),
                        _ => View::Detail(id),
                    };
                    self.navigate(self.route.to(view));
                }
            }
            _ => {}
        }
        false
    }

    fn handle_detail_event(&mut self, event: AppEvent, id: EntityId) -> bool {
        match event {
            AppEvent::Character('q') | AppEvent::CloseModal | AppEvent::Backspace => {
                self.navigate(self.route.to(View::List))
            }
            AppEvent::Character('?') => self.mode = AppMode::Help,
            AppEvent::Character('r') => self.navigate(self.route.clone()),
            AppEvent::Character('e') => self.navigate(self.route.to(View::Edit(id))),
            AppEvent::Character('d') => self.navigate(self.route.to(View::Delete(id))),
            _ => {}
        }
        false
    }

    fn handle_form_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CloseModal => {
                self.navigate(self.route.to(View::List));
                return;
            }
            AppEvent::Submit => {
                self.submit();
                return;
            }
            _ => {}
        }

        let related = self.store.related();
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let len = form.len();

        match event {
            AppEvent::Tab | AppEvent::Next | AppEvent::Enter if len > 0 => {
                self.form_cursor = (self.form_cursor + 1) % len
            }
            AppEvent::BackTab | AppEvent::Previous if len > 0 => {
                self.form_cursor = (self.form_cursor + len - 1) % len
            }
            AppEvent::CycleNext => form.cycle(self.form_cursor, &related, true),
            AppEvent::CyclePrevious => form.cycle(self.form_cursor, &related, false),
            AppEvent::Character(c) => {
                let mut value = form.value_at(self.form_cursor).to_string();
                value.push(c);
                form.set_at(self.form_cursor, value);
            }
            AppEvent::Backspace => {
                let mut value = form.value_at(self.form_cursor).to_string();
                value.pop();
                form.set_at(self.form_cursor, value);
            }
            _ => {}
        }
    }

    fn handle_delete_event(&mut self, event: AppEvent, id: EntityId) {
        match event {
            AppEvent::Character('y') | AppEvent::Enter => self.confirm_delete(id),
            AppEvent::Character('n') | AppEvent::Character('q') | AppEvent::CloseModal => {
                self.navigate(self.route.to(View::List))
            }
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Entity tabs
                Constraint::Length(3), // Query bar
                Constraint::Min(0),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        self.render_tabs(frame, main_chunks[0]);
        self.search_bar.render(frame, main_chunks[1]);

        let model = self.view_model();
        match self.route.view {
            View::List | View::Delete(_) => self.render_list(frame, main_chunks[2], &model),
            View::Detail(_) => self.render_detail(frame, main_chunks[2], &model),
            View::New | View::Edit(_) => self.render_form(frame, main_chunks[2]),
        }

        if let View::Delete(id) = self.route.view {
            self.render_delete_dialog(frame, id, &model);
        }

        self.render_status_bar(frame, main_chunks[3]);

        if self.mode == AppMode::Help {
            self.render_help(frame);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<String> = EntityKind::iter()
            .enumerate()
            .map(|(i, kind)| format!("{} {}", i + 1, kind.plural_label()))
            .collect();
        let selected = EntityKind::iter().position(|k| k == self.route.kind).unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(self.route.to_string()),
            )
            .select(selected)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        frame.render_widget(tabs, area);
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect, model: &ViewModel) {
        let status = self.store.status(self.route.kind);
        let block = Block::default()
            .title(format!("{} ({})", self.route.kind.plural_label(), model.rows.len()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green));

        if status.loading && model.rows.is_empty() {
            let paragraph = Paragraph::new("Loading...")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, area);
            return;
        }

        if model.rows.is_empty() {
            let message = if self.route.query.is_none() {
                "Nothing here yet. Press n to create one."
            } else {
                "Nothing matches the current query"
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(model.header.iter().map(|h| Cell::from(*h)))
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = model
            .rows
            .iter()
            .map(|row| {
                Row::new(row.cells.iter().enumerate().map(|(i, text)| {
                    let style = if i == 0 {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    Cell::from(text.as_str()).style(style)
                }))
            })
            .collect();

        let mut widths = vec![Constraint::Length(6), Constraint::Min(20)];
        widths.extend((2..model.header.len()).map(|_| Constraint::Length(16)));

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("");

        frame.render_stateful_widget(table, area, &mut self.list_state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, model: &ViewModel) {
        let status = self.store.status(self.route.kind);
        let block = Block::default()
            .title(format!("{} - {}", self.route.kind.label(), model.entity_title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow));

        if status.loading || model.entity_id != self.route.view.id() {
            let paragraph = Paragraph::new("Loading...")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, area);
            return;
        }

        let mut lines = vec![Line::from(vec![
            Span::styled("ID: ", Style::default().fg(Color::Cyan)),
            Span::raw(model.entity_id.map(|id| id.to_string()).unwrap_or_default()),
        ])];
        lines.extend(model.details.iter().map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(Color::Cyan)),
                Span::raw(value.clone()),
            ])
        }));

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let status = self.store.status(self.route.kind);
        let title = match self.route.view {
            View::Edit(id) => format!("Edit {} #{}", self.route.kind.label(), id),
            _ => format!("Create {}", self.route.kind.label()),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow));

        let Some(form) = &self.form else {
            let paragraph = Paragraph::new("Loading...")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, area);
            return;
        };

        let mut lines: Vec<Line> = form
            .fields()
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let focused = i == self.form_cursor;
                let marker = if focused { "> " } else { "  " };
                let required = if spec.required { "*" } else { "" };
                let hint = match spec.kind {
                    FieldKind::Choice(_) | FieldKind::Relation(_) => " (←/→)",
                    FieldKind::DateTime => " (YYYY-MM-DDTHH:MM)",
                    FieldKind::Date => " (YYYY-MM-DD)",
                    _ => "",
                };
                let label_style = if focused {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan)
                };

                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{}{}{}: ", spec.label, required, hint), label_style),
                    Span::raw(form.value_at(i).to_string()),
                ])
            })
            .collect();

        if status.updating {
            lines.push(Line::from(""));
            lines.push(Line::styled("Saving...", Style::default().fg(Color::Gray)));
        }

        if !self.form_errors.is_empty() {
            lines.push(Line::from(""));
            lines.extend(
                self.form_errors
                    .iter()
                    .map(|e| Line::styled(e.to_string(), Style::default().fg(Color::Red))),
            );
        }

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_delete_dialog(&self, frame: &mut Frame, id: EntityId, model: &ViewModel) {
        let popup_area = Self::centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, popup_area);

        let status = self.store.status(self.route.kind);
        let target = if model.entity_id == Some(id) {
            model.entity_title.clone()
        } else {
            format!("{} #{}", self.route.kind.label(), id)
        };
        let text = if status.updating {
            "Deleting...".to_string()
        } else {
            format!("Are you sure you want to delete {}?\n\ny: delete    n/Esc: cancel", target)
        };

        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title("Confirm delete operation")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status = self.store.status(self.route.kind);

        if let Some(error) = &status.error_message {
            let paragraph = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(paragraph, area);
            return;
        }

        let help_text = if self.search_bar.is_focused() {
            "Enter: apply query | Esc: cancel"
        } else {
            match self.route.view {
                View::List => "j/k: move | Enter: view | n: new | e: edit | d: delete | /: query | 1-5/Tab: entity | r: refresh | q: quit | ?: help",
                View::Detail(_) => "e: edit | d: delete | r: refresh | q/Esc: back | ?: help",
                View::New | View::Edit(_) => "Tab/↑↓: field | ←/→: cycle option | Ctrl+S: save | Esc: cancel",
                View::Delete(_) => "y: delete | n/Esc: cancel",
            }
        };

        let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());

        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            "Projects TUI Help",
            "",
            "Lists:",
            "  j/k or ↑/↓     - Move up/down",
            "  g/G            - First/last row",
            "  1-5, Tab       - Switch entity",
            "  Enter          - Open detail view",
            "  n / e / d      - Create, edit, delete",
            "  /              - Edit the query (field.op=value&sort=field,dir&page=N)",
            "  r              - Refresh",
            "",
            "Forms:",
            "  Tab/↑/↓        - Move between fields",
            "  ←/→            - Cycle status or related entity",
            "  Ctrl+S         - Save",
            "  Esc            - Cancel and return to the list",
            "",
            "General:",
            "  ?              - Show this help",
            "  q              - Back / quit",
            "  Ctrl+C         - Force quit application",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().title("Help").borders(Borders::ALL))
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

pub async fn run_tui(mut app: App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.initialize();

    let mut event_handler = EventHandler::new();

    let result = async {
        loop {
            app.tick();
            terminal.draw(|frame| app.render(frame))?;

            let event = event_handler.next_event().await?;
            if app.handle_event(event).await? || event_handler.should_quit() {
                break;
            }
        }
        Ok::<(), color_eyre::Report>(())
    }
    .await;

    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;

    result
}
