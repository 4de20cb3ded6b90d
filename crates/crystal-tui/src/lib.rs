// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use crystal_app::{
    ConsoleCommand, ConsoleEvent, ConsoleState, DeleteAck, DeleteOutcome, InputMode, PageButton,
    Pagination, Record, RecordId, Screen, StoreError, TabularDataView, ViewOptions,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::collections::BTreeMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);

/// Everything the console needs from the outside world. The default
/// `spawn_*` methods run inline and report over the channel; runtimes that
/// own real IO override them to use worker threads.
pub trait AdminRuntime {
    fn list_records(&mut self, screen: Screen) -> Result<Vec<Record>, StoreError>;
    fn delete_record(&mut self, screen: Screen, id: &RecordId) -> Result<DeleteAck, StoreError>;

    fn spawn_load(
        &mut self,
        request_id: u64,
        screen: Screen,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.list_records(screen);
        tx.send(InternalEvent::Loaded {
            request_id,
            screen,
            result,
        })
        .map_err(|_| anyhow!("load event channel closed"))?;
        Ok(())
    }

    fn spawn_delete(
        &mut self,
        request_id: u64,
        screen: Screen,
        id: RecordId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.delete_record(screen, &id);
        tx.send(InternalEvent::Deleted {
            request_id,
            screen,
            id,
            result,
        })
        .map_err(|_| anyhow!("delete event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Loaded {
        request_id: u64,
        screen: Screen,
        result: Result<Vec<Record>, StoreError>,
    },
    Deleted {
        request_id: u64,
        screen: Screen,
        id: RecordId,
        result: Result<DeleteAck, StoreError>,
    },
}

#[derive(Debug, Clone)]
struct ScreenView {
    view: TabularDataView,
    selected_row: usize,
    load_request: Option<u64>,
}

impl ScreenView {
    fn clamp_selection(&mut self) {
        let rows = self.view.visible_slice().rows.len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
    }

    fn selected_record(&self) -> Option<&Record> {
        self.view
            .visible_slice()
            .rows
            .get(self.selected_row)
            .copied()
    }
}

#[derive(Debug, Clone)]
struct ViewData {
    options: ViewOptions,
    screens: BTreeMap<Screen, ScreenView>,
    help_visible: bool,
    status_token: u64,
    next_request_id: u64,
}

impl ViewData {
    fn new(options: ViewOptions) -> Self {
        Self {
            options,
            screens: BTreeMap::new(),
            help_visible: false,
            status_token: 0,
            next_request_id: 1,
        }
    }

    fn active(&self, state: &ConsoleState) -> Option<&ScreenView> {
        self.screens.get(&state.active_screen)
    }

    fn active_mut(&mut self, state: &ConsoleState) -> Option<&mut ScreenView> {
        self.screens.get_mut(&state.active_screen)
    }

    fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.saturating_add(1);
        id
    }
}

pub fn run_app<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    options: ViewOptions,
) -> Result<()> {
    options.validate().context("invalid table options")?;

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();
    ensure_mounted(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut ConsoleState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(ConsoleCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Loaded {
                request_id,
                screen,
                result,
            } => handle_loaded(state, view_data, tx, request_id, screen, result),
            InternalEvent::Deleted {
                request_id,
                screen,
                id,
                result,
            } => handle_deleted(state, view_data, tx, request_id, screen, id, result),
        }
    }
}

fn handle_loaded(
    state: &mut ConsoleState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request_id: u64,
    screen: Screen,
    result: Result<Vec<Record>, StoreError>,
) {
    let Some(screen_view) = view_data.screens.get_mut(&screen) else {
        return;
    };
    if screen_view.load_request != Some(request_id) {
        debug!(request_id, screen = screen.label(), "dropping stale load");
        return;
    }
    screen_view.load_request = None;

    let message = match screen_view.view.apply_load(result) {
        Ok(count) => {
            screen_view.clamp_selection();
            info!(request_id, screen = screen.label(), count, "load finished");
            format!("loaded {count} {}", screen.label())
        }
        Err(error) => {
            warn!(request_id, screen = screen.label(), %error, "load failed");
            format!("load {} failed: {error}", screen.label())
        }
    };
    emit_status(state, view_data, tx, message);
}

fn handle_deleted(
    state: &mut ConsoleState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request_id: u64,
    screen: Screen,
    id: RecordId,
    result: Result<DeleteAck, StoreError>,
) {
    let Some(screen_view) = view_data.screens.get_mut(&screen) else {
        return;
    };

    let message = match screen_view.view.apply_delete(&id, result) {
        Ok(DeleteOutcome::Removed(id)) => {
            screen_view.clamp_selection();
            info!(request_id, screen = screen.label(), %id, "record deleted");
            format!("deleted {} {id}", screen.noun())
        }
        Ok(DeleteOutcome::AlreadyAbsent(id)) => {
            format!("{} {id} was already removed", screen.noun())
        }
        Ok(DeleteOutcome::Ignored(id)) => {
            debug!(request_id, %id, "ignoring failure for a record that is gone");
            return;
        }
        Err(error) => {
            warn!(request_id, screen = screen.label(), %id, %error, "delete failed");
            format!("delete {} {id} failed: {error}", screen.noun())
        }
    };
    emit_status(state, view_data, tx, message);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut ConsoleState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(ConsoleCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: ConsoleCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, ConsoleEvent::StatusUpdated(_)))
    {
        bump_status_token(view_data, internal_tx);
    }
    for event in events {
        match event {
            ConsoleEvent::ScreenChanged(_) => {
                ensure_mounted(state, runtime, view_data, internal_tx);
            }
            ConsoleEvent::DeleteConfirmed(id) => {
                start_delete(state, runtime, view_data, internal_tx, id);
            }
            ConsoleEvent::ModeChanged(_)
            | ConsoleEvent::StatusUpdated(_)
            | ConsoleEvent::StatusCleared => {}
        }
    }
}

/// Creates the active screen's view on first visit and starts its load.
fn ensure_mounted<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let screen = state.active_screen;
    if view_data.screens.contains_key(&screen) {
        return;
    }
    let view = match TabularDataView::with_options(screen.columns(), view_data.options.clone()) {
        Ok(view) => view,
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("{error:#}"));
            return;
        }
    };
    debug!(screen = screen.label(), "mounting screen");
    view_data.screens.insert(
        screen,
        ScreenView {
            view,
            selected_row: 0,
            load_request: None,
        },
    );
    request_load(state, runtime, view_data, internal_tx);
}

fn request_load<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let screen = state.active_screen;
    let request_id = view_data.next_request_id();
    let Some(screen_view) = view_data.screens.get_mut(&screen) else {
        return;
    };
    if !screen_view.view.begin_load() {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("{} are already loading", screen.label()),
        );
        return;
    }
    screen_view.load_request = Some(request_id);
    debug!(request_id, screen = screen.label(), "load requested");

    if let Err(error) = runtime.spawn_load(request_id, screen, internal_tx.clone()) {
        screen_view.load_request = None;
        let failure = StoreError::transport(screen.collection(), format!("{error:#}"));
        let message = match screen_view.view.apply_load(Err(failure)) {
            Ok(_) => return,
            Err(error) => format!("load {} failed: {error}", screen.label()),
        };
        emit_status(state, view_data, internal_tx, message);
    }
}

fn start_delete<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    id: RecordId,
) {
    let screen = state.active_screen;
    let request_id = view_data.next_request_id();
    let Some(screen_view) = view_data.screens.get_mut(&screen) else {
        return;
    };
    screen_view.view.begin_delete(&id);
    debug!(request_id, screen = screen.label(), %id, "delete requested");

    if let Err(error) = runtime.spawn_delete(request_id, screen, id.clone(), internal_tx.clone()) {
        let failure = StoreError::transport(screen.collection(), format!("{error:#}"));
        if let Err(error) = screen_view.view.apply_delete(&id, Err(failure)) {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("delete {} {id} failed: {error}", screen.noun()),
            );
        }
        return;
    }
    emit_status(
        state,
        view_data,
        internal_tx,
        format!("deleting {} {id}", screen.noun()),
    );
}

fn handle_key_event<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    match state.mode.clone() {
        InputMode::Search => {
            handle_search_key(state, runtime, view_data, internal_tx, key);
            false
        }
        InputMode::ConfirmDelete(_) => {
            handle_confirm_key(state, runtime, view_data, internal_tx, key);
            false
        }
        InputMode::Browse => handle_browse_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_search_key<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(screen_view) = view_data.active_mut(state) else {
        dispatch(state, runtime, view_data, internal_tx, ConsoleCommand::FinishSearch);
        return;
    };
    let mut query = screen_view.view.state().search_query.clone();
    match key.code {
        KeyCode::Enter => {
            dispatch(state, runtime, view_data, internal_tx, ConsoleCommand::FinishSearch);
            return;
        }
        KeyCode::Esc => {
            query.clear();
            screen_view.view.set_search_query(&query);
            screen_view.selected_row = 0;
            dispatch(state, runtime, view_data, internal_tx, ConsoleCommand::FinishSearch);
            return;
        }
        KeyCode::Backspace => {
            query.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            query.push(ch);
        }
        _ => return,
    }
    screen_view.view.set_search_query(&query);
    screen_view.selected_row = 0;
}

fn handle_confirm_key<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => ConsoleCommand::ConfirmDelete,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ConsoleCommand::DeclineDelete,
        _ => return,
    };
    dispatch(state, runtime, view_data, internal_tx, command);
}

fn handle_browse_key<R: AdminRuntime>(
    state: &mut ConsoleState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('?'), _) => view_data.help_visible = true,
        (KeyCode::Tab, _) | (KeyCode::Char('f'), KeyModifiers::NONE) => {
            dispatch(state, runtime, view_data, internal_tx, ConsoleCommand::NextScreen);
        }
        (KeyCode::BackTab, _) | (KeyCode::Char('b'), KeyModifiers::NONE) => {
            dispatch(state, runtime, view_data, internal_tx, ConsoleCommand::PrevScreen);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            request_load(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('/'), _) => {
            dispatch(state, runtime, view_data, internal_tx, ConsoleCommand::StartSearch);
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            let selected = view_data
                .active(state)
                .and_then(ScreenView::selected_record)
                .map(|record| record.id().clone());
            match selected {
                Some(id) => {
                    dispatch(
                        state,
                        runtime,
                        view_data,
                        internal_tx,
                        ConsoleCommand::AskDelete(id),
                    );
                }
                None => emit_status(state, view_data, internal_tx, "nothing to delete"),
            }
        }
        _ => {
            if let Some(message) = apply_table_key(state, view_data, key) {
                emit_status(state, view_data, internal_tx, message);
            }
        }
    }
    false
}

/// Cursor, paging, sorting and page-size keys. Returns a status message when
/// the key produced one.
fn apply_table_key(
    state: &ConsoleState,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> Option<String> {
    let screen_view = view_data.active_mut(state)?;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let rows = screen_view.view.visible_slice().rows.len();
            if screen_view.selected_row + 1 < rows {
                screen_view.selected_row += 1;
            }
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            screen_view.selected_row = screen_view.selected_row.saturating_sub(1);
            None
        }
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
            turn_page(screen_view, |view| view.next_page())
        }
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
            turn_page(screen_view, |view| view.previous_page())
        }
        KeyCode::Char('g') | KeyCode::Home => turn_page(screen_view, |view| view.go_to_page(1)),
        KeyCode::Char('G') | KeyCode::End => turn_page(screen_view, |view| {
            let last = view.total_pages();
            view.go_to_page(last)
        }),
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            if !screen_view.view.set_sort_column(index) {
                return Some(format!("no column {digit}"));
            }
            screen_view.clamp_selection();
            let label = screen_view.view.columns()[index].label.clone();
            let direction = screen_view.view.state().sort_direction.label();
            Some(format!("sorted by {label} {direction}"))
        }
        KeyCode::Char('+') | KeyCode::Char('=') => step_rows_per_page(screen_view, 1),
        KeyCode::Char('-') => step_rows_per_page(screen_view, -1),
        KeyCode::Esc => {
            if screen_view.view.state().search_query.is_empty() {
                return None;
            }
            screen_view.view.set_search_query("");
            screen_view.selected_row = 0;
            Some("search cleared".to_owned())
        }
        _ => None,
    }
}

fn turn_page(
    screen_view: &mut ScreenView,
    turn: impl FnOnce(&mut TabularDataView) -> usize,
) -> Option<String> {
    let before = screen_view.view.state().current_page;
    let after = turn(&mut screen_view.view);
    if after != before {
        screen_view.selected_row = 0;
    }
    None
}

fn step_rows_per_page(screen_view: &mut ScreenView, delta: isize) -> Option<String> {
    let choices = screen_view.view.rows_per_page_choices().to_vec();
    let current = screen_view.view.state().rows_per_page;
    let index = choices.iter().position(|choice| *choice == current)? as isize;
    let Some(next) = usize::try_from(index + delta)
        .ok()
        .and_then(|next| choices.get(next).copied())
    else {
        return Some(format!("{current} rows per page is the limit"));
    };
    if let Err(error) = screen_view.view.set_rows_per_page(next) {
        return Some(format!("{error:#}"));
    }
    screen_view.selected_row = 0;
    Some(format!("{next} rows per page"))
}

fn render(frame: &mut ratatui::Frame<'_>, state: &ConsoleState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = Screen::ALL
        .iter()
        .position(|screen| *screen == state.active_screen)
        .unwrap_or(0);
    let tab_titles = Screen::ALL
        .iter()
        .map(|screen| tab_title(*screen, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("crystal admin").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let search_style = if state.mode == InputMode::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    frame.render_widget(
        Paragraph::new(render_search_text(state, view_data)).style(search_style),
        layout[1],
    );

    render_table(frame, layout[2], state, view_data);

    if let Some(screen_view) = view_data.active(state) {
        frame.render_widget(Paragraph::new(footer_line(&screen_view.view)), layout[3]);
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[4]);

    if let InputMode::ConfirmDelete(id) = &state.mode {
        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(render_confirm_text(state, view_data, id)).block(
            Block::default()
                .title("confirm delete")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(confirm, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &ConsoleState,
    view_data: &ViewData,
) {
    let Some(screen_view) = view_data.active(state) else {
        let empty = Paragraph::new(String::new()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.active_screen.label()),
        );
        frame.render_widget(empty, area);
        return;
    };

    let view = &screen_view.view;
    let title = table_title(state.active_screen, view);
    let slice = view.visible_slice();
    if slice.rows.is_empty() {
        let placeholder = if view.is_loading() {
            "loading..."
        } else if view.state().search_query.is_empty() {
            "no records"
        } else {
            "no matching records"
        };
        let empty = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let header_cells = view.header_labels().into_iter().map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = slice.rows.iter().enumerate().map(|(row_index, record)| {
        let mut style = Style::default();
        if view.is_delete_pending(record.id()) {
            style = style
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT);
        }
        if row_index == screen_view.selected_row {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        let cells = view
            .columns()
            .iter()
            .map(|column| Cell::from(column.cell_text(record)))
            .collect::<Vec<_>>();
        Row::new(cells).style(style)
    });

    let widths = vec![Constraint::Min(8); view.columns().len().max(1)];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn tab_title(screen: Screen, view_data: &ViewData) -> String {
    match view_data.screens.get(&screen) {
        Some(screen_view) if !screen_view.view.is_loading() => {
            format!("{} {}", screen.label(), screen_view.view.state().records.len())
        }
        _ => screen.label().to_owned(),
    }
}

fn table_title(screen: Screen, view: &TabularDataView) -> String {
    if view.is_loading() {
        format!("{} (loading)", screen.label())
    } else {
        screen.label().to_owned()
    }
}

fn render_search_text(state: &ConsoleState, view_data: &ViewData) -> String {
    let query = view_data
        .active(state)
        .map(|screen_view| screen_view.view.state().search_query.as_str())
        .unwrap_or_default();
    match (&state.mode, query.is_empty()) {
        (InputMode::Search, _) => format!(" search: {query}_"),
        (_, true) => " / to search".to_owned(),
        (_, false) => format!(" search: {query}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonLook {
    Enabled,
    Disabled,
    Current,
}

fn pagination_labels(pagination: &Pagination) -> Vec<(String, ButtonLook)> {
    pagination
        .buttons
        .iter()
        .map(|button| match *button {
            PageButton::Previous { enabled } => ("‹ prev".to_owned(), look(enabled)),
            PageButton::Page {
                number,
                current: true,
            } => (format!("[{number}]"), ButtonLook::Current),
            PageButton::Page { number, .. } => (number.to_string(), ButtonLook::Enabled),
            PageButton::Next { enabled } => ("next ›".to_owned(), look(enabled)),
        })
        .collect()
}

const fn look(enabled: bool) -> ButtonLook {
    if enabled {
        ButtonLook::Enabled
    } else {
        ButtonLook::Disabled
    }
}

fn footer_line(view: &TabularDataView) -> Line<'static> {
    let mut spans = vec![Span::raw(format!(
        " {} | {} per page | ",
        view.visible_slice().summary(),
        view.state().rows_per_page
    ))];
    for (index, (label, look)) in pagination_labels(&view.pagination()).into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        let style = match look {
            ButtonLook::Enabled => Style::default().fg(Color::White),
            ButtonLook::Disabled => Style::default().fg(Color::DarkGray),
            ButtonLook::Current => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn status_text(state: &ConsoleState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let (mode, hints) = match state.mode {
        InputMode::Browse => (
            "BROWSE",
            "j/k row | n/p page | 1-9 sort | / search | +/- rows | d delete | r refresh | tab screen | ? help",
        ),
        InputMode::Search => ("SEARCH", "type to filter | enter keep | esc clear"),
        InputMode::ConfirmDelete(_) => ("CONFIRM", "y delete | n cancel"),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn render_confirm_text(state: &ConsoleState, view_data: &ViewData, id: &RecordId) -> String {
    let screen = state.active_screen;
    let label = view_data
        .active(state)
        .and_then(|screen_view| {
            let record = screen_view
                .view
                .state()
                .records
                .iter()
                .find(|record| record.id() == id)?;
            let first = screen_view.view.columns().first()?;
            Some(first.cell_text(record))
        })
        .filter(|label| !label.is_empty());

    let mut out = format!("Delete this {}?\n\n", screen.noun());
    if let Some(label) = label {
        out.push_str(&label);
        out.push('\n');
    }
    out.push_str(&format!("id {id}\n\n"));
    out.push_str("This cannot be undone.\n\ny delete | n cancel");
    out
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | q quit (browse) | ? help\n\
screens: tab/f next | shift+tab/b previous | r refresh\n\
rows: j/k or up/down move\n\
pages: n/p or left/right/pgdn/pgup | g/G first/last\n\
sort: 1-9 sort by column, again to flip direction\n\
search: / start | type to filter | enter keep | esc clear\n\
rows per page: + more | - fewer\n\
delete: d on a row, then y confirm or n/esc cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
