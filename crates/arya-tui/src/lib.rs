// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use arya_app::{
    ActivityShort, AppCommand, AppError, AppEvent, AppMode, AppState, AryaSamajListItem,
    FamilyShort, ListController, MemberShort, Page, PageRequest, ScreenKey,
    page_size_for_width, to_devanagari_numerals,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::collections::HashMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::debug;

const HALF_PAGE_ROWS: isize = 10;
const RETRY_LABEL: &str = "पुनः प्रयास करें";
const LOADING_TEXT: &str = "लोड हो रहा है…";
const LOADING_MORE_TEXT: &str = "और लोड हो रहा है…";
const SEARCHING_TEXT: &str = "खोज रहे हैं…";
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[day]/[month]/[year]");

// Density-independent width units per terminal column.
const UNITS_PER_COLUMN: f32 = 8.0;

// Tabs, search box and status bar (3 rows each) plus the table borders and
// header row.
const CHROME_ROWS: u16 = 12;

/// A record that can be shown as one row of a list screen.
pub trait ListRow: Clone {
    const COLUMNS: &'static [&'static str];

    fn row_id(&self) -> &str;
    fn cells(&self, now: OffsetDateTime) -> Vec<String>;
}

impl ListRow for MemberShort {
    const COLUMNS: &'static [&'static str] = &["नाम", "स्थान"];

    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cells(&self, _now: OffsetDateTime) -> Vec<String> {
        vec![self.name.clone(), self.place.clone()]
    }
}

impl ListRow for FamilyShort {
    const COLUMNS: &'static [&'static str] = &["परिवार", "पता", "आर्य समाज"];

    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cells(&self, _now: OffsetDateTime) -> Vec<String> {
        vec![
            self.name.clone(),
            self.address.clone(),
            self.arya_samaj_name.clone(),
        ]
    }
}

impl ListRow for AryaSamajListItem {
    const COLUMNS: &'static [&'static str] = &["आर्य समाज", "पता", "सदस्य"];

    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cells(&self, _now: OffsetDateTime) -> Vec<String> {
        vec![
            self.name.clone(),
            self.formatted_address.clone(),
            to_devanagari_numerals(&self.member_count.to_string()),
        ]
    }
}

impl ListRow for ActivityShort {
    const COLUMNS: &'static [&'static str] = &["गतिविधि", "प्रकार", "स्थिति", "स्थान", "तिथि"];

    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cells(&self, now: OffsetDateTime) -> Vec<String> {
        let place = [self.district.as_str(), self.state.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let start = self.start_datetime.format(DATE_FORMAT).unwrap_or_default();
        let end = self.end_datetime.format(DATE_FORMAT).unwrap_or_default();
        let dates = if start == end {
            start
        } else {
            format!("{start} - {end}")
        };
        vec![
            self.name.clone(),
            self.activity_type.label().to_owned(),
            self.status_at(now).label().to_owned(),
            place,
            dates,
        ]
    }
}

/// What a list screen shows in place of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRenderState {
    InitialLoading,
    Error { message: String, retry: bool },
    Empty,
    List,
}

/// Display-ready copy of one list screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListView {
    pub columns: &'static [&'static str],
    pub ids: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub search_query: String,
    pub is_initial_loading: bool,
    pub is_loading_next_page: bool,
    pub is_searching: bool,
    pub has_next_page: bool,
    pub has_reached_end: bool,
    pub error: Option<String>,
    pub show_retry_button: bool,
}

impl ListView {
    pub fn from_controller<T: ListRow>(controller: &ListController<T>, now: OffsetDateTime) -> Self {
        let state = controller.state();
        Self {
            columns: T::COLUMNS,
            ids: state
                .items
                .iter()
                .map(|item| item.row_id().to_owned())
                .collect(),
            rows: state.items.iter().map(|item| item.cells(now)).collect(),
            search_query: controller.search_query().to_owned(),
            is_initial_loading: state.is_initial_loading,
            is_loading_next_page: state.is_loading_next_page,
            is_searching: state.is_searching,
            has_next_page: state.has_next_page,
            has_reached_end: state.has_reached_end,
            error: state.error.clone(),
            show_retry_button: state.show_retry_button,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Loading wins over an error, an error hides the list, and an empty
    /// result only counts as empty once nothing is in flight.
    pub fn render_state(&self) -> ListRenderState {
        if self.is_initial_loading {
            return ListRenderState::InitialLoading;
        }
        if let Some(message) = &self.error {
            return ListRenderState::Error {
                message: message.clone(),
                retry: self.show_retry_button,
            };
        }
        if self.rows.is_empty() && !self.is_searching {
            return ListRenderState::Empty;
        }
        ListRenderState::List
    }

    pub fn shows_end_of_list(&self) -> bool {
        self.has_reached_end && !self.has_next_page && !self.rows.is_empty()
    }

    pub fn footer_text(&self, screen: ScreenKey) -> Option<String> {
        if self.is_loading_next_page {
            Some(LOADING_MORE_TEXT.to_owned())
        } else if self.shows_end_of_list() {
            Some(screen.end_of_list_text(self.rows.len()))
        } else {
            None
        }
    }

    /// Tab-separated rows, one per line.
    pub fn plain_text(&self) -> String {
        let mut lines = vec![self.columns.join("\t")];
        lines.extend(self.rows.iter().map(|row| row.join("\t")));
        lines.join("\n")
    }
}

/// `true` once the last visible row reaches 90% of the rendered rows.
pub fn should_load_more(total: usize, last_visible: usize) -> bool {
    total > 0 && last_visible >= total * 9 / 10
}

/// Passes a trigger value on only when it differs from the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchLatch {
    last: Option<bool>,
}

impl PrefetchLatch {
    /// Returns `true` when `should_load` is `true` and was not `true` the
    /// last time it was observed.
    pub fn observe(&mut self, should_load: bool) -> bool {
        let changed = self.last != Some(should_load);
        self.last = Some(should_load);
        changed && should_load
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// A page fetched on a worker thread, on its way back to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Members(PageRequest, Result<Page<MemberShort>, AppError>),
    Families(PageRequest, Result<Page<FamilyShort>, AppError>),
    AryaSamajs(PageRequest, Result<Page<AryaSamajListItem>, AppError>),
    Activities(PageRequest, Result<Page<ActivityShort>, AppError>),
}

impl PageOutcome {
    pub const fn screen(&self) -> ScreenKey {
        match self {
            Self::Members(..) => ScreenKey::EkalArya,
            Self::Families(..) => ScreenKey::AryaPariwar,
            Self::AryaSamajs(..) => ScreenKey::AryaSamaj,
            Self::Activities(..) => ScreenKey::Activities,
        }
    }

    pub const fn request(&self) -> &PageRequest {
        match self {
            Self::Members(request, _)
            | Self::Families(request, _)
            | Self::AryaSamajs(request, _)
            | Self::Activities(request, _) => request,
        }
    }
}

pub trait AppRuntime {
    fn list_view(&self, screen: ScreenKey) -> ListView;
    /// Bring `screen` on stage: restore parked pages or start the first load.
    fn enter_screen(&mut self, screen: ScreenKey, tx: &Sender<InternalEvent>) -> Result<()>;
    fn leave_screen(&mut self, screen: ScreenKey);
    fn update_search(
        &mut self,
        screen: ScreenKey,
        query: &str,
        now: Instant,
        tx: &Sender<InternalEvent>,
    ) -> Result<()>;
    fn poll_search(
        &mut self,
        screen: ScreenKey,
        now: Instant,
        tx: &Sender<InternalEvent>,
    ) -> Result<()>;
    fn load_next_page(&mut self, screen: ScreenKey, tx: &Sender<InternalEvent>) -> Result<bool>;
    fn retry(&mut self, screen: ScreenKey, tx: &Sender<InternalEvent>) -> Result<()>;
    fn refresh(&mut self, screen: ScreenKey, tx: &Sender<InternalEvent>) -> Result<()>;
    fn delete_row(
        &mut self,
        screen: ScreenKey,
        id: &str,
        tx: &Sender<InternalEvent>,
    ) -> Result<()>;
    /// Merge a fetched page. `false` when the page was superseded.
    fn apply_page(&mut self, outcome: PageOutcome) -> bool;
    /// Page size suited to the current terminal width. Runtimes with a
    /// configured page size ignore it.
    fn set_page_size_hint(&mut self, page_size: usize);
}

/// Page size for a terminal `columns` wide.
pub fn page_size_for_columns(columns: u16) -> usize {
    page_size_for_width(f32::from(columns) * UNITS_PER_COLUMN)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    PageLoaded(PageOutcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TableCursor {
    selected: usize,
    offset: usize,
}

impl TableCursor {
    fn move_by(&mut self, delta: isize, total: usize, viewport: usize) {
        if total == 0 {
            *self = Self::default();
            return;
        }
        let max = (total - 1) as isize;
        self.selected = (self.selected as isize).saturating_add(delta).clamp(0, max) as usize;
        self.scroll_into_view(viewport);
    }

    fn scroll_into_view(&mut self, viewport: usize) {
        let viewport = viewport.max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + viewport {
            self.offset = self.selected + 1 - viewport;
        }
    }

    fn last_visible(&self, total: usize, viewport: usize) -> usize {
        if total == 0 {
            return 0;
        }
        (self.offset + viewport.max(1)).min(total) - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDelete {
    screen: ScreenKey,
    id: String,
    label: String,
}

#[derive(Debug, Clone, Default)]
struct ViewData {
    cursors: HashMap<ScreenKey, TableCursor>,
    latches: HashMap<ScreenKey, PrefetchLatch>,
    viewport_rows: usize,
    page_size_hint: Option<usize>,
    help_visible: bool,
    pending_delete: Option<PendingDelete>,
    status_token: u64,
}

impl ViewData {
    fn cursor(&self, screen: ScreenKey) -> TableCursor {
        self.cursors.get(&screen).copied().unwrap_or_default()
    }

    fn cursor_mut(&mut self, screen: ScreenKey) -> &mut TableCursor {
        self.cursors.entry(screen).or_default()
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    if let Ok(size) = terminal.size() {
        update_page_size_hint(runtime, &mut view_data, size.width);
    }

    if let Err(error) = runtime.enter_screen(state.active_screen, &internal_tx) {
        state.set_status(format!("load failed: {error:#}"));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_rx);

        if let Err(error) = runtime.poll_search(state.active_screen, Instant::now(), &internal_tx)
        {
            emit_status(state, &mut view_data, &internal_tx, format!("{error:#}"));
        }

        match terminal.size() {
            Ok(size) => {
                view_data.viewport_rows = viewport_rows_for_height(size.height);
                update_page_size_hint(runtime, &mut view_data, size.width);
            }
            Err(error) => {
                result = Err(error).context("read terminal size");
                break;
            }
        }

        if let Err(error) = maybe_prefetch(state, runtime, &mut view_data, &internal_tx) {
            emit_status(state, &mut view_data, &internal_tx, format!("{error:#}"));
        }

        let view = runtime.list_view(state.active_screen);
        if let Err(error) = terminal.draw(|frame| render(frame, state, &view, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(false) => {}
            Ok(true) => match event::read().context("read event") {
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
            },
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn update_page_size_hint<R: AppRuntime>(runtime: &mut R, view_data: &mut ViewData, columns: u16) {
    let page_size = page_size_for_columns(columns);
    if view_data.page_size_hint != Some(page_size) {
        debug!(columns, page_size, "page size follows terminal width");
        view_data.page_size_hint = Some(page_size);
        runtime.set_page_size_hint(page_size);
    }
}

fn viewport_rows_for_height(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS)).max(1)
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::PageLoaded(outcome) => {
                let screen = outcome.screen();
                let reset = outcome.request().reset;
                if !runtime.apply_page(outcome) {
                    continue;
                }
                let total = runtime.list_view(screen).len();
                let viewport = view_data.viewport_rows;
                let cursor = view_data.cursor_mut(screen);
                if reset {
                    *cursor = TableCursor::default();
                } else {
                    cursor.move_by(0, total, viewport);
                }
            }
        }
    }
}

/// Ask for the next page when the visible window nears the end of the
/// active list.
fn maybe_prefetch<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) -> Result<bool> {
    let screen = state.active_screen;
    let view = runtime.list_view(screen);
    let total = match view.render_state() {
        ListRenderState::List => view.len(),
        _ => 0,
    };
    let last_visible = view_data
        .cursor(screen)
        .last_visible(total, view_data.viewport_rows);
    let latch = view_data.latches.entry(screen).or_default();
    if !latch.observe(should_load_more(total, last_visible)) {
        return Ok(false);
    }
    if !view.has_next_page || view.is_loading_next_page {
        return Ok(false);
    }
    debug!(screen = screen.as_str(), total, last_visible, "prefetching next page");
    runtime.load_next_page(screen, tx)
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.set_status(message);
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    if let Some(pending) = view_data.pending_delete.take() {
        if key.code == KeyCode::Char('y') {
            match runtime.delete_row(pending.screen, &pending.id, internal_tx) {
                Ok(()) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("deleted {}", pending.label),
                ),
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("delete failed: {error:#}"),
                ),
            }
        } else {
            emit_status(state, view_data, internal_tx, "delete cancelled");
        }
        return false;
    }

    match state.mode {
        AppMode::Search => {
            handle_search_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_search_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let screen = state.active_screen;
    let mut query = runtime.list_view(screen).search_query;
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::ExitToNav);
            if query.is_empty() {
                return;
            }
            query.clear();
        }
        (KeyCode::Enter, _) | (KeyCode::Down, _) => {
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            query.clear();
        }
        (KeyCode::Backspace, _) => {
            if query.pop().is_none() {
                return;
            }
        }
        (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            query.push(ch);
        }
        _ => return,
    }
    if let Err(error) = runtime.update_search(screen, &query, Instant::now(), internal_tx) {
        emit_status(state, view_data, internal_tx, format!("search failed: {error:#}"));
    }
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let screen = state.active_screen;
    let view = runtime.list_view(screen);
    let total = view.len();
    let viewport = view_data.viewport_rows;

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => return true,
        (KeyCode::Tab, _) | (KeyCode::Char('f'), KeyModifiers::NONE) => {
            change_screen(state, runtime, view_data, internal_tx, AppCommand::NextScreen);
        }
        (KeyCode::BackTab, _) | (KeyCode::Char('b'), KeyModifiers::NONE) => {
            change_screen(state, runtime, view_data, internal_tx, AppCommand::PrevScreen);
        }
        (KeyCode::Char(digit @ '1'..='4'), _) => {
            let index = usize::from(digit as u8 - b'1');
            change_screen(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::ShowScreen(ScreenKey::ALL[index]),
            );
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
            view_data.cursor_mut(screen).move_by(1, total, viewport);
        }
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
            view_data.cursor_mut(screen).move_by(-1, total, viewport);
        }
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data
                .cursor_mut(screen)
                .move_by(HALF_PAGE_ROWS, total, viewport);
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data
                .cursor_mut(screen)
                .move_by(-HALF_PAGE_ROWS, total, viewport);
        }
        (KeyCode::PageDown, _) => {
            view_data
                .cursor_mut(screen)
                .move_by(viewport as isize, total, viewport);
        }
        (KeyCode::PageUp, _) => {
            view_data
                .cursor_mut(screen)
                .move_by(-(viewport as isize), total, viewport);
        }
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => {
            view_data.cursor_mut(screen).move_by(isize::MIN, total, viewport);
        }
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
            view_data.cursor_mut(screen).move_by(isize::MAX, total, viewport);
        }
        (KeyCode::Char('/'), _) => {
            state.dispatch(AppCommand::EnterSearch);
        }
        (KeyCode::Esc, _) => {
            if !view.search_query.is_empty()
                && let Err(error) = runtime.update_search(screen, "", Instant::now(), internal_tx)
            {
                emit_status(state, view_data, internal_tx, format!("search failed: {error:#}"));
            }
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            if !view.show_retry_button {
                emit_status(state, view_data, internal_tx, "nothing to retry");
            } else if let Err(error) = runtime.retry(screen, internal_tx) {
                emit_status(state, view_data, internal_tx, format!("retry failed: {error:#}"));
            }
        }
        (KeyCode::Char('R'), _) => {
            view_data.latches.remove(&screen);
            if let Err(error) = runtime.refresh(screen, internal_tx) {
                emit_status(state, view_data, internal_tx, format!("refresh failed: {error:#}"));
            }
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            let selected = view_data.cursor(screen).selected;
            if view.render_state() == ListRenderState::List
                && let (Some(id), Some(row)) = (view.ids.get(selected), view.rows.get(selected))
            {
                view_data.pending_delete = Some(PendingDelete {
                    screen,
                    id: id.clone(),
                    label: row.first().cloned().unwrap_or_else(|| id.clone()),
                });
            }
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        _ => {}
    }
    false
}

fn change_screen<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    for event in state.dispatch(command) {
        let AppEvent::ScreenChanged { from, to } = event else {
            continue;
        };
        runtime.leave_screen(from);
        if let Some(latch) = view_data.latches.get_mut(&from) {
            latch.reset();
        }
        if let Err(error) = runtime.enter_screen(to, internal_tx) {
            emit_status(state, view_data, internal_tx, format!("load failed: {error:#}"));
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view: &ListView, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ScreenKey::ALL
        .iter()
        .position(|screen| *screen == state.active_screen)
        .unwrap_or(0);
    let titles = ScreenKey::ALL
        .iter()
        .map(|screen| screen.title().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("आर्य महासंघ").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let search_style = if state.mode == AppMode::Search {
        Style::default().fg(Color::Cyan)
    } else if view.search_query.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_line_text(state, view))
        .style(search_style)
        .block(Block::default().title("खोज").borders(Borders::ALL));
    frame.render_widget(search, layout[1]);

    render_body(frame, layout[2], state.active_screen, view, view_data);

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if let Some(pending) = &view_data.pending_delete {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let prompt = Paragraph::new(delete_prompt_text(pending))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("delete").borders(Borders::ALL));
        frame.render_widget(prompt, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_body(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    screen: ScreenKey,
    view: &ListView,
    view_data: &ViewData,
) {
    let block = Block::default().title(screen.title()).borders(Borders::ALL);
    match view.render_state() {
        ListRenderState::InitialLoading => {
            let loading = Paragraph::new(LOADING_TEXT)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(loading, area);
        }
        ListRenderState::Error { message, retry } => {
            let card = Paragraph::new(error_card_text(&message, retry))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(card, area);
        }
        ListRenderState::Empty => {
            let empty = Paragraph::new(screen.empty_state_text())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
        }
        ListRenderState::List => render_table(frame, area, screen, view, view_data, block),
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    screen: ScreenKey,
    view: &ListView,
    view_data: &ViewData,
    block: Block<'_>,
) {
    let cursor = view_data.cursor(screen);
    let viewport = view_data.viewport_rows.max(1);

    let mut widths = vec![Constraint::Length(5)];
    widths.extend(view.columns.iter().map(|_| Constraint::Min(8)));

    let header_cells = std::iter::once("#")
        .chain(view.columns.iter().copied())
        .map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells);

    let mut rows = view
        .rows
        .iter()
        .enumerate()
        .skip(cursor.offset)
        .take(viewport)
        .map(|(index, row)| {
            let number = to_devanagari_numerals(&(index + 1).to_string());
            let style = if index == cursor.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let cells = std::iter::once(Cell::from(number))
                .chain(row.iter().map(|value| Cell::from(value.clone())))
                .collect::<Vec<_>>();
            Row::new(cells).style(style)
        })
        .collect::<Vec<_>>();

    if let Some(footer) = view.footer_text(screen) {
        rows.push(
            Row::new(vec![Cell::from(String::new()), Cell::from(footer)])
                .style(Style::default().fg(Color::DarkGray)),
        );
    }

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn search_line_text(state: &AppState, view: &ListView) -> String {
    let mut line = if view.search_query.is_empty() && state.mode != AppMode::Search {
        state.active_screen.search_placeholder().to_owned()
    } else {
        view.search_query.clone()
    };
    if state.mode == AppMode::Search {
        line.push('▏');
    }
    if view.is_searching {
        line.push_str("  ");
        line.push_str(SEARCHING_TEXT);
    }
    line
}

fn error_card_text(message: &str, retry: bool) -> String {
    if retry {
        format!("{message}\n\n[r] {RETRY_LABEL}")
    } else {
        message.to_owned()
    }
}

fn delete_prompt_text(pending: &PendingDelete) -> String {
    format!("delete {}? y confirm | any other key cancel", pending.label)
}

fn status_text(state: &AppState) -> String {
    let (mode, hints) = match state.mode {
        AppMode::Nav => (
            "NAV",
            "j/k g/G pg | tab/1-4 screens | / search | esc clear | r retry | R refresh | d delete | ? help | q quit",
        ),
        AppMode::Search => ("SEARCH", "type to search | enter done | esc clear | ctrl+u erase"),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ctrl+c quit\n\
nav: j/k up/down | g/G first/last | ctrl+d/ctrl+u half page | pgup/pgdn\n\
nav: tab/shift+tab or f/b switch screen | 1-4 jump to screen\n\
nav: / search | esc clear search | r retry | R refresh | d delete | ? help\n\
search: type to filter | backspace | ctrl+u erase | enter or down done | esc clear"
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
